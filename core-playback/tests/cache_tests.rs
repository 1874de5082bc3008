//! Offline cache manager with real download timers
//!
//! Time is paused, so the Tokio clock jumps straight to the next tick
//! whenever the test is waiting on the tick channel.

mod common;

use common::numbered_catalog;
use core_async::sync::mpsc;
use core_async::time::{timeout, Duration, Instant};
use core_playback::{
    CacheEntry, CacheManager, CacheToggle, DownloadConfig, DownloadTick, TickOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;

fn setup(seed: u64) -> (CacheManager, mpsc::UnboundedReceiver<DownloadTick>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let manager = CacheManager::new(DownloadConfig::default(), Arc::new(numbered_catalog(6)), tx)
        .unwrap()
        .with_rng(StdRng::seed_from_u64(seed));
    (manager, rx)
}

async fn next_tick(rx: &mut mpsc::UnboundedReceiver<DownloadTick>) -> Option<DownloadTick> {
    timeout(Duration::from_secs(5), rx.recv()).await.ok().flatten()
}

#[tokio::test(start_paused = true)]
async fn test_download_progress_is_monotonic_and_completes() {
    for seed in 0..5 {
        let (mut cache, mut rx) = setup(seed);
        let started = Instant::now();
        assert!(cache.start_download("3"));

        let mut last = 0;
        let mut ticks = 0;
        loop {
            let tick = next_tick(&mut rx).await.expect("download stalled");
            ticks += 1;
            match cache.apply_tick(&tick) {
                TickOutcome::Progress(percent) => {
                    assert!(percent >= last + 4 && percent <= last + 11);
                    assert!(percent < 100);
                    assert_eq!(cache.progress("3"), Some(percent));
                    last = percent;
                }
                TickOutcome::Completed => break,
                TickOutcome::Stale => panic!("unexpected stale tick"),
            }
        }

        assert!(ticks <= cache.config().max_ticks());
        assert!(ticks >= 10);
        assert_eq!(started.elapsed(), Duration::from_millis(250) * ticks);
        assert!(cache.is_cached("3"));
        assert_eq!(cache.entry("3"), CacheEntry::Present);

        // The timer is gone once the track is present.
        assert_eq!(cache.active_downloads(), 0);
        assert!(next_tick(&mut rx).await.is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn test_double_start_runs_one_timer() {
    let (mut cache, mut rx) = setup(1);
    assert!(cache.start_download("5"));
    assert!(!cache.start_download("5"));

    let first = next_tick(&mut rx).await.unwrap();
    let started = Instant::now();
    cache.apply_tick(&first);

    // Exactly one tick per interval.
    let second = next_tick(&mut rx).await.unwrap();
    assert_eq!(started.elapsed(), Duration::from_millis(250));
    assert_eq!(second.generation, first.generation);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_remove_cancels_timer() {
    let (mut cache, mut rx) = setup(2);
    cache.start_download("6");

    for _ in 0..2 {
        let tick = next_tick(&mut rx).await.unwrap();
        cache.apply_tick(&tick);
    }
    let progress = cache.progress("6").unwrap();
    assert!(progress > 0);

    assert_eq!(cache.remove("6"), Some(CacheEntry::Downloading(progress)));
    assert_eq!(cache.progress("6"), None);
    assert!(!cache.is_cached("6"));
    assert!(next_tick(&mut rx).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_remove_then_restart_starts_from_zero() {
    let (mut cache, mut rx) = setup(3);
    cache.start_download("2");
    let old = next_tick(&mut rx).await.unwrap();
    cache.apply_tick(&old);

    cache.remove("2");
    assert!(cache.start_download("2"));
    assert_eq!(cache.progress("2"), Some(0));
    assert_eq!(cache.apply_tick(&old), TickOutcome::Stale);

    let fresh = next_tick(&mut rx).await.unwrap();
    assert_ne!(fresh.generation, old.generation);
    assert!(matches!(cache.apply_tick(&fresh), TickOutcome::Progress(_)));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_downloads_progress_independently() {
    let (mut cache, mut rx) = setup(4);
    cache.restore(["1"]);
    cache.start_download("3");
    cache.start_download("5");
    assert_eq!(cache.active_downloads(), 2);

    let mut last: HashMap<String, u8> = HashMap::new();
    while cache.active_downloads() > 0 {
        let tick = next_tick(&mut rx).await.expect("download stalled");
        let id = tick.track_id.clone();
        if let TickOutcome::Progress(percent) = cache.apply_tick(&tick) {
            let previous = last.insert(id, percent).unwrap_or(0);
            assert!(percent > previous);
        }
    }

    assert_eq!(cache.cached_ids(), vec!["1", "3", "5"]);
    assert_eq!(cache.cached_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_on_inflight_download_is_noop() {
    let (mut cache, mut rx) = setup(5);
    assert_eq!(cache.toggle("4", true), CacheToggle::Started);
    assert_eq!(cache.toggle("4", true), CacheToggle::Unchanged);
    assert_eq!(cache.toggle("4", false), CacheToggle::Unchanged);

    let tick = next_tick(&mut rx).await.unwrap();
    assert!(matches!(cache.apply_tick(&tick), TickOutcome::Progress(_)));
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_reflects_manager() {
    let (mut cache, mut rx) = setup(6);
    cache.restore(["2", "4"]);
    cache.start_download("1");
    let tick = next_tick(&mut rx).await.unwrap();
    cache.apply_tick(&tick);

    let snapshot = cache.snapshot();
    assert_eq!(snapshot.cached_ids(), vec!["2", "4"]);
    assert_eq!(snapshot.downloading().len(), 1);
    assert_eq!(snapshot.progress("1"), cache.progress("1"));

    // Snapshots are detached copies.
    cache.remove("2");
    assert!(snapshot.entry("2").is_present());
}

#[tokio::test(start_paused = true)]
async fn test_fast_config() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let config = DownloadConfig::new()
        .with_tick_interval(Duration::from_millis(10))
        .with_increment_range(50, 50);
    let mut cache = CacheManager::new(config, Arc::new(numbered_catalog(2)), tx).unwrap();

    cache.start_download("1");
    let tick = next_tick(&mut rx).await.unwrap();
    assert_eq!(cache.apply_tick(&tick), TickOutcome::Progress(50));
    let tick = next_tick(&mut rx).await.unwrap();
    assert_eq!(cache.apply_tick(&tick), TickOutcome::Completed);
}
