//! # Offline Cache Manager
//!
//! Owns the cache state and drives the simulated background downloads.
//!
//! Each in-flight download has a timer task that emits a [`DownloadTick`] on
//! the manager's tick channel every `tick_interval`. The task never touches
//! cache state: whoever owns the receiving end feeds the ticks back through
//! [`CacheManager::apply_tick`], so every mutation happens on one writer.
//!
//! Timers are held by [`TaskGuard`]s keyed by track id. Removing a track drops
//! its guard (aborting the timer), and the per-download generation makes any
//! tick that was already queued for the old download come back as
//! [`TickOutcome::Stale`].

use crate::availability::CacheView;
use crate::cache::config::DownloadConfig;
use crate::cache::state::{CacheEntry, CacheSnapshot};
use crate::catalog::{Catalog, TrackId};
use crate::error::{PlaybackError, Result};
use core_async::sync::mpsc::UnboundedSender;
use core_async::task::{spawn, TaskGuard};
use core_async::time::sleep;
use core_runtime::events::{CacheEvent, CoreEvent, EventBus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A progress tick for one in-flight download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTick {
    pub track_id: TrackId,
    /// Identifies the download this tick belongs to.
    pub generation: u64,
}

/// Result of applying a [`DownloadTick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Download advanced to the given percentage (still below 100).
    Progress(u8),
    /// Download reached 100 and the track is now `Present`.
    Completed,
    /// Tick belongs to a cancelled or finished download and was ignored.
    Stale,
}

/// Result of [`CacheManager::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheToggle {
    Removed,
    Started,
    Unchanged,
}

struct DownloadTimer {
    generation: u64,
    _task: TaskGuard,
}

/// Offline cache manager.
pub struct CacheManager {
    config: DownloadConfig,
    catalog: Arc<Catalog>,
    entries: HashMap<TrackId, CacheEntry>,
    timers: HashMap<TrackId, DownloadTimer>,
    next_generation: u64,
    ticks: UnboundedSender<DownloadTick>,
    rng: StdRng,
    event_bus: Option<EventBus>,
}

impl CacheManager {
    /// Create a cache manager for `catalog`.
    ///
    /// Download timers send their ticks on `ticks`; the receiver's owner must
    /// pass them back to [`apply_tick`](Self::apply_tick).
    pub fn new(
        config: DownloadConfig,
        catalog: Arc<Catalog>,
        ticks: UnboundedSender<DownloadTick>,
    ) -> Result<Self> {
        config.validate().map_err(PlaybackError::InvalidConfig)?;

        Ok(Self {
            config,
            catalog,
            entries: HashMap::new(),
            timers: HashMap::new(),
            next_generation: 0,
            ticks,
            rng: StdRng::from_entropy(),
            event_bus: None,
        })
    }

    /// Use a specific random source for progress increments.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Mark persisted ids as cached. Ids missing from the catalog are dropped.
    ///
    /// Returns the number of tracks restored.
    pub fn restore<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut restored = 0;
        for id in ids {
            let id = id.as_ref();
            if !self.catalog.contains(id) {
                debug!(track_id = id, "Dropping persisted cache entry for unknown track");
                continue;
            }
            self.timers.remove(id);
            self.entries.insert(id.to_string(), CacheEntry::Present);
            restored += 1;
        }
        restored
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn entry(&self, track_id: &str) -> CacheEntry {
        self.entries.get(track_id).copied().unwrap_or_default()
    }

    pub fn is_cached(&self, track_id: &str) -> bool {
        self.entry(track_id).is_present()
    }

    /// In-flight download percentage, if the track is downloading.
    pub fn progress(&self, track_id: &str) -> Option<u8> {
        self.entry(track_id).progress()
    }

    /// Cached track ids in catalog order.
    pub fn cached_ids(&self) -> Vec<TrackId> {
        self.catalog
            .ids()
            .filter(|id| self.is_cached(id))
            .map(str::to_string)
            .collect()
    }

    pub fn cached_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_present()).count()
    }

    /// Number of running download timers.
    pub fn active_downloads(&self) -> usize {
        self.timers.len()
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        let entries: BTreeMap<_, _> = self
            .entries
            .iter()
            .map(|(id, entry)| (id.clone(), *entry))
            .collect();
        CacheSnapshot::from_entries(entries)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Begin downloading a track.
    ///
    /// Returns `false` without changing anything when the id is unknown, the
    /// track is already cached, or a download is already in flight.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(self))]
    pub fn start_download(&mut self, track_id: &str) -> bool {
        if !self.catalog.contains(track_id) {
            debug!("Ignoring download for unknown track");
            return false;
        }

        match self.entry(track_id) {
            CacheEntry::Present => {
                debug!("Track already cached");
                return false;
            }
            CacheEntry::Downloading(_) => {
                debug!("Download already in flight");
                return false;
            }
            CacheEntry::Absent => {}
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let task = self.spawn_timer(track_id.to_string(), generation);

        self.entries
            .insert(track_id.to_string(), CacheEntry::Downloading(0));
        self.timers.insert(
            track_id.to_string(),
            DownloadTimer {
                generation,
                _task: task,
            },
        );

        info!(generation, "Download started");
        self.emit(CacheEvent::DownloadStarted {
            track_id: track_id.to_string(),
        });
        true
    }

    /// Drop a track from the cache, cancelling its download if one is running.
    ///
    /// Returns the entry the track had, or `None` if it was already absent.
    #[instrument(skip(self))]
    pub fn remove(&mut self, track_id: &str) -> Option<CacheEntry> {
        let previous = self.entries.remove(track_id)?;
        let was_downloading = self.timers.remove(track_id).is_some();

        info!(?previous, "Removed from cache");
        self.emit(CacheEvent::Removed {
            track_id: track_id.to_string(),
            was_downloading,
        });
        Some(previous)
    }

    /// Remove when cached, start a download when online, otherwise nothing.
    ///
    /// A track that is still downloading is left alone.
    pub fn toggle(&mut self, track_id: &str, online: bool) -> CacheToggle {
        if self.is_cached(track_id) {
            self.remove(track_id);
            CacheToggle::Removed
        } else if online && self.start_download(track_id) {
            CacheToggle::Started
        } else {
            CacheToggle::Unchanged
        }
    }

    /// Advance the download a tick belongs to.
    pub fn apply_tick(&mut self, tick: &DownloadTick) -> TickOutcome {
        let current = self
            .timers
            .get(&tick.track_id)
            .map(|timer| timer.generation);
        if current != Some(tick.generation) {
            debug!(track_id = %tick.track_id, generation = tick.generation, "Discarding stale tick");
            return TickOutcome::Stale;
        }

        let CacheEntry::Downloading(progress) = self.entry(&tick.track_id) else {
            self.timers.remove(&tick.track_id);
            return TickOutcome::Stale;
        };

        let increment = self.rng.gen_range(self.config.increment_range());
        let next = progress.saturating_add(increment).min(100);

        if next >= 100 {
            self.timers.remove(&tick.track_id);
            self.entries
                .insert(tick.track_id.clone(), CacheEntry::Present);
            info!(track_id = %tick.track_id, "Download completed");
            self.emit(CacheEvent::DownloadCompleted {
                track_id: tick.track_id.clone(),
            });
            TickOutcome::Completed
        } else {
            self.entries
                .insert(tick.track_id.clone(), CacheEntry::Downloading(next));
            debug!(track_id = %tick.track_id, percent = next, "Download progress");
            self.emit(CacheEvent::DownloadProgress {
                track_id: tick.track_id.clone(),
                percent: next,
            });
            TickOutcome::Progress(next)
        }
    }

    /// Abort every running download and forget its partial progress.
    ///
    /// Returns how many downloads were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled: Vec<TrackId> = self.timers.drain().map(|(id, _)| id).collect();
        for id in &cancelled {
            self.entries.remove(id);
        }
        if !cancelled.is_empty() {
            info!(count = cancelled.len(), "Cancelled in-flight downloads");
        }
        cancelled.len()
    }

    fn spawn_timer(&self, track_id: TrackId, generation: u64) -> TaskGuard {
        let interval = self.config.tick_interval;
        let ticks = self.ticks.clone();

        TaskGuard::new(spawn(async move {
            loop {
                sleep(interval).await;
                let tick = DownloadTick {
                    track_id: track_id.clone(),
                    generation,
                };
                if ticks.send(tick).is_err() {
                    break;
                }
            }
        }))
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Cache(event));
        }
    }
}

impl CacheView for CacheManager {
    fn is_cached(&self, track_id: &str) -> bool {
        CacheManager::is_cached(self, track_id)
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("entries", &self.entries)
            .field("active_downloads", &self.timers.len())
            .finish()
    }
}
