//! Fakes shared by the service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AudioTransport, BridgeError, RecommendationProvider, SettingsStore, Suggestion,
    TransportEvent,
};
use core_async::sync::watch;
use core_async::time::{sleep, timeout, Duration};
use core_playback::{Catalog, Track};
use core_service::PlayerHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// Transport
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Load(String),
    Play,
    Pause,
    Seek(f64),
}

/// Records every command. Can reject `play`, or hold `play` open until
/// [`RecordingTransport::open_gate`] is called.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<TransportCall>>,
    fail_play: AtomicBool,
    gate: Option<watch::Sender<bool>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let transport = Self::default();
        transport.fail_play.store(true, Ordering::SeqCst);
        transport
    }

    /// `play` stays pending until the gate opens, like a media element that
    /// resolves only once audio starts.
    pub fn gated() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.send_replace(true);
        }
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until at least `count` commands reached the transport.
    pub async fn wait_for_calls(&self, count: usize) -> Vec<TransportCall> {
        timeout(Duration::from_secs(5), async {
            loop {
                let calls = self.calls();
                if calls.len() >= count {
                    return calls;
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("transport commands did not arrive")
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AudioTransport for RecordingTransport {
    async fn load(&self, locator: &str) -> BridgeResult<()> {
        self.record(TransportCall::Load(locator.to_string()));
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.record(TransportCall::Play);
        if let Some(gate) = &self.gate {
            let mut open = gate.subscribe();
            let _ = open.wait_for(|open| *open).await;
        }
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("NotAllowedError".into()));
        }
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.record(TransportCall::Pause);
        Ok(())
    }

    async fn seek(&self, position_secs: f64) -> BridgeResult<()> {
        self.record(TransportCall::Seek(position_secs));
        Ok(())
    }
}

/// Transport whose `play` reports buffering back into the player before
/// returning.
#[derive(Default)]
pub struct ReentrantTransport {
    player: Mutex<Option<PlayerHandle>>,
    plays_completed: AtomicUsize,
}

impl ReentrantTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, player: PlayerHandle) {
        *self.player.lock().unwrap() = Some(player);
    }

    pub fn plays_completed(&self) -> usize {
        self.plays_completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioTransport for ReentrantTransport {
    async fn load(&self, _locator: &str) -> BridgeResult<()> {
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        let player = self.player.lock().unwrap().clone();
        if let Some(player) = player {
            player
                .transport_event(TransportEvent::Buffering)
                .await
                .map_err(|e| BridgeError::OperationFailed(e.to_string()))?;
        }
        self.plays_completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        Ok(())
    }

    async fn seek(&self, _position_secs: f64) -> BridgeResult<()> {
        Ok(())
    }
}

// ============================================================================
// Settings store
// ============================================================================

#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        Ok(self.values.lock().unwrap().keys().cloned().collect())
    }

    async fn clear_all(&self) -> BridgeResult<()> {
        self.values.lock().unwrap().clear();
        Ok(())
    }
}

// ============================================================================
// Recommendation provider
// ============================================================================

/// Provider that answers after `delay`.
pub struct SlowProvider {
    pub delay: Duration,
}

#[async_trait]
impl RecommendationProvider for SlowProvider {
    async fn suggest(&self, prompt: &str) -> BridgeResult<Vec<Suggestion>> {
        sleep(self.delay).await;
        Ok(vec![Suggestion::new(format!("{prompt} (live)"), "Band")])
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Six tracks with ids "1".."6".
pub fn catalog() -> Catalog {
    Catalog::new(
        (1..=6)
            .map(|i| {
                Track::new(
                    i.to_string(),
                    format!("Song {i}"),
                    "Artist",
                    format!("https://cdn.example.com/{i}.mp3"),
                )
                .with_duration(200)
            })
            .collect(),
    )
    .unwrap()
}

pub fn ids(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.id.as_str()).collect()
}
