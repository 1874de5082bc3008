//! Shared fakes for the core-playback integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{AudioTransport, BridgeError, SettingsStore};
use core_playback::{Catalog, Track};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

// ============================================================================
// Recording transport
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Load(String),
    Play,
    Pause,
    Seek(f64),
}

/// Transport that records every command and can be told to reject `play`.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<TransportCall>>,
    fail_play: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take_calls(&self) -> Vec<TransportCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
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
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("play() rejected".into()));
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

// ============================================================================
// In-memory settings store
// ============================================================================

#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
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

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
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
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BridgeError::DatabaseError("disk I/O error".into()));
        }
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
// Fixtures
// ============================================================================

/// Catalog of `n` tracks with ids "1".."n".
pub fn numbered_catalog(n: usize) -> Catalog {
    Catalog::new(
        (1..=n)
            .map(|i| {
                Track::new(
                    i.to_string(),
                    format!("Song {i}"),
                    if i % 2 == 0 { "Even" } else { "Odd" },
                    format!("https://cdn.example.com/{i}.mp3"),
                )
                .with_duration(180)
            })
            .collect(),
    )
    .unwrap()
}

/// Catalog with tracks "A", "B", "C".
pub fn abc_catalog() -> Catalog {
    Catalog::new(
        ["A", "B", "C"]
            .into_iter()
            .map(|id| Track::new(id, format!("Track {id}"), "Artist", format!("{id}.mp3")))
            .collect(),
    )
    .unwrap()
}
