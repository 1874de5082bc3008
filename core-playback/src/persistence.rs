//! # Persistence Snapshot
//!
//! The player keeps three independent JSON records in the host's key-value
//! store: the theme flag, the last-played track, and the cache membership.
//!
//! Reads happen once at startup and never fail. A missing record, a store
//! error, or a record that does not parse falls back to that record's default
//! and leaves the others alone.

use crate::catalog::{Track, TrackId};
use crate::error::Result;
use bridge_traits::SettingsStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Record keys in the settings store.
pub mod keys {
    pub const THEME: &str = "svaram_theme";
    pub const LAST_TRACK: &str = "svaram_last_track";
    pub const DOWNLOADS: &str = "svaram_downloads";
}

/// Cache membership on first run.
pub const DEFAULT_CACHED_IDS: [&str; 3] = ["1", "2", "4"];

pub const DEFAULT_DARK_THEME: bool = true;

/// Everything restored at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedSnapshot {
    pub dark_theme: bool,
    pub last_track: Option<Track>,
    pub cached_ids: Vec<TrackId>,
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            dark_theme: DEFAULT_DARK_THEME,
            last_track: None,
            cached_ids: DEFAULT_CACHED_IDS.iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// Reads and writes the persisted snapshot.
#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn SettingsStore>,
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Load all records, substituting defaults where needed.
    pub async fn load(&self) -> PersistedSnapshot {
        let defaults = PersistedSnapshot::default();

        PersistedSnapshot {
            dark_theme: self
                .read(keys::THEME)
                .await
                .unwrap_or(defaults.dark_theme),
            last_track: self.read(keys::LAST_TRACK).await,
            cached_ids: self
                .read(keys::DOWNLOADS)
                .await
                .unwrap_or(defaults.cached_ids),
        }
    }

    pub async fn save_theme(&self, dark: bool) -> Result<()> {
        self.write(keys::THEME, &dark).await
    }

    /// Store the last-played track, or clear the record with `None`.
    pub async fn save_last_track(&self, track: Option<&Track>) -> Result<()> {
        match track {
            Some(track) => self.write(keys::LAST_TRACK, track).await,
            None => Ok(self.store.delete(keys::LAST_TRACK).await?),
        }
    }

    pub async fn save_cache_membership(&self, ids: &[TrackId]) -> Result<()> {
        self.write(keys::DOWNLOADS, &ids).await
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get_string(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "No persisted record");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted record, using default");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Malformed persisted record, using default");
                None
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set_string(key, &raw).await?;
        debug!(key, "Persisted record");
        Ok(())
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore").finish_non_exhaustive()
    }
}
