//! Cache entry states and read-only snapshots

use crate::availability::CacheView;
use crate::catalog::TrackId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a track stands in the offline cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "progress", rename_all = "snake_case")]
pub enum CacheEntry {
    /// Remote only.
    #[default]
    Absent,
    /// In flight, 0–99 percent.
    Downloading(u8),
    /// Fully cached, playable offline.
    Present,
}

impl CacheEntry {
    pub fn is_present(&self) -> bool {
        matches!(self, CacheEntry::Present)
    }

    pub fn progress(&self) -> Option<u8> {
        match self {
            CacheEntry::Downloading(percent) => Some(*percent),
            _ => None,
        }
    }
}

/// Immutable copy of the cache state handed to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheSnapshot {
    entries: BTreeMap<TrackId, CacheEntry>,
}

impl CacheSnapshot {
    pub(crate) fn from_entries(entries: BTreeMap<TrackId, CacheEntry>) -> Self {
        Self { entries }
    }

    pub fn entry(&self, track_id: &str) -> CacheEntry {
        self.entries.get(track_id).copied().unwrap_or_default()
    }

    pub fn progress(&self, track_id: &str) -> Option<u8> {
        self.entry(track_id).progress()
    }

    /// Cached ids, sorted by id.
    pub fn cached_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_present())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// In-flight downloads with their progress, sorted by id.
    pub fn downloading(&self) -> Vec<(&str, u8)> {
        self.entries
            .iter()
            .filter_map(|(id, entry)| entry.progress().map(|p| (id.as_str(), p)))
            .collect()
    }

    pub fn cached_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_present()).count()
    }
}

impl CacheView for CacheSnapshot {
    fn is_cached(&self, track_id: &str) -> bool {
        self.entry(track_id).is_present()
    }
}
