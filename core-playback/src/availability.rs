//! # Availability Filter
//!
//! Derives the playable set from the catalog, the cache, and connectivity.
//! Online, everything in the catalog is playable. Offline, only cached tracks
//! are, still in catalog order.

use crate::catalog::{Catalog, Track, TrackId};
use std::collections::HashSet;

/// Read-only view of cache membership.
pub trait CacheView: Send + Sync {
    /// True iff the track is fully cached (`Present`).
    fn is_cached(&self, track_id: &str) -> bool;
}

impl CacheView for HashSet<TrackId> {
    fn is_cached(&self, track_id: &str) -> bool {
        self.contains(track_id)
    }
}

impl<T: CacheView + ?Sized> CacheView for &T {
    fn is_cached(&self, track_id: &str) -> bool {
        (**self).is_cached(track_id)
    }
}

/// Tracks that can be played right now, in catalog order.
pub fn playable_tracks<'a>(
    catalog: &'a Catalog,
    cache: &dyn CacheView,
    online: bool,
) -> Vec<&'a Track> {
    catalog
        .iter()
        .filter(|track| online || cache.is_cached(&track.id))
        .collect()
}

/// Membership test against [`playable_tracks`] without building the list.
pub fn is_playable(catalog: &Catalog, cache: &dyn CacheView, online: bool, track_id: &str) -> bool {
    catalog.contains(track_id) && (online || cache.is_cached(track_id))
}
