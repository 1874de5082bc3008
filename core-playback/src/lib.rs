//! # Playback Core
//!
//! The state owners of the player: the static catalog, the offline cache, the
//! playback coordinator, and the persisted snapshot.
//!
//! ## Overview
//!
//! - [`catalog`]: immutable track list loaded once at startup
//! - [`availability`]: which tracks are playable given cache and connectivity
//! - [`cache`]: offline cache state and simulated downloads
//! - [`coordinator`]: play/pause/seek, queue advance, shuffle and repeat
//! - [`transport`]: ordered worker that drives the host audio element
//! - [`persistence`]: theme, last track and cache membership records
//!
//! None of these types synchronize internally. The service crate owns them
//! from a single task and serializes every mutation through its mailbox.

pub mod availability;
pub mod cache;
pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod persistence;
pub mod state;
pub mod transport;

pub use availability::{is_playable, playable_tracks, CacheView};
pub use cache::{
    CacheEntry, CacheManager, CacheSnapshot, CacheToggle, DownloadConfig, DownloadTick,
    TickOutcome,
};
pub use catalog::{ArtistFolder, Catalog, Track, TrackId};
pub use coordinator::{PlayOutcome, PlaybackContext, PlaybackCoordinator};
pub use error::{PlaybackError, Result};
pub use persistence::{PersistedSnapshot, SnapshotStore, DEFAULT_CACHED_IDS, DEFAULT_DARK_THEME};
pub use state::{Direction, PlaybackPhase, PlaybackState, RepeatMode};
pub use transport::{run_transport, TransportCommand, TransportFailure};
