//! # Offline Cache Module
//!
//! Tracks which catalog entries are available offline and simulates their
//! downloads.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     CacheManager                       │
//! │  - start_download() / remove()         │
//! │  - apply_tick()                        │
//! │  - snapshot()                          │
//! └────────┬───────────────────────────────┘
//!          │ spawns one timer per download
//!          ▼
//!   DownloadTick ──> mpsc ──> owner calls apply_tick()
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_playback::cache::{CacheManager, DownloadConfig};
//!
//! let (tx, mut rx) = core_async::sync::mpsc::unbounded_channel();
//! let mut cache = CacheManager::new(DownloadConfig::default(), catalog, tx)?;
//!
//! cache.start_download("3");
//! while let Some(tick) = rx.recv().await {
//!     if cache.apply_tick(&tick) == TickOutcome::Completed {
//!         break;
//!     }
//! }
//! assert!(cache.is_cached("3"));
//! ```

pub mod config;
pub mod manager;
pub mod state;

pub use config::DownloadConfig;
pub use manager::{CacheManager, CacheToggle, DownloadTick, TickOutcome};
pub use state::{CacheEntry, CacheSnapshot};
