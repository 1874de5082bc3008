//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `SettingsStore` using a SQLite-backed key-value table
//! - `NetworkMonitor` using a TCP reachability check, or a host-driven flag
//! - `RecommendationProvider` using `reqwest`
//!
//! The audio transport is deliberately absent: hosts wire their own audio
//! element to `bridge_traits::AudioTransport`.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopNetworkMonitor, SqliteSettingsStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let settings = Arc::new(SqliteSettingsStore::open_default().await?);
//!     let network = Arc::new(DesktopNetworkMonitor::new());
//!
//!     // Hand both to core_runtime::config::CoreConfig::builder()
//!     Ok(())
//! }
//! ```

mod network;
mod recommend;
mod settings;

pub use network::{DesktopNetworkMonitor, ManualNetworkMonitor};
pub use recommend::{parse_suggestions, HttpRecommendationProvider};
pub use settings::SqliteSettingsStore;
