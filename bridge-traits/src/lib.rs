//! # Host Bridge Traits
//!
//! Collaborator contracts between the playback core and the host platform.
//!
//! ## Overview
//!
//! The core decides what plays, what is cached, and what is playable offline.
//! Everything it cannot do by itself is reached through one of these traits:
//!
//! - [`NetworkMonitor`](network::NetworkMonitor) - Online/offline flag and transition stream
//! - [`SettingsStore`](storage::SettingsStore) - Key-value store backing the persisted snapshot
//! - [`AudioTransport`](playback::AudioTransport) - The audio element: load, play, pause, seek
//! - [`RecommendationProvider`](recommend::RecommendationProvider) - Free-text track suggestions
//!
//! Transport-originated signals (time updates, buffering, end of track) flow back
//! into the core as [`TransportEvent`](playback::TransportEvent) values.
//!
//! ## Platform Implementations
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop  | `bridge-desktop`    |
//! | Mobile   | Host-provided adapters |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). The core never
//! treats a bridge failure as fatal: transport failures downgrade playback,
//! storage failures fall back to defaults, and recommendation failures yield
//! an empty list.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared as
//! `Arc<dyn Trait>` across the service actor and its helper tasks.

pub mod error;
pub mod network;
pub mod playback;
pub mod recommend;
pub mod storage;

pub use error::BridgeError;

pub use network::{NetworkChangeStream, NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType};
pub use playback::{AudioTransport, TransportEvent};
pub use recommend::{RecommendationProvider, Suggestion};
pub use storage::SettingsStore;
