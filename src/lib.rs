//! Workspace placeholder crate.
//!
//! This crate exposes feature flags that map to the individual workspace
//! crates (`core-service`, `core-playback`). Host applications can depend on
//! `svaram-workspace` and enable the documented features without wiring each
//! crate individually.
//!
//! - `desktop-shims` (default): the full player service with the SQLite
//!   settings store and desktop connectivity monitor.
//! - `playback-only`: the catalog, cache and coordinator without the actor.

#[cfg(feature = "desktop-shims")]
pub use core_service;

#[cfg(feature = "playback-only")]
pub use core_playback;
