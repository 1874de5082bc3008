//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the playback core and the service:
//! - Logging and tracing bootstrap
//! - Configuration and bridge wiring
//! - Event bus
//!
//! ## Overview
//!
//! Nothing here knows about tracks or caches. The playback crate publishes its
//! events through [`events::EventBus`], and the service reads its bridges from
//! [`config::CoreConfig`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
