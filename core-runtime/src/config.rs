//! # Core Configuration Module
//!
//! Builds the [`CoreConfig`] that wires host bridges into the player service.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern and fails fast when a
//! required bridge is missing, with a message that says which capability the
//! host must provide.
//!
//! ## Required Dependencies
//!
//! - `SettingsStore` - Backing store for the persisted snapshot
//! - `AudioTransport` - The host audio element
//!
//! ## Optional Dependencies
//!
//! - `NetworkMonitor` - Connectivity source; without it the service starts with
//!   [`CoreConfig::initially_online`] and the host reports changes manually
//! - `RecommendationProvider` - Suggestion backend; without it suggestions are empty
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .settings_store(Arc::new(SqliteSettingsStore::open_default().await?))
//!     .transport(Arc::new(MyAudioElement::new()))
//!     .network_monitor(Arc::new(DesktopNetworkMonitor::new()))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{AudioTransport, NetworkMonitor, RecommendationProvider, SettingsStore};
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound for a recommendation request.
pub const DEFAULT_RECOMMENDATION_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_EVENT_BUFFER_SIZE: usize = 10_000;

/// Core configuration for the player service.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Key-value store holding theme, last track, and cache membership (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// Host audio element (required)
    pub transport: Arc<dyn AudioTransport>,

    /// Connectivity source (optional)
    pub network_monitor: Option<Arc<dyn NetworkMonitor>>,

    /// Suggestion backend (optional)
    pub recommendation_provider: Option<Arc<dyn RecommendationProvider>>,

    /// Connectivity assumed at startup when no monitor is configured
    pub initially_online: bool,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    /// Upper bound on a single recommendation request
    pub recommendation_timeout: Duration,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("settings_store", &"SettingsStore { ... }")
            .field("transport", &"AudioTransport { ... }")
            .field(
                "network_monitor",
                &self
                    .network_monitor
                    .as_ref()
                    .map(|_| "NetworkMonitor { ... }"),
            )
            .field(
                "recommendation_provider",
                &self
                    .recommendation_provider
                    .as_ref()
                    .map(|_| "RecommendationProvider { ... }"),
            )
            .field("initially_online", &self.initially_online)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("recommendation_timeout", &self.recommendation_timeout)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size {} exceeds maximum of {}",
                self.event_buffer_size, MAX_EVENT_BUFFER_SIZE
            )));
        }

        if self.recommendation_timeout.is_zero() {
            return Err(Error::Config(
                "Recommendation timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    settings_store: Option<Arc<dyn SettingsStore>>,
    transport: Option<Arc<dyn AudioTransport>>,
    network_monitor: Option<Arc<dyn NetworkMonitor>>,
    recommendation_provider: Option<Arc<dyn RecommendationProvider>>,
    initially_online: Option<bool>,
    event_buffer_size: Option<usize>,
    recommendation_timeout: Option<Duration>,
}

impl CoreConfigBuilder {
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn AudioTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn network_monitor(mut self, monitor: Arc<dyn NetworkMonitor>) -> Self {
        self.network_monitor = Some(monitor);
        self
    }

    pub fn recommendation_provider(mut self, provider: Arc<dyn RecommendationProvider>) -> Self {
        self.recommendation_provider = Some(provider);
        self
    }

    /// Connectivity assumed at startup when no `NetworkMonitor` is set (default: online).
    pub fn initially_online(mut self, online: bool) -> Self {
        self.initially_online = Some(online);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn recommendation_timeout(mut self, timeout: Duration) -> Self {
        self.recommendation_timeout = Some(timeout);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when a required bridge is absent and
    /// [`Error::Config`] when a value is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let settings_store = self.settings_store.ok_or_else(|| {
            Error::capability_missing(
                "SettingsStore",
                "No settings store provided for the persisted player snapshot. \
                 Desktop: use bridge_desktop::SqliteSettingsStore. \
                 Mobile: inject a UserDefaults/SharedPreferences adapter.",
            )
        })?;

        let transport = self.transport.ok_or_else(|| {
            Error::capability_missing(
                "AudioTransport",
                "No audio transport provided. The host must wrap its audio \
                 element in bridge_traits::AudioTransport.",
            )
        })?;

        let config = CoreConfig {
            settings_store,
            transport,
            network_monitor: self.network_monitor,
            recommendation_provider: self.recommendation_provider,
            initially_online: self.initially_online.unwrap_or(true),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            recommendation_timeout: self
                .recommendation_timeout
                .unwrap_or(DEFAULT_RECOMMENDATION_TIMEOUT),
        };

        config.validate()?;
        Ok(config)
    }
}
