//! Player service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (settings store,
//! audio transport, network monitor, recommendation provider) into the
//! playback core and runs it as a single actor. Desktop apps typically enable
//! the `desktop-shims` feature (which depends on `bridge-desktop`) and call
//! [`bootstrap_desktop`].

pub mod error;
pub mod recommend;
pub mod service;

pub use error::{CoreError, Result};
pub use recommend::RecommendationService;
pub use service::{Intent, PlayerHandle, PlayerService, PlayerSnapshot};

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
use std::sync::Arc;

/// Convenience bootstrapper for desktop hosts.
///
/// Persists to the SQLite store under the platform data directory and checks
/// connectivity over TCP. The host still supplies its audio element.
///
/// ```ignore
/// use core_service::bootstrap_desktop;
///
/// let catalog = core_playback::Catalog::from_json(include_str!("tracks.json"))?;
/// let player = bootstrap_desktop(Arc::new(MyAudioElement::new()), catalog).await?;
/// player.play("1").await?;
/// ```
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub async fn bootstrap_desktop(
    transport: Arc<dyn bridge_traits::AudioTransport>,
    catalog: core_playback::Catalog,
) -> Result<PlayerHandle> {
    use bridge_desktop::{DesktopNetworkMonitor, SqliteSettingsStore};
    use core_runtime::config::CoreConfig;

    let store = SqliteSettingsStore::open_default()
        .await
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let config = CoreConfig::builder()
        .settings_store(Arc::new(store))
        .transport(transport)
        .network_monitor(Arc::new(DesktopNetworkMonitor::new()))
        .build()?;

    PlayerService::start(config, catalog).await
}
