//! Audio transport bridge.
//!
//! The core never decodes audio. It tells the host's audio element which
//! locator to load and when to play, pause, or seek, and it mirrors the
//! element's reported state (position, duration, buffering) back into the
//! playback state.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Host audio element driven by the playback coordinator.
///
/// Commands arrive one at a time from a dedicated worker task, in the order the
/// player issued them. A call should return once the element accepted the
/// command, not once audio is audible: while `play` is pending, later commands
/// for the element wait behind it. Reporting [`TransportEvent`]s back to the
/// player from inside a call is allowed.
///
/// A failed [`load`](AudioTransport::load) or [`play`](AudioTransport::play)
/// downgrades the player to paused; other failures are logged and ignored.
#[async_trait::async_trait]
pub trait AudioTransport: Send + Sync {
    /// Point the element at a new audio locator (URL or local path).
    async fn load(&self, locator: &str) -> Result<()>;

    /// Begin or resume playback of the loaded source.
    async fn play(&self) -> Result<()>;

    /// Pause playback without unloading.
    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position in seconds.
    async fn seek(&self, position_secs: f64) -> Result<()>;
}

/// Signals reported by the host audio element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportEvent {
    /// Periodic playhead update. `duration_secs` is 0 when not yet known.
    TimeUpdate { position_secs: f64, duration_secs: f64 },
    /// The element stalled waiting for data.
    Buffering,
    /// Enough data is available to continue.
    BufferingEnd,
    /// Stream metadata arrived.
    MetadataLoaded { duration_secs: f64 },
    /// The current source played to its end.
    Ended,
}

impl TransportEvent {
    pub fn description(&self) -> String {
        match self {
            TransportEvent::TimeUpdate {
                position_secs,
                duration_secs,
            } => format!("Time update {:.1}s / {:.1}s", position_secs, duration_secs),
            TransportEvent::Buffering => "Buffering".to_string(),
            TransportEvent::BufferingEnd => "Buffering finished".to_string(),
            TransportEvent::MetadataLoaded { duration_secs } => {
                format!("Metadata loaded ({:.1}s)", duration_secs)
            }
            TransportEvent::Ended => "Track ended".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use mockall::mock;
    use std::sync::Arc;

    mock! {
        pub Transport {}

        #[async_trait::async_trait]
        impl AudioTransport for Transport {
            async fn load(&self, locator: &str) -> Result<()>;
            async fn play(&self) -> Result<()>;
            async fn pause(&self) -> Result<()>;
            async fn seek(&self, position_secs: f64) -> Result<()>;
        }
    }

    #[tokio::test]
    async fn transport_is_object_safe() {
        let mut mock = MockTransport::new();
        mock.expect_load()
            .withf(|locator| locator == "https://cdn.example/1.mp3")
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_play()
            .times(1)
            .returning(|| Err(BridgeError::OperationFailed("autoplay blocked".into())));

        let transport: Arc<dyn AudioTransport> = Arc::new(mock);
        transport.load("https://cdn.example/1.mp3").await.unwrap();
        assert!(transport.play().await.is_err());
    }

    #[test]
    fn transport_event_serializes_with_kind_tag() {
        let event = TransportEvent::MetadataLoaded { duration_secs: 210.0 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "metadata_loaded");
        assert_eq!(json["duration_secs"], 210.0);
        assert_eq!(event.description(), "Metadata loaded (210.0s)");
    }
}
