//! # Transport Worker
//!
//! The coordinator never waits on the host audio element. It queues
//! [`TransportCommand`]s on an unbounded channel and a worker task applies
//! them to the [`AudioTransport`] one at a time, in submission order.
//!
//! ```text
//! PlaybackCoordinator ──TransportCommand──> run_transport ──> AudioTransport
//!         ^                                      │
//!         └──────────TransportFailure────────────┘ (via the owner's mailbox)
//! ```
//!
//! A host `play()` may resolve only once audio actually starts, or may report
//! buffering back into the player before returning. Neither holds up state
//! transitions, because the owner of the coordinator keeps handling messages
//! while the worker is parked on the host call.
//!
//! Only commands that start playback report failures. A failed `pause` or
//! `seek` is logged and dropped.

use crate::catalog::TrackId;
use crate::error::PlaybackError;
use bridge_traits::AudioTransport;
use core_async::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use std::sync::Arc;
use tracing::{debug, warn};

/// A command for the host audio element.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    /// Load `locator` and play it. `play` is skipped when the load fails.
    Start { track_id: TrackId, locator: String },
    /// Load `locator` without playing it.
    Load { track_id: TrackId, locator: String },
    /// Resume the loaded source.
    Play { track_id: TrackId },
    /// Seek to 0 and play.
    Restart { track_id: TrackId },
    Pause,
    Seek { position_secs: f64 },
}

/// A command that should have started playback was refused.
#[derive(Debug)]
pub struct TransportFailure {
    pub track_id: TrackId,
    pub error: PlaybackError,
}

impl TransportFailure {
    fn new(track_id: TrackId, action: &str, error: impl std::fmt::Display) -> Self {
        Self {
            track_id,
            error: PlaybackError::Transport(format!("{action} failed: {error}")),
        }
    }
}

/// Apply queued commands until every sender is dropped.
pub async fn run_transport(
    transport: Arc<dyn AudioTransport>,
    mut commands: UnboundedReceiver<TransportCommand>,
    failures: UnboundedSender<TransportFailure>,
) {
    while let Some(command) = commands.recv().await {
        if let Some(failure) = apply(transport.as_ref(), command).await {
            warn!(
                track_id = %failure.track_id,
                error = %failure.error,
                "Transport refused command"
            );
            if failures.send(failure).is_err() {
                debug!("Failure receiver closed");
            }
        }
    }
    debug!("Transport queue closed");
}

async fn apply(
    transport: &dyn AudioTransport,
    command: TransportCommand,
) -> Option<TransportFailure> {
    match command {
        TransportCommand::Start { track_id, locator } => {
            if let Err(e) = transport.load(&locator).await {
                return Some(TransportFailure::new(track_id, "load", e));
            }
            play(transport, track_id).await
        }
        TransportCommand::Load { track_id, locator } => {
            if let Err(e) = transport.load(&locator).await {
                warn!(%track_id, error = %e, "Transport load failed");
            }
            None
        }
        TransportCommand::Play { track_id } => play(transport, track_id).await,
        TransportCommand::Restart { track_id } => {
            if let Err(e) = transport.seek(0.0).await {
                warn!(%track_id, error = %e, "Transport seek failed");
            }
            play(transport, track_id).await
        }
        TransportCommand::Pause => {
            if let Err(e) = transport.pause().await {
                warn!(error = %e, "Transport pause failed");
            }
            None
        }
        TransportCommand::Seek { position_secs } => {
            if let Err(e) = transport.seek(position_secs).await {
                warn!(position_secs, error = %e, "Transport seek failed");
            }
            None
        }
    }
}

async fn play(transport: &dyn AudioTransport, track_id: TrackId) -> Option<TransportFailure> {
    match transport.play().await {
        Ok(()) => None,
        Err(e) => Some(TransportFailure::new(track_id, "play", e)),
    }
}
