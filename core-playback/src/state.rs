//! Playback state owned by the coordinator.

use crate::catalog::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repeat behaviour when advancing or when a track ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::All => "all",
            RepeatMode::One => "one",
        }
    }

    /// Next mode in the `Off → All → One → Off` cycle.
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queue direction for [`advance`](crate::coordinator::PlaybackCoordinator::advance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
}

/// State machine position derived from [`PlaybackState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// No current track.
    Idle,
    /// Track selected and meant to play, waiting on the transport.
    Loading,
    Playing,
    Paused,
}

/// Observable playback state.
///
/// Invariants: `is_playing` implies `current_track_id.is_some()`, and
/// `position_secs <= duration_secs` whenever the duration is known (non-zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlaybackState {
    pub current_track_id: Option<TrackId>,
    pub is_playing: bool,
    pub is_buffering: bool,
    pub position_secs: f64,
    /// 0 while unknown.
    pub duration_secs: f64,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
}

impl PlaybackState {
    pub fn phase(&self) -> PlaybackPhase {
        match (&self.current_track_id, self.is_playing, self.is_buffering) {
            (None, _, _) => PlaybackPhase::Idle,
            (Some(_), true, true) => PlaybackPhase::Loading,
            (Some(_), true, false) => PlaybackPhase::Playing,
            (Some(_), false, _) => PlaybackPhase::Paused,
        }
    }

    pub fn is_current(&self, track_id: &str) -> bool {
        self.current_track_id.as_deref() == Some(track_id)
    }

    pub fn has_duration(&self) -> bool {
        self.duration_secs > 0.0
    }
}
