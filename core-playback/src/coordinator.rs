//! # Playback Coordinator
//!
//! Owns [`PlaybackState`] and turns user intents, queue rules, and transport
//! signals into state transitions plus commands for the host audio element.
//!
//! Every operation is synchronous. It applies its whole state change and queues
//! [`TransportCommand`]s for the worker in [`crate::transport`]; it never waits
//! on the host. A refused `load` or `play` comes back later as a
//! [`TransportFailure`] and leaves the coordinator paused on the selected
//! track.

use crate::availability::{is_playable, playable_tracks, CacheView};
use crate::catalog::{Catalog, Track, TrackId};
use crate::state::{Direction, PlaybackPhase, PlaybackState, RepeatMode};
use crate::transport::{TransportCommand, TransportFailure};
use bridge_traits::TransportEvent;
use core_async::sync::mpsc::UnboundedSender;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, StopReason};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument, warn};

/// What the coordinator sees of the rest of the player for one operation.
#[derive(Clone, Copy)]
pub struct PlaybackContext<'a> {
    pub catalog: &'a Catalog,
    pub cache: &'a dyn CacheView,
    pub online: bool,
}

impl<'a> PlaybackContext<'a> {
    pub fn new(catalog: &'a Catalog, cache: &'a dyn CacheView, online: bool) -> Self {
        Self {
            catalog,
            cache,
            online,
        }
    }

    /// The current playable list, in catalog order.
    pub fn candidates(&self) -> Vec<&'a Track> {
        playable_tracks(self.catalog, self.cache, self.online)
    }

    pub fn is_playable(&self, track_id: &str) -> bool {
        is_playable(self.catalog, self.cache, self.online, track_id)
    }
}

/// Outcome of an operation that may select, toggle, or stop a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Rejected by policy or nothing to do. State is unchanged.
    Ignored,
    /// Same track selected again: flipped between playing and paused.
    Toggled,
    /// A track was selected and requested from the transport.
    Started,
    /// The current track was restarted from the beginning.
    Restarted,
    /// Playback stopped on the current track.
    Stopped,
}

/// Drives playback for a single session.
pub struct PlaybackCoordinator {
    state: PlaybackState,
    transport: UnboundedSender<TransportCommand>,
    rng: StdRng,
    event_bus: Option<EventBus>,
}

impl PlaybackCoordinator {
    /// Commands for the host audio element are queued on `transport`.
    pub fn new(transport: UnboundedSender<TransportCommand>) -> Self {
        Self {
            state: PlaybackState::default(),
            transport,
            rng: StdRng::from_entropy(),
            event_bus: None,
        }
    }

    /// Use a specific random source for shuffle draws.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase()
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.state.current_track_id.as_deref()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select a track.
    ///
    /// Unplayable tracks (unknown, or offline and not cached) are rejected
    /// without touching state. Selecting the current track again without
    /// `forced` toggles between playing and paused. Anything else loads the
    /// track from the start and plays it.
    #[instrument(skip(self, ctx), fields(online = ctx.online))]
    pub fn play(
        &mut self,
        track_id: &str,
        forced: bool,
        ctx: &PlaybackContext<'_>,
    ) -> PlayOutcome {
        let Some(track) = ctx.catalog.get(track_id) else {
            debug!("Ignoring play for unknown track");
            return PlayOutcome::Ignored;
        };

        if !ctx.is_playable(track_id) {
            debug!("Track not playable offline");
            return PlayOutcome::Ignored;
        }

        if self.state.is_current(track_id) && !forced {
            if self.state.is_playing {
                self.pause();
            } else {
                self.resume(ctx);
            }
            return PlayOutcome::Toggled;
        }

        self.state.current_track_id = Some(track.id.clone());
        self.state.position_secs = 0.0;
        self.state.duration_secs = 0.0;
        self.state.is_buffering = true;
        self.state.is_playing = true;

        info!(title = %track.title, "Track changed");
        self.emit(PlaybackEvent::TrackChanged {
            track_id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
        });

        self.send(TransportCommand::Start {
            track_id: track.id.clone(),
            locator: track.audio_url.clone(),
        });
        PlayOutcome::Started
    }

    /// Pause the current track. Returns `false` when nothing was playing.
    pub fn pause(&mut self) -> bool {
        let Some(track_id) = self.state.current_track_id.clone() else {
            return false;
        };
        if !self.state.is_playing {
            return false;
        }

        self.state.is_playing = false;
        self.emit(PlaybackEvent::Paused { track_id });
        self.send(TransportCommand::Pause);
        true
    }

    /// Resume the current track if it is still playable.
    pub fn resume(&mut self, ctx: &PlaybackContext<'_>) -> bool {
        let Some(track_id) = self.state.current_track_id.clone() else {
            return false;
        };
        if self.state.is_playing {
            return false;
        }
        if !ctx.is_playable(&track_id) {
            debug!(%track_id, "Cannot resume: track not playable offline");
            return false;
        }

        self.state.is_playing = true;
        self.emit(PlaybackEvent::Resumed {
            track_id: track_id.clone(),
        });
        self.send(TransportCommand::Play { track_id });
        true
    }

    pub fn toggle_play(&mut self, ctx: &PlaybackContext<'_>) -> bool {
        if self.state.is_playing {
            self.pause()
        } else {
            self.resume(ctx)
        }
    }

    /// Move the playhead, clamped to `[0, duration]` when the duration is known.
    ///
    /// Returns the applied position, or `None` when there is no current
    /// track or the input is not a finite number.
    pub fn seek(&mut self, position_secs: f64) -> Option<f64> {
        let track_id = self.state.current_track_id.clone()?;
        if !position_secs.is_finite() {
            return None;
        }

        let mut position = position_secs.max(0.0);
        if self.state.has_duration() {
            position = position.min(self.state.duration_secs);
        }
        self.state.position_secs = position;

        self.emit(PlaybackEvent::Seeked {
            track_id,
            position_ms: (position * 1000.0).round() as u64,
        });
        self.send(TransportCommand::Seek {
            position_secs: position,
        });
        Some(position)
    }

    // ========================================================================
    // Queue
    // ========================================================================

    /// Select the next or previous track from the playable list.
    ///
    /// With repeat-one, `Next` restarts the current track. With shuffle,
    /// `Next` draws a random track, never the current one when there is a
    /// choice; `Previous` always steps back in order.
    #[instrument(skip(self, ctx), fields(online = ctx.online))]
    pub fn advance(&mut self, direction: Direction, ctx: &PlaybackContext<'_>) -> PlayOutcome {
        if direction == Direction::Next && self.state.repeat_mode == RepeatMode::One {
            return self.restart(ctx);
        }

        let candidates = ctx.candidates();
        let len = candidates.len();
        if len == 0 {
            debug!("No playable tracks");
            return PlayOutcome::Ignored;
        }

        let current = self
            .state
            .current_track_id
            .as_deref()
            .and_then(|id| candidates.iter().position(|t| t.id == id));

        let index = match direction {
            Direction::Next if self.state.shuffle_enabled => {
                let draw = self.rng.gen_range(0..len);
                if len > 1 && Some(draw) == current {
                    (draw + 1) % len
                } else {
                    draw
                }
            }
            Direction::Next => current.map_or(0, |i| (i + 1) % len),
            Direction::Previous => current.map_or(len - 1, |i| (i + len - 1) % len),
        };

        let target: TrackId = candidates[index].id.clone();
        self.play(&target, true, ctx)
    }

    /// Handle the transport reaching the end of the current track.
    ///
    /// With repeat off and shuffle off, playback stops on the last playable
    /// track instead of wrapping. Everything else advances.
    pub fn on_track_ended(&mut self, ctx: &PlaybackContext<'_>) -> PlayOutcome {
        if self.state.repeat_mode == RepeatMode::Off && !self.state.shuffle_enabled {
            let candidates = ctx.candidates();
            let at_end = match (candidates.last(), self.state.current_track_id.as_deref()) {
                (None, _) => true,
                (Some(last), Some(current)) => last.id == current,
                (Some(_), None) => false,
            };
            if at_end {
                return self.stop(StopReason::EndOfQueue);
            }
        }

        match self.advance(Direction::Next, ctx) {
            PlayOutcome::Ignored => self.stop(StopReason::EndOfQueue),
            outcome => outcome,
        }
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.state.shuffle_enabled = !self.state.shuffle_enabled;
        self.emit(PlaybackEvent::ShuffleChanged {
            enabled: self.state.shuffle_enabled,
        });
        self.state.shuffle_enabled
    }

    /// Cycle `Off → All → One → Off`.
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.state.repeat_mode = self.state.repeat_mode.next();
        self.emit(PlaybackEvent::RepeatModeChanged {
            mode: self.state.repeat_mode.as_str().to_string(),
        });
        self.state.repeat_mode
    }

    // ========================================================================
    // Connectivity and cache
    // ========================================================================

    /// Stop an uncached current track after the device went offline.
    ///
    /// The track stays selected so its metadata remains visible.
    pub fn on_connectivity_lost(&mut self, ctx: &PlaybackContext<'_>) -> bool {
        let Some(track_id) = self.state.current_track_id.clone() else {
            return false;
        };
        if !self.state.is_playing || ctx.cache.is_cached(&track_id) {
            return false;
        }

        info!(%track_id, "Connectivity lost, stopping uncached track");
        self.stop(StopReason::ConnectivityLost) == PlayOutcome::Stopped
    }

    /// Stop playback when the current track was removed from the cache while
    /// offline. `ctx` must already reflect the removal.
    pub fn on_cache_removed(&mut self, track_id: &str, ctx: &PlaybackContext<'_>) -> bool {
        if !self.state.is_current(track_id) || !self.state.is_playing {
            return false;
        }
        if ctx.is_playable(track_id) {
            return false;
        }

        info!(%track_id, "Current track evicted while offline");
        self.stop(StopReason::Evicted) == PlayOutcome::Stopped
    }

    /// Select a previously persisted track, paused at the start.
    pub fn restore(&mut self, track: &Track) {
        self.state.current_track_id = Some(track.id.clone());
        self.state.is_playing = false;
        self.state.is_buffering = false;
        self.state.position_secs = 0.0;
        self.state.duration_secs = 0.0;

        debug!(track_id = %track.id, "Restored last track");
        self.emit(PlaybackEvent::TrackChanged {
            track_id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
        });
        self.send(TransportCommand::Load {
            track_id: track.id.clone(),
            locator: track.audio_url.clone(),
        });
    }

    /// Apply a refused `load` or `play` reported by the transport worker.
    ///
    /// Returns `false` when the failure is stale: the user already moved to
    /// another track, or the track is no longer playing.
    pub fn on_transport_failed(&mut self, failure: &TransportFailure) -> bool {
        if !self.state.is_current(&failure.track_id) || !self.state.is_playing {
            debug!(track_id = %failure.track_id, "Ignoring stale transport failure");
            return false;
        }
        warn!(
            track_id = %failure.track_id,
            error = %failure.error,
            "Transport failure, pausing"
        );
        self.state.is_playing = false;
        self.state.is_buffering = false;
        self.emit(PlaybackEvent::Error {
            track_id: Some(failure.track_id.clone()),
            message: failure.error.to_string(),
            recoverable: failure.error.is_transient(),
        });
        true
    }

    // ========================================================================
    // Transport signals
    // ========================================================================

    pub fn on_time_update(&mut self, position_secs: f64, duration_secs: f64) {
        if self.state.current_track_id.is_none() || !position_secs.is_finite() {
            return;
        }
        if duration_secs.is_finite() && duration_secs > 0.0 {
            self.state.duration_secs = duration_secs;
        }

        let mut position = position_secs.max(0.0);
        if self.state.has_duration() {
            position = position.min(self.state.duration_secs);
        }
        self.state.position_secs = position;
    }

    pub fn on_buffering(&mut self) {
        if self.state.current_track_id.is_some() {
            self.state.is_buffering = true;
        }
    }

    pub fn on_buffering_end(&mut self) {
        self.state.is_buffering = false;
    }

    pub fn on_metadata_loaded(&mut self, duration_secs: f64) {
        if self.state.current_track_id.is_none()
            || !duration_secs.is_finite()
            || duration_secs < 0.0
        {
            return;
        }
        self.state.duration_secs = duration_secs;
        if self.state.has_duration() {
            self.state.position_secs = self.state.position_secs.min(duration_secs);
        }
    }

    /// Mirror a transport signal. Returns the queue outcome for `Ended`.
    pub fn handle_transport_event(
        &mut self,
        event: &TransportEvent,
        ctx: &PlaybackContext<'_>,
    ) -> Option<PlayOutcome> {
        match event {
            TransportEvent::TimeUpdate {
                position_secs,
                duration_secs,
            } => self.on_time_update(*position_secs, *duration_secs),
            TransportEvent::Buffering => self.on_buffering(),
            TransportEvent::BufferingEnd => self.on_buffering_end(),
            TransportEvent::MetadataLoaded { duration_secs } => {
                self.on_metadata_loaded(*duration_secs)
            }
            TransportEvent::Ended => return Some(self.on_track_ended(ctx)),
        }
        None
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn restart(&mut self, ctx: &PlaybackContext<'_>) -> PlayOutcome {
        let Some(track_id) = self.state.current_track_id.clone() else {
            return PlayOutcome::Ignored;
        };
        if !ctx.is_playable(&track_id) {
            debug!(%track_id, "Cannot restart: track not playable offline");
            return PlayOutcome::Ignored;
        }

        self.state.position_secs = 0.0;
        self.state.is_playing = true;
        self.emit(PlaybackEvent::Restarted {
            track_id: track_id.clone(),
        });
        self.send(TransportCommand::Restart { track_id });
        PlayOutcome::Restarted
    }

    fn stop(&mut self, reason: StopReason) -> PlayOutcome {
        let Some(track_id) = self.state.current_track_id.clone() else {
            return PlayOutcome::Ignored;
        };

        let was_playing = self.state.is_playing;
        self.state.is_playing = false;
        self.state.is_buffering = false;
        self.emit(PlaybackEvent::Stopped {
            track_id: track_id.clone(),
            reason,
        });

        if was_playing && reason != StopReason::EndOfQueue {
            self.send(TransportCommand::Pause);
        }
        PlayOutcome::Stopped
    }

    fn send(&self, command: TransportCommand) {
        if self.transport.send(command).is_err() {
            warn!("Transport worker stopped; dropping command");
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Playback(event));
        }
    }
}

impl std::fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("state", &self.state)
            .finish()
    }
}
