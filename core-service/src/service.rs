//! # Player Service
//!
//! The single writer for all player state.
//!
//! ## Architecture
//!
//! ```text
//!  PlayerHandle ──────┐
//!  NetworkMonitor ────┤
//!  DownloadTicks ─────┼──> mailbox (mpsc) ──> PlayerActor ──> watch<PlayerSnapshot>
//!  TransportFailures ─┘                         │  │    └───> EventBus
//!         ^                                     │  └──> persistence writer (mpsc)
//!         └──── transport worker <──────────────┘
//! ```
//!
//! Every intent, transport signal, connectivity change and download tick is a
//! message in one mailbox. The actor handles each message to completion, then
//! publishes a fresh [`PlayerSnapshot`], so observers never see a
//! half-applied transition. Handling a message never waits on the host:
//! commands for the audio element and persistence writes are queued to
//! dedicated tasks and applied in submission order. A refused `load` or `play`
//! returns to the mailbox as a message of its own.

use crate::error::{CoreError, Result};
use crate::recommend::RecommendationService;
use bridge_traits::{NetworkChangeStream, Suggestion, TransportEvent};
use core_async::sync::{mpsc, oneshot, watch};
use core_async::task::{spawn, JoinHandle, TaskGuard};
use core_playback::{
    playable_tracks, run_transport, CacheManager, CacheSnapshot, CacheToggle, Catalog, Direction,
    DownloadConfig, DownloadTick, PlaybackContext, PlaybackCoordinator, PlaybackPhase,
    PlaybackState, SnapshotStore, Track, TrackId, TransportFailure,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{ConnectivityEvent, CoreEvent, EventBus, EventStream, SettingsEvent};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ============================================================================
// Public types
// ============================================================================

/// Everything a presentation layer renders, captured after one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub playback: PlaybackState,
    pub phase: PlaybackPhase,
    pub current_track: Option<Track>,
    pub cache: CacheSnapshot,
    pub online: bool,
    pub dark_theme: bool,
}

/// User intents accepted by the actor.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Play { track_id: TrackId, forced: bool },
    Pause,
    Resume,
    TogglePlay,
    Seek(f64),
    Next,
    Previous,
    ToggleShuffle,
    CycleRepeat,
    ToggleDownload(TrackId),
    StartDownload(TrackId),
    RemoveDownload(TrackId),
    ToggleTheme,
}

enum Message {
    Intent(Intent),
    Transport(TransportEvent),
    Connectivity(bool),
    Tick(DownloadTick),
    TransportFailed(TransportFailure),
}

enum Command {
    Message(Message, Option<oneshot::Sender<()>>),
    Shutdown(oneshot::Sender<()>),
}

enum PersistRequest {
    Theme(bool),
    LastTrack(Option<Track>),
    CacheMembership(Vec<TrackId>),
}

// ============================================================================
// Service bootstrap
// ============================================================================

pub struct PlayerService;

impl PlayerService {
    /// Start the player with the default download simulation.
    pub async fn start(config: CoreConfig, catalog: Catalog) -> Result<PlayerHandle> {
        Self::start_with(config, catalog, DownloadConfig::default()).await
    }

    /// Restore the persisted snapshot, spawn the actor and its helper tasks,
    /// and return a handle to it.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip_all, fields(tracks = catalog.len()))]
    pub async fn start_with(
        config: CoreConfig,
        catalog: Catalog,
        download_config: DownloadConfig,
    ) -> Result<PlayerHandle> {
        config.validate()?;

        let catalog = Arc::new(catalog);
        let event_bus = EventBus::new(config.event_buffer_size);
        let store = SnapshotStore::new(config.settings_store.clone());
        let persisted = store.load().await;

        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let mut cache = CacheManager::new(download_config, catalog.clone(), tick_tx)?
            .with_event_bus(event_bus.clone());
        let restored = cache.restore(&persisted.cached_ids);

        let (transport_tx, transport_rx) = mpsc::unbounded_channel();
        let (failure_tx, failure_rx) = mpsc::unbounded_channel();
        let mut coordinator =
            PlaybackCoordinator::new(transport_tx).with_event_bus(event_bus.clone());
        if let Some(last) = &persisted.last_track {
            match catalog.get(&last.id) {
                Some(track) => coordinator.restore(track),
                None => debug!(track_id = %last.id, "Last track no longer in catalog"),
            }
        }

        // Subscribe before reading the current state so no transition is lost.
        let changes = match &config.network_monitor {
            Some(monitor) => match monitor.subscribe_changes().await {
                Ok(changes) => Some(changes),
                Err(e) => {
                    warn!(error = %e, "Connectivity changes unavailable");
                    None
                }
            },
            None => None,
        };
        let online = initial_connectivity(&config).await;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        let writer = spawn(run_persistence_writer(store, persist_rx));
        // Exits once the coordinator is dropped and the queue is drained.
        spawn(run_transport(config.transport.clone(), transport_rx, failure_tx));

        let mut forwarders = vec![
            TaskGuard::new(spawn(forward(tick_rx, command_tx.downgrade(), Message::Tick))),
            TaskGuard::new(spawn(forward(
                failure_rx,
                command_tx.downgrade(),
                Message::TransportFailed,
            ))),
        ];
        if let Some(changes) = changes {
            forwarders.push(TaskGuard::new(spawn(forward_connectivity(
                changes,
                command_tx.downgrade(),
            ))));
        }

        let mut actor = PlayerActor {
            catalog: catalog.clone(),
            cache,
            coordinator,
            online,
            dark_theme: persisted.dark_theme,
            event_bus: event_bus.clone(),
            persistence: persist_tx,
            snapshots: None,
            writer: Some(writer),
            forwarders,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(actor.snapshot());
        actor.snapshots = Some(snapshot_tx);

        spawn(actor.run(command_rx));

        info!(
            restored_downloads = restored,
            online,
            dark_theme = persisted.dark_theme,
            "Player service started"
        );

        Ok(PlayerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            event_bus,
            catalog,
            recommendations: RecommendationService::new(
                config.recommendation_provider.clone(),
                config.recommendation_timeout,
            ),
        })
    }
}

async fn initial_connectivity(config: &CoreConfig) -> bool {
    let Some(monitor) = &config.network_monitor else {
        return config.initially_online;
    };
    match monitor.get_network_info().await {
        Ok(info) => info.is_online(),
        Err(e) => {
            warn!(error = %e, "Could not read network state, using configured default");
            config.initially_online
        }
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable front door to the player actor.
///
/// Intent methods resolve once the actor has applied the intent and published
/// the resulting snapshot.
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<PlayerSnapshot>,
    event_bus: EventBus,
    catalog: Arc<Catalog>,
    recommendations: RecommendationService,
}

impl PlayerHandle {
    pub async fn play(&self, track_id: &str) -> Result<()> {
        self.dispatch(Intent::Play {
            track_id: track_id.to_string(),
            forced: false,
        })
        .await
    }

    /// Play from the start even when `track_id` is already current.
    pub async fn play_forced(&self, track_id: &str) -> Result<()> {
        self.dispatch(Intent::Play {
            track_id: track_id.to_string(),
            forced: true,
        })
        .await
    }

    pub async fn pause(&self) -> Result<()> {
        self.dispatch(Intent::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.dispatch(Intent::Resume).await
    }

    pub async fn toggle_play(&self) -> Result<()> {
        self.dispatch(Intent::TogglePlay).await
    }

    pub async fn seek(&self, position_secs: f64) -> Result<()> {
        self.dispatch(Intent::Seek(position_secs)).await
    }

    pub async fn next(&self) -> Result<()> {
        self.dispatch(Intent::Next).await
    }

    pub async fn previous(&self) -> Result<()> {
        self.dispatch(Intent::Previous).await
    }

    pub async fn toggle_shuffle(&self) -> Result<()> {
        self.dispatch(Intent::ToggleShuffle).await
    }

    pub async fn cycle_repeat(&self) -> Result<()> {
        self.dispatch(Intent::CycleRepeat).await
    }

    pub async fn toggle_download(&self, track_id: &str) -> Result<()> {
        self.dispatch(Intent::ToggleDownload(track_id.to_string()))
            .await
    }

    pub async fn start_download(&self, track_id: &str) -> Result<()> {
        self.dispatch(Intent::StartDownload(track_id.to_string()))
            .await
    }

    pub async fn remove_download(&self, track_id: &str) -> Result<()> {
        self.dispatch(Intent::RemoveDownload(track_id.to_string()))
            .await
    }

    pub async fn toggle_theme(&self) -> Result<()> {
        self.dispatch(Intent::ToggleTheme).await
    }

    pub async fn dispatch(&self, intent: Intent) -> Result<()> {
        self.send(Message::Intent(intent)).await
    }

    /// Report a signal from the host audio element.
    pub async fn transport_event(&self, event: TransportEvent) -> Result<()> {
        self.send(Message::Transport(event)).await
    }

    /// Report connectivity when no [`NetworkMonitor`](bridge_traits::NetworkMonitor) drives it.
    pub async fn set_online(&self, online: bool) -> Result<()> {
        self.send(Message::Connectivity(online)).await
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is updated after every handled message.
    pub fn watch(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshots.clone()
    }

    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Playable tracks as of the latest snapshot, in catalog order.
    pub fn playable_tracks(&self) -> Vec<Track> {
        let snapshot = self.snapshots.borrow();
        playable_tracks(&self.catalog, &snapshot.cache, snapshot.online)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Ask the recommendation provider for suggestions. Never fails.
    pub async fn suggest(&self, prompt: &str) -> Vec<Suggestion> {
        let online = self.snapshots.borrow().online;
        self.recommendations.suggest(prompt, online).await
    }

    /// Stop the actor, cancel in-flight downloads and flush pending writes.
    pub async fn shutdown(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(Command::Shutdown(ack_tx))
            .map_err(|_| CoreError::ServiceStopped)?;
        ack_rx.await.map_err(|_| CoreError::ServiceStopped)
    }

    async fn send(&self, message: Message) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(Command::Message(message, Some(ack_tx)))
            .map_err(|_| CoreError::ServiceStopped)?;
        ack_rx.await.map_err(|_| CoreError::ServiceStopped)
    }
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("closed", &self.commands.is_closed())
            .field("recommendations", &self.recommendations)
            .finish()
    }
}

// ============================================================================
// Actor
// ============================================================================

struct PlayerActor {
    catalog: Arc<Catalog>,
    cache: CacheManager,
    coordinator: PlaybackCoordinator,
    online: bool,
    dark_theme: bool,
    event_bus: EventBus,
    persistence: mpsc::UnboundedSender<PersistRequest>,
    snapshots: Option<watch::Sender<PlayerSnapshot>>,
    writer: Option<JoinHandle<()>>,
    forwarders: Vec<TaskGuard>,
}

impl PlayerActor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            match command {
                Command::Message(message, ack) => {
                    self.handle(message);
                    if let Some(ack) = ack {
                        let _ = ack.send(());
                    }
                }
                Command::Shutdown(ack) => {
                    self.finish().await;
                    let _ = ack.send(());
                    return;
                }
            }
        }

        debug!("All handles dropped");
        self.finish().await;
    }

    fn handle(&mut self, message: Message) {
        let track_before = self.coordinator.current_track_id().map(str::to_string);
        let cached_before = self.cache.cached_ids();

        match message {
            Message::Intent(intent) => self.handle_intent(intent),
            Message::Transport(event) => {
                let ctx = PlaybackContext::new(&self.catalog, &self.cache, self.online);
                self.coordinator.handle_transport_event(&event, &ctx);
            }
            Message::Connectivity(online) => self.set_online(online),
            Message::Tick(tick) => {
                self.cache.apply_tick(&tick);
            }
            Message::TransportFailed(failure) => {
                self.coordinator.on_transport_failed(&failure);
            }
        }

        if self.coordinator.current_track_id() != track_before.as_deref() {
            let track = self
                .coordinator
                .current_track_id()
                .and_then(|id| self.catalog.get(id))
                .cloned();
            self.persist(PersistRequest::LastTrack(track));
        }

        let cached_after = self.cache.cached_ids();
        if cached_after != cached_before {
            self.persist(PersistRequest::CacheMembership(cached_after));
        }

        self.publish();
    }

    fn handle_intent(&mut self, intent: Intent) {
        debug!(?intent, "Handling intent");
        match intent {
            Intent::Play { track_id, forced } => {
                let ctx = PlaybackContext::new(&self.catalog, &self.cache, self.online);
                self.coordinator.play(&track_id, forced, &ctx);
            }
            Intent::Pause => {
                self.coordinator.pause();
            }
            Intent::Resume => {
                let ctx = PlaybackContext::new(&self.catalog, &self.cache, self.online);
                self.coordinator.resume(&ctx);
            }
            Intent::TogglePlay => {
                let ctx = PlaybackContext::new(&self.catalog, &self.cache, self.online);
                self.coordinator.toggle_play(&ctx);
            }
            Intent::Seek(position) => {
                self.coordinator.seek(position);
            }
            Intent::Next => self.advance(Direction::Next),
            Intent::Previous => self.advance(Direction::Previous),
            Intent::ToggleShuffle => {
                self.coordinator.toggle_shuffle();
            }
            Intent::CycleRepeat => {
                self.coordinator.cycle_repeat();
            }
            Intent::ToggleDownload(track_id) => {
                if self.cache.toggle(&track_id, self.online) == CacheToggle::Removed {
                    self.after_removal(&track_id);
                }
            }
            Intent::StartDownload(track_id) => {
                self.cache.start_download(&track_id);
            }
            Intent::RemoveDownload(track_id) => {
                if self.cache.remove(&track_id).is_some() {
                    self.after_removal(&track_id);
                }
            }
            Intent::ToggleTheme => {
                self.dark_theme = !self.dark_theme;
                self.persist(PersistRequest::Theme(self.dark_theme));
                self.emit(CoreEvent::Settings(SettingsEvent::ThemeChanged {
                    dark: self.dark_theme,
                }));
            }
        }
    }

    fn advance(&mut self, direction: Direction) {
        let ctx = PlaybackContext::new(&self.catalog, &self.cache, self.online);
        self.coordinator.advance(direction, &ctx);
    }

    fn after_removal(&mut self, track_id: &str) {
        let ctx = PlaybackContext::new(&self.catalog, &self.cache, self.online);
        self.coordinator.on_cache_removed(track_id, &ctx);
    }

    fn set_online(&mut self, online: bool) {
        if online == self.online {
            return;
        }
        self.online = online;
        info!(online, "Connectivity changed");
        self.emit(CoreEvent::Connectivity(ConnectivityEvent::from_online(online)));

        if !online {
            let ctx = PlaybackContext::new(&self.catalog, &self.cache, self.online);
            self.coordinator.on_connectivity_lost(&ctx);
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        let state = self.coordinator.state().clone();
        PlayerSnapshot {
            phase: state.phase(),
            current_track: state
                .current_track_id
                .as_deref()
                .and_then(|id| self.catalog.get(id))
                .cloned(),
            playback: state,
            cache: self.cache.snapshot(),
            online: self.online,
            dark_theme: self.dark_theme,
        }
    }

    fn publish(&self) {
        if let Some(tx) = &self.snapshots {
            tx.send_replace(self.snapshot());
        }
    }

    fn persist(&self, request: PersistRequest) {
        if self.persistence.send(request).is_err() {
            warn!("Persistence writer stopped; dropping write");
        }
    }

    fn emit(&self, event: CoreEvent) {
        let _ = self.event_bus.emit(event);
    }

    async fn finish(mut self) {
        let cancelled = self.cache.cancel_all();
        self.forwarders.clear();
        self.publish();
        let writer = self.writer.take();
        drop(self);

        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                warn!(error = %e, "Persistence writer panicked");
            }
        }
        info!(cancelled_downloads = cancelled, "Player service stopped");
    }
}

// ============================================================================
// Helper tasks
// ============================================================================

async fn run_persistence_writer(
    store: SnapshotStore,
    mut requests: mpsc::UnboundedReceiver<PersistRequest>,
) {
    while let Some(request) = requests.recv().await {
        let (record, result) = match request {
            PersistRequest::Theme(dark) => ("theme", store.save_theme(dark).await),
            PersistRequest::LastTrack(track) => {
                ("last_track", store.save_last_track(track.as_ref()).await)
            }
            PersistRequest::CacheMembership(ids) => {
                ("downloads", store.save_cache_membership(&ids).await)
            }
        };
        if let Err(e) = result {
            warn!(record, error = %e, "Failed to persist record");
        }
    }
}

/// Feed a helper channel into the mailbox until either side goes away.
async fn forward<T>(
    mut items: mpsc::UnboundedReceiver<T>,
    commands: mpsc::WeakUnboundedSender<Command>,
    wrap: fn(T) -> Message,
) where
    T: Send + 'static,
{
    while let Some(item) = items.recv().await {
        let Some(commands) = commands.upgrade() else {
            break;
        };
        if commands.send(Command::Message(wrap(item), None)).is_err() {
            break;
        }
    }
}

async fn forward_connectivity(
    mut changes: Box<dyn NetworkChangeStream>,
    commands: mpsc::WeakUnboundedSender<Command>,
) {
    while let Some(info) = changes.next().await {
        let Some(commands) = commands.upgrade() else {
            break;
        };
        let message = Message::Connectivity(info.is_online());
        if commands.send(Command::Message(message, None)).is_err() {
            break;
        }
    }
    debug!("Connectivity stream ended");
}
