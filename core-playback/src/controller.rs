//! # Playback Queue Controller
//!
//! Owns the play queue and the transport state, and decides what the media
//! engine plays next.
//!
//! ## Concurrency
//!
//! - The queue and its cursor sit behind one `parking_lot::Mutex`, never held
//!   across an `.await`.
//! - `skip_to_next`, `skip_to_previous` and `toggle_play_pause` share a
//!   try-lock guard. A call that finds it taken is dropped and reports
//!   [`CommandOutcome::Busy`].
//! - Load/prepare/play sequences are serialized by a second async mutex.
//!   The current entry is read only after that lock is held, so the last
//!   cursor move wins.
//! - Engine callbacks are drained by a single dispatcher task.
//!
//! ## Source selection
//!
//! A cached track is loaded from disk. Anything else streams from its URL
//! while the cache fills in the background.

use crate::cache::AudioCacheStore;
use crate::config::ControllerConfig;
use crate::error::{PlaybackError, Result};
use crate::publisher::{spawn_position_sampler, PlayerObservers, Publisher};
use crate::queue::PlayQueue;
use crate::track::{CommandOutcome, Track, TransportState};
use bridge_traits::{EngineEvent, EngineEventSink, EngineState, MediaEngine, MediaSource, RepeatMode};
use core_runtime::events::{EventBus, EventStream};
use core_runtime::logging::redact_url;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy)]
struct Modes {
    shuffle: bool,
    repeat: RepeatMode,
}

#[derive(Debug, Clone, Copy, Default)]
struct Transport {
    state: TransportState,
    /// Last `IsPlayingChanged` value from the engine.
    engine_playing: bool,
    /// `play()` was issued and the engine has not confirmed it yet.
    play_requested: bool,
}

struct ControllerInner {
    engine: Arc<dyn MediaEngine>,
    cache: AudioCacheStore,
    config: ControllerConfig,
    queue: Mutex<PlayQueue>,
    modes: Mutex<Modes>,
    transport: Mutex<Transport>,
    transport_guard: AsyncMutex<()>,
    engine_lock: AsyncMutex<()>,
    publisher: Arc<Publisher>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Queue and transport state machine.
///
/// Must be created inside a Tokio runtime: construction spawns the engine
/// event dispatcher and the position sampler. Both stop on
/// [`shutdown`](Self::shutdown) or when the controller is dropped.
pub struct PlaybackQueueController {
    inner: Arc<ControllerInner>,
}

impl std::fmt::Debug for PlaybackQueueController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackQueueController")
            .field("queue_len", &self.inner.queue.lock().len())
            .field("transport", &*self.inner.transport.lock())
            .field("modes", &*self.inner.modes.lock())
            .finish()
    }
}

impl PlaybackQueueController {
    /// Wire the controller to an engine and a cache.
    ///
    /// Registers the engine event sink, forwards the initial repeat mode and
    /// starts the background tasks.
    pub async fn new(
        engine: Arc<dyn MediaEngine>,
        cache: AudioCacheStore,
        config: ControllerConfig,
        event_bus: EventBus,
    ) -> Result<Self> {
        config.validate().map_err(PlaybackError::Config)?;

        let publisher = Arc::new(Publisher::new(event_bus, config.initial_repeat_mode));
        let (sink, events) = EngineEventSink::channel();
        engine.set_event_sink(sink);

        if let Err(e) = engine.set_repeat_mode(config.initial_repeat_mode).await {
            warn!("Engine rejected initial repeat mode: {}", e);
        }

        let shutdown = CancellationToken::new();
        let inner = Arc::new(ControllerInner {
            engine: Arc::clone(&engine),
            cache,
            modes: Mutex::new(Modes {
                shuffle: false,
                repeat: config.initial_repeat_mode,
            }),
            config,
            queue: Mutex::new(PlayQueue::new()),
            transport: Mutex::new(Transport::default()),
            transport_guard: AsyncMutex::new(()),
            engine_lock: AsyncMutex::new(()),
            publisher: Arc::clone(&publisher),
            shutdown: shutdown.clone(),
            tasks: Mutex::new(Vec::new()),
        });

        let dispatcher = tokio::spawn(run_dispatcher(
            Arc::downgrade(&inner),
            events,
            shutdown.clone(),
        ));
        let sampler = spawn_position_sampler(
            engine,
            publisher,
            inner.config.position_interval(),
            shutdown,
        );
        inner.tasks.lock().extend([dispatcher, sampler]);

        info!(
            repeat = %inner.config.initial_repeat_mode,
            stream_while_caching = inner.config.stream_while_caching,
            "Playback controller ready"
        );

        Ok(Self { inner })
    }

    // ========================================================================
    // Queue replacement
    // ========================================================================

    /// Replace the queue with a single track and start it.
    ///
    /// A track without a media URL is refused and nothing changes.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn play_single(&self, track: Track) -> CommandOutcome {
        if !track.is_playable() {
            warn!("Refusing to play a track without a media URL");
            return CommandOutcome::Unchanged;
        }
        if self.inner.is_shut_down() {
            return CommandOutcome::Unchanged;
        }

        self.inner.queue.lock().replace(vec![track], 0);
        self.inner.publish_queue();
        self.inner.start_current().await
    }

    /// Replace the queue and start at `start_index`.
    ///
    /// An empty list leaves the queue untouched. An out-of-range index
    /// starts at the first entry.
    #[instrument(skip(self, tracks), fields(count = tracks.len()))]
    pub async fn play_queue(&self, tracks: Vec<Track>, start_index: usize) -> CommandOutcome {
        if self.inner.is_shut_down() {
            return CommandOutcome::Unchanged;
        }
        if !self.inner.queue.lock().replace(tracks, start_index) {
            debug!("Ignoring empty queue");
            return CommandOutcome::Unchanged;
        }

        self.inner.publish_queue();
        self.inner.start_current().await
    }

    // ========================================================================
    // Queue editing
    // ========================================================================

    /// Append a track. Starts it when the queue was empty.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn add_to_queue(&self, track: Track) -> CommandOutcome {
        if self.inner.is_shut_down() {
            return CommandOutcome::Unchanged;
        }
        let started = self.inner.queue.lock().append(track);
        self.inner.publish_queue();

        if started {
            self.inner.start_current().await
        } else {
            CommandOutcome::Executed
        }
    }

    /// Insert a track right after the current one. Starts it when the queue
    /// was empty.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn queue_next(&self, track: Track) -> CommandOutcome {
        if self.inner.is_shut_down() {
            return CommandOutcome::Unchanged;
        }
        let started = self.inner.queue.lock().insert_next(track);
        self.inner.publish_queue();

        if started {
            self.inner.start_current().await
        } else {
            CommandOutcome::Executed
        }
    }

    /// Remove the entry at `index`.
    ///
    /// Removing the current entry starts whatever takes its place, or stops
    /// the engine when the queue becomes empty.
    #[instrument(skip(self))]
    pub async fn remove_at(&self, index: usize) -> CommandOutcome {
        let (removal, now_empty) = {
            let mut queue = self.inner.queue.lock();
            let removal = queue.remove_at(index);
            (removal, queue.is_empty())
        };

        let Some(removal) = removal else {
            debug!("Index out of range");
            return CommandOutcome::Unchanged;
        };
        self.inner.publish_queue();

        if !removal.was_current {
            return CommandOutcome::Executed;
        }

        if now_empty {
            self.inner.stop_engine().await;
            self.inner.publisher.publish_track(None);
            CommandOutcome::Executed
        } else {
            self.inner.start_current().await
        }
    }

    /// Empty the queue and stop the engine.
    #[instrument(skip(self))]
    pub async fn clear_queue(&self) -> CommandOutcome {
        self.inner.queue.lock().clear();
        self.inner.stop_engine().await;
        self.inner.publisher.publish_track(None);
        self.inner.publish_queue();
        info!("Queue cleared");
        CommandOutcome::Executed
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Advance to the next entry, if any.
    #[instrument(skip(self))]
    pub async fn skip_to_next(&self) -> CommandOutcome {
        let Ok(_guard) = self.inner.transport_guard.try_lock() else {
            debug!("Transport command in flight, dropping skip");
            return CommandOutcome::Busy;
        };

        let Some(index) = self.inner.queue.lock().advance() else {
            debug!("Already at the last entry");
            return CommandOutcome::Unchanged;
        };

        debug!(index, "Skipping forward");
        self.inner.publish_queue();
        self.inner.start_current().await
    }

    /// Go back to the previous entry, if any.
    #[instrument(skip(self))]
    pub async fn skip_to_previous(&self) -> CommandOutcome {
        let Ok(_guard) = self.inner.transport_guard.try_lock() else {
            debug!("Transport command in flight, dropping skip");
            return CommandOutcome::Busy;
        };

        let Some(index) = self.inner.queue.lock().retreat() else {
            debug!("Already at the first entry");
            return CommandOutcome::Unchanged;
        };

        debug!(index, "Skipping back");
        self.inner.publish_queue();
        self.inner.start_current().await
    }

    /// Jump to an entry already in the queue.
    #[instrument(skip(self))]
    pub async fn skip_to_index(&self, index: usize) -> CommandOutcome {
        if !self.inner.queue.lock().jump_to(index) {
            debug!("Index out of range");
            return CommandOutcome::Unchanged;
        }

        self.inner.publish_queue();
        self.inner.start_current().await
    }

    /// Pause when playing, otherwise play.
    ///
    /// From `Idle`, `Ended` or `Error` the current entry is loaded again.
    #[instrument(skip(self))]
    pub async fn toggle_play_pause(&self) -> CommandOutcome {
        let Ok(_guard) = self.inner.transport_guard.try_lock() else {
            debug!("Transport command in flight, dropping toggle");
            return CommandOutcome::Busy;
        };

        match self.inner.transport_state() {
            TransportState::Playing => match self.inner.engine.pause().await {
                Ok(()) => {
                    self.inner.transport.lock().play_requested = false;
                    CommandOutcome::Executed
                }
                Err(e) => {
                    warn!("Pause failed: {}", e);
                    CommandOutcome::Unchanged
                }
            },
            TransportState::Idle | TransportState::Ended | TransportState::Error => {
                if self.inner.queue.lock().is_empty() {
                    return CommandOutcome::Unchanged;
                }
                self.inner.start_current().await
            }
            TransportState::Preparing | TransportState::Paused => {
                self.inner.transport.lock().play_requested = true;
                match self.inner.engine.play().await {
                    Ok(()) => CommandOutcome::Executed,
                    Err(e) => {
                        self.inner.transport.lock().play_requested = false;
                        warn!("Play failed: {}", e);
                        CommandOutcome::Unchanged
                    }
                }
            }
        }
    }

    /// Seek within the loaded source.
    ///
    /// Always forwarded to the engine. The position signal is refreshed only
    /// when the queue has a current entry.
    #[instrument(skip(self))]
    pub async fn seek_to(&self, position_ms: u64) -> CommandOutcome {
        match self.inner.engine.seek_to(position_ms).await {
            Ok(()) => {
                let track_id = self.inner.queue.lock().current().map(|t| t.id.clone());
                if let Some(track_id) = track_id {
                    let duration = self.inner.engine.duration().await.unwrap_or(None);
                    self.inner
                        .publisher
                        .publish_position(&track_id, position_ms, duration);
                }
                CommandOutcome::Executed
            }
            Err(e) => {
                warn!("Seek failed: {}", e);
                CommandOutcome::Unchanged
            }
        }
    }

    // ========================================================================
    // Modes
    // ========================================================================

    /// Flip shuffle. Turning it on moves the current track to the front and
    /// permutes the rest; turning it off keeps the current order.
    ///
    /// Playback is not interrupted. Returns the new flag.
    pub fn toggle_shuffle(&self) -> bool {
        let enabled = {
            let mut modes = self.inner.modes.lock();
            modes.shuffle = !modes.shuffle;
            modes.shuffle
        };

        if enabled {
            self.inner.queue.lock().shuffle();
        }

        debug!(enabled, "Shuffle toggled");
        self.inner.publisher.publish_shuffle(enabled);
        self.inner.publish_queue();
        enabled
    }

    /// Cycle `Off -> One -> All -> Off`. Returns the new mode.
    #[instrument(skip(self))]
    pub async fn toggle_repeat_mode(&self) -> RepeatMode {
        let mode = {
            let mut modes = self.inner.modes.lock();
            modes.repeat = modes.repeat.next();
            modes.repeat
        };

        if let Err(e) = self.inner.engine.set_repeat_mode(mode).await {
            warn!(%mode, "Engine rejected repeat mode: {}", e);
        }

        debug!(%mode, "Repeat mode changed");
        self.inner.publisher.publish_repeat(mode);
        mode
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn queue(&self) -> Vec<Track> {
        self.inner.queue.lock().tracks().to_vec()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.inner.queue.lock().current().cloned()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.inner.queue.lock().cursor()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.transport_state().is_playing()
    }

    pub fn transport_state(&self) -> TransportState {
        self.inner.transport_state()
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.inner.modes.lock().shuffle
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.inner.modes.lock().repeat
    }

    /// Engine position, or 0 when it cannot be read.
    pub async fn position_ms(&self) -> u64 {
        self.inner.engine.current_position().await.unwrap_or(0)
    }

    /// Duration of the loaded source, when known.
    pub async fn duration_ms(&self) -> Option<u64> {
        self.inner.engine.duration().await.unwrap_or(None)
    }

    pub fn observers(&self) -> PlayerObservers {
        self.inner.publisher.observers()
    }

    pub fn events(&self) -> EventStream {
        self.inner.publisher.events()
    }

    pub fn event_bus(&self) -> &EventBus {
        self.inner.publisher.event_bus()
    }

    pub fn cache(&self) -> &AudioCacheStore {
        &self.inner.cache
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Re-read the engine's playing flag and republish it.
    pub async fn refresh_play_state(&self) -> bool {
        match self.inner.engine.is_playing().await {
            Ok(playing) => {
                self.inner.on_is_playing(playing);
                playing
            }
            Err(e) => {
                warn!("Failed to read engine state: {}", e);
                self.is_playing()
            }
        }
    }

    /// Stop background tasks and the engine.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();

        let tasks: Vec<JoinHandle<()>> = self.inner.tasks.lock().drain(..).collect();
        for task in tasks {
            task.abort();
            // Cancelled join errors are expected here.
            let _ = task.await;
        }

        self.inner.stop_engine().await;
        info!("Playback controller stopped");
    }
}

async fn run_dispatcher(
    controller: Weak<ControllerInner>,
    mut events: mpsc::UnboundedReceiver<EngineEvent>,
    shutdown: CancellationToken,
) {
    debug!("Engine event dispatcher started");

    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        let Some(inner) = controller.upgrade() else {
            break;
        };
        inner.handle_engine_event(event).await;
    }

    debug!("Engine event dispatcher stopped");
}

impl ControllerInner {
    fn transport_state(&self) -> TransportState {
        self.transport.lock().state
    }

    fn is_shut_down(&self) -> bool {
        if self.shutdown.is_cancelled() {
            debug!("Controller is shut down, ignoring command");
            return true;
        }
        false
    }

    fn set_state(&self, state: TransportState) {
        let changed = {
            let mut transport = self.transport.lock();
            let changed = transport.state != state;
            transport.state = state;
            changed
        };

        if changed {
            debug!(%state, "Transport state changed");
            self.publisher.publish_state(state);
        }
    }

    fn publish_queue(&self) {
        let (len, cursor) = {
            let queue = self.queue.lock();
            (queue.len(), queue.cursor())
        };
        self.publisher.publish_queue(len, cursor);
    }

    // ------------------------------------------------------------------------
    // Starting tracks
    // ------------------------------------------------------------------------

    /// Load and play whatever the cursor points at.
    ///
    /// Entries without a media URL are skipped. When nothing playable is
    /// left the transport goes to `Error`.
    async fn start_current(self: &Arc<Self>) -> CommandOutcome {
        let _engine = self.engine_lock.lock().await;

        if self.shutdown.is_cancelled() {
            return CommandOutcome::Unchanged;
        }

        let (selection, skipped) = {
            let mut queue = self.queue.lock();
            let mut skipped = 0usize;
            let selection = loop {
                let Some((index, track)) = queue.current_entry() else {
                    break None;
                };
                if let Some(url) = track.url().map(str::to_string) {
                    break Some(Ok((index, track, url)));
                }

                warn!(track_id = %track.id, "Track has no media URL, skipping");
                if queue.advance().is_none() {
                    break Some(Err(track));
                }
                skipped += 1;
            };
            (selection, skipped)
        };

        if skipped > 0 {
            self.publish_queue();
        }

        let (index, track, url) = match selection {
            None => return CommandOutcome::Unchanged,
            Some(Err(track)) => {
                let err = PlaybackError::MissingUrl(track.id.clone());
                error!("No playable track left in the queue");
                self.publisher.publish_track(self.queue.lock().current_entry());
                self.set_state(TransportState::Error);
                self.publisher
                    .publish_error(Some(track.id), err.to_string(), false);
                return CommandOutcome::Unchanged;
            }
            Some(Ok(selected)) => selected,
        };

        self.publisher.publish_track(Some((index, track.clone())));
        {
            let mut transport = self.transport.lock();
            transport.engine_playing = false;
            transport.play_requested = true;
        }
        self.set_state(TransportState::Preparing);

        let (source, fill) = self.select_source(&track, &url).await;
        info!(
            track_id = %track.id,
            index,
            remote = source.is_remote(),
            "Starting track"
        );

        if let Err(e) = self.load_and_play(source).await {
            self.on_engine_error(e.to_string());
            return CommandOutcome::Executed;
        }

        if fill {
            self.spawn_cache_fill(&url);
        }

        CommandOutcome::Executed
    }

    /// Pick the engine source for `track`. The flag says whether a
    /// background cache fill should follow.
    async fn select_source(&self, track: &Track, url: &str) -> (MediaSource, bool) {
        if let Some(path) = self.cache.playback_path(url) {
            debug!("Serving from cache");
            return (MediaSource::LocalFile { path }, false);
        }

        if let Some(path) = track.local_hint.as_ref().filter(|path| path.is_file()) {
            debug!("Serving from host-provided file");
            return (MediaSource::LocalFile { path: path.clone() }, false);
        }

        if !self.config.stream_while_caching {
            match self.cache.cache(url).await {
                Ok(path) => return (MediaSource::LocalFile { path }, false),
                Err(e) => warn!(url = %redact_url(url), "Cache fill failed, streaming instead: {}", e),
            }
            return (
                MediaSource::RemoteStream {
                    url: url.to_string(),
                },
                false,
            );
        }

        (
            MediaSource::RemoteStream {
                url: url.to_string(),
            },
            true,
        )
    }

    async fn load_and_play(&self, source: MediaSource) -> Result<()> {
        self.engine.load_source(source).await?;
        self.engine.prepare().await?;
        self.engine.play().await?;
        Ok(())
    }

    fn spawn_cache_fill(&self, url: &str) {
        let pending = self.cache.cache_async(url);
        if pending.is_ready() {
            return;
        }

        let url = redact_url(url);
        tokio::spawn(async move {
            match pending.wait().await {
                Ok(_) => debug!(%url, "Background cache fill finished"),
                Err(e) => warn!(%url, "Background cache fill failed: {}", e),
            }
        });
    }

    async fn stop_engine(&self) {
        let _engine = self.engine_lock.lock().await;
        if let Err(e) = self.engine.stop().await {
            warn!("Engine stop failed: {}", e);
        }
        {
            let mut transport = self.transport.lock();
            transport.engine_playing = false;
            transport.play_requested = false;
        }
        self.set_state(TransportState::Idle);
    }

    // ------------------------------------------------------------------------
    // Engine callbacks
    // ------------------------------------------------------------------------

    async fn handle_engine_event(self: &Arc<Self>, event: EngineEvent) {
        match event {
            EngineEvent::PlaybackStateChanged(state) => self.on_engine_state(state).await,
            EngineEvent::IsPlayingChanged(playing) => self.on_is_playing(playing),
            EngineEvent::TrackTransition => {
                debug!("Engine moved to a new media item");
                self.publisher.publish_track(self.queue.lock().current_entry());
            }
            EngineEvent::Error { message } => self.on_engine_error(message),
        }
    }

    async fn on_engine_state(self: &Arc<Self>, state: EngineState) {
        let current = self.transport_state();

        match state {
            EngineState::Buffering => {
                if current != TransportState::Error {
                    self.set_state(TransportState::Preparing);
                }
            }
            EngineState::Ready => {
                let next = {
                    let transport = self.transport.lock();
                    if transport.engine_playing {
                        Some(TransportState::Playing)
                    } else if transport.play_requested {
                        // Engines may report Ready before IsPlayingChanged(true).
                        None
                    } else {
                        Some(TransportState::Paused)
                    }
                };
                if let Some(state) = next {
                    self.set_state(state);
                }
            }
            EngineState::Idle => {
                if current != TransportState::Error {
                    self.set_state(TransportState::Idle);
                }
            }
            EngineState::Ended => {
                self.set_state(TransportState::Ended);
                self.on_track_ended().await;
            }
        }
    }

    fn on_is_playing(&self, playing: bool) {
        let next = {
            let mut transport = self.transport.lock();
            transport.engine_playing = playing;
            if playing {
                transport.play_requested = false;
                Some(TransportState::Playing)
            } else if transport.state == TransportState::Playing {
                Some(TransportState::Paused)
            } else {
                None
            }
        };

        if let Some(state) = next {
            self.set_state(state);
        }
    }

    /// `One` replays, otherwise advance; `All` wraps at the end.
    async fn on_track_ended(self: &Arc<Self>) {
        let repeat = self.modes.lock().repeat;

        let target = {
            let mut queue = self.queue.lock();
            if queue.is_empty() {
                None
            } else if repeat == RepeatMode::One {
                queue.cursor()
            } else if let Some(index) = queue.advance() {
                Some(index)
            } else if repeat == RepeatMode::All && queue.rewind() {
                Some(0)
            } else {
                None
            }
        };

        match target {
            Some(index) => {
                debug!(index, %repeat, "Track ended, continuing");
                self.publish_queue();
                self.start_current().await;
            }
            None => {
                info!("Reached the end of the queue");
                self.set_state(TransportState::Idle);
            }
        }
    }

    fn on_engine_error(self: &Arc<Self>, message: String) {
        let (track_id, recoverable) = {
            let queue = self.queue.lock();
            (queue.current().map(|t| t.id.clone()), queue.has_next())
        };

        error!(track_id = ?track_id, recoverable, "Playback error: {}", message);
        self.transport.lock().play_requested = false;
        self.set_state(TransportState::Error);
        self.publisher
            .publish_error(track_id.clone(), message, recoverable);

        if recoverable {
            self.schedule_recovery(track_id);
        }
    }

    fn schedule_recovery(self: &Arc<Self>, failed_track: Option<String>) {
        let controller = Arc::downgrade(self);
        let delay = self.config.error_recovery_delay();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            if let Some(inner) = controller.upgrade() {
                inner.recover_from_error(failed_track).await;
            }
        });
    }

    /// Advance past the failed track unless something already moved on.
    async fn recover_from_error(self: &Arc<Self>, failed_track: Option<String>) {
        if self.transport_state() != TransportState::Error {
            debug!("Recovered before the retry fired");
            return;
        }

        let advanced = {
            let mut queue = self.queue.lock();
            let current = queue.current().map(|t| t.id.clone());
            if current == failed_track {
                queue.advance()
            } else {
                None
            }
        };

        match advanced {
            Some(index) => {
                info!(index, "Advancing after playback error");
                self.publish_queue();
                self.start_current().await;
            }
            None => debug!("Nothing to advance to after error"),
        }
    }
}
