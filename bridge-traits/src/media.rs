//! Media engine bridge trait and supporting transport types.
//!
//! The decode/render engine is owned by the host platform (ExoPlayer on
//! Android, AVPlayer on iOS, a symphonia/cpal pipeline on desktop). The core
//! drives it through the small command surface of [`MediaEngine`] and
//! receives its callbacks as [`EngineEvent`]s pushed into an
//! [`EngineEventSink`]. Hosts may emit events from any thread; the core
//! drains them on a single consumer task.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Source handed to the engine for the track that should play next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Previously cached file on local storage.
    LocalFile { path: PathBuf },
    /// Remote HTTP(S) stream fetched by the engine itself.
    RemoteStream { url: String },
}

impl MediaSource {
    /// Determine whether the source represents remote content.
    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::RemoteStream { .. })
    }

    /// URI form understood by most native players.
    pub fn uri(&self) -> String {
        match self {
            MediaSource::LocalFile { path } => format!("file://{}", path.display()),
            MediaSource::RemoteStream { url } => url.clone(),
        }
    }
}

/// Looping behaviour forwarded to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Play through the queue once.
    #[default]
    Off,
    /// Loop the current track.
    One,
    /// Loop the whole queue.
    All,
}

impl RepeatMode {
    /// Next mode in the `Off -> One -> All -> Off` cycle.
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::One,
            RepeatMode::One => RepeatMode::All,
            RepeatMode::All => RepeatMode::Off,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RepeatMode::Off => "off",
            RepeatMode::One => "one",
            RepeatMode::All => "all",
        };
        f.write_str(label)
    }
}

/// Playback state as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing loaded, or the engine was stopped.
    Idle,
    /// Source loaded, waiting for enough data.
    Buffering,
    /// Enough data buffered; playing or paused depending on `is_playing`.
    Ready,
    /// The loaded source played to its end.
    Ended,
}

/// Callback surface of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PlaybackStateChanged(EngineState),
    IsPlayingChanged(bool),
    /// The engine moved to a new media item (including a repeat loop).
    TrackTransition,
    Error { message: String },
}

/// Thread-safe handle the engine uses to deliver its callbacks.
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    sender: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineEventSink {
    /// Wrap an existing sender.
    pub fn new(sender: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { sender }
    }

    /// Create a sink together with the receiving half.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    /// Deliver an event. Returns `false` once the core has shut down.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    /// Whether the receiving side is gone.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Trait for platform-specific engines that decode and render audio.
///
/// Commands are fire-and-forget from the core's point of view: failures are
/// returned as errors, but state changes are only trusted once they arrive
/// as [`EngineEvent`]s.
#[async_trait::async_trait]
pub trait MediaEngine: Send + Sync {
    /// Replace the currently loaded media item.
    async fn load_source(&self, source: MediaSource) -> Result<()>;

    /// Start buffering the loaded source.
    async fn prepare(&self) -> Result<()>;

    /// Begin or resume playback.
    async fn play(&self) -> Result<()>;

    /// Pause playback without releasing the source.
    async fn pause(&self) -> Result<()>;

    /// Stop playback and release the source.
    async fn stop(&self) -> Result<()>;

    /// Seek to an absolute position within the loaded source.
    async fn seek_to(&self, position_ms: u64) -> Result<()>;

    /// Current playback position in milliseconds.
    async fn current_position(&self) -> Result<u64>;

    /// Duration of the loaded source, when known.
    async fn duration(&self) -> Result<Option<u64>>;

    /// Whether audio is currently being rendered.
    async fn is_playing(&self) -> Result<bool>;

    /// Configure looping.
    ///
    /// The core loads one source at a time and wraps the queue itself, so
    /// engines only need to honour [`RepeatMode::One`] by looping the loaded
    /// source. For `All` they should still report `Ended`.
    async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()>;

    /// Register where callbacks should be delivered. Replaces any previous sink.
    fn set_event_sink(&self, sink: EngineEventSink);
}
