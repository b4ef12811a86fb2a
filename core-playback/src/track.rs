//! Queue value types: tracks, transport state and command outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// Playable track as handed over by the catalog.
///
/// Equality and hashing use `id` only: the same catalog entry fetched twice
/// with a re-signed URL is still the same track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    /// Remote media URL. Absent or empty means the track cannot be played.
    #[serde(default)]
    pub media_url: Option<String>,
    /// Local file the host already knows about, if any.
    #[serde(default)]
    pub local_hint: Option<PathBuf>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            media_url: None,
            local_hint: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_local_hint(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_hint = Some(path.into());
        self
    }

    /// Non-empty media URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.media_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn is_playable(&self) -> bool {
        self.url().is_some()
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Transport state owned by the queue controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// A source was handed to the engine and is buffering.
    Preparing,
    Playing,
    Paused,
    /// The current track played to its end.
    Ended,
    /// The engine reported a failure for the current track.
    Error,
}

impl TransportState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportState::Idle => "idle",
            TransportState::Preparing => "preparing",
            TransportState::Playing => "playing",
            TransportState::Paused => "paused",
            TransportState::Ended => "ended",
            TransportState::Error => "error",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a controller command ended up doing.
///
/// Commands never fail across the controller API; callers that care can
/// inspect this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command changed state.
    Executed,
    /// Dropped because another transport command was in flight.
    Busy,
    /// Nothing to do (empty input, out of range, already at the end).
    Unchanged,
}

impl CommandOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, CommandOutcome::Executed)
    }
}
