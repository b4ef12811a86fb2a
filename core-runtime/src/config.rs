//! # Core Configuration Module
//!
//! Provides configuration management for the playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds every host capability and setting the playback core
//! needs. It enforces fail-fast validation so a missing bridge is reported
//! at startup rather than on the first play request.
//!
//! ## Required Dependencies
//!
//! - `MediaEngine` - Decode/render engine owned by the host
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `TrackResolver` - Byte-stream fetcher used by the audio cache
//!   (desktop default: reqwest)
//!
//! When the `desktop-shims` feature is enabled, a `ReqwestTrackResolver` is
//! injected automatically if no resolver is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .cache_dir("/data/user/0/app/cache/audio_cache")
//!     .cache_size_mb(100)
//!     .media_engine(Arc::new(MyEngine::new()))
//!     .track_resolver(Arc::new(MyResolver::new()))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{MediaEngine, RepeatMode, TrackResolver};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default audio cache budget in megabytes.
pub const DEFAULT_CACHE_SIZE_MB: usize = 100;

/// Upper bound accepted for the audio cache budget (20 GB).
pub const MAX_CACHE_SIZE_MB: usize = 20_000;

/// Core configuration for the playback core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Directory holding cached audio files
    pub cache_dir: PathBuf,

    /// Maximum cache size in megabytes
    pub cache_size_mb: usize,

    /// Host media engine (required)
    pub media_engine: Arc<dyn MediaEngine>,

    /// Byte-stream fetcher for cache fills
    pub track_resolver: Arc<dyn TrackResolver>,

    /// Timing knobs for the queue controller
    pub playback: PlaybackTuning,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("cache_dir", &self.cache_dir)
            .field("cache_size_mb", &self.cache_size_mb)
            .field("media_engine", &"MediaEngine { ... }")
            .field("track_resolver", &"TrackResolver { ... }")
            .field("playback", &self.playback)
            .finish()
    }
}

/// Controller timing and behaviour configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTuning {
    /// How often the engine position is sampled while playing
    pub position_interval: Duration,

    /// Delay before advancing past a track the engine failed on
    pub error_recovery_delay: Duration,

    /// Event bus buffer per subscriber
    pub event_buffer_size: usize,

    /// Repeat mode applied at startup
    pub initial_repeat_mode: RepeatMode,

    /// Stream uncached tracks while the cache fills; otherwise download first
    pub stream_while_caching: bool,
}

impl Default for PlaybackTuning {
    fn default() -> Self {
        Self {
            position_interval: Duration::from_millis(500),
            error_recovery_delay: Duration::from_millis(1000),
            event_buffer_size: crate::events::DEFAULT_EVENT_BUFFER_SIZE,
            initial_repeat_mode: RepeatMode::Off,
            stream_while_caching: true,
        }
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Cache budget in bytes.
    pub fn cache_size_bytes(&self) -> u64 {
        self.cache_size_mb as u64 * 1024 * 1024
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Cache directory is not empty
    /// - Cache size is within `1..=MAX_CACHE_SIZE_MB`
    /// - Position interval and event buffer are non-zero
    pub fn validate(&self) -> Result<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(Error::Config("Cache directory cannot be empty".to_string()));
        }

        if self.cache_size_mb == 0 {
            return Err(Error::Config(
                "Cache size must be greater than 0 MB".to_string(),
            ));
        }

        if self.cache_size_mb > MAX_CACHE_SIZE_MB {
            return Err(Error::Config(format!(
                "Cache size exceeds maximum of {} MB",
                MAX_CACHE_SIZE_MB
            )));
        }

        if self.playback.position_interval.is_zero() {
            return Err(Error::Config(
                "Position interval must be greater than zero".to_string(),
            ));
        }

        if self.playback.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn media_engine_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaEngine".to_string(),
        message: "MediaEngine implementation is required for playback. \
                 Android: wrap ExoPlayer. iOS: wrap AVPlayer. \
                 Desktop: inject a symphonia/cpal based engine."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_track_resolver() -> Result<Arc<dyn TrackResolver>> {
    use bridge_desktop::ReqwestTrackResolver;

    let resolver = ReqwestTrackResolver::new().map_err(|e| Error::CapabilityMissing {
        capability: "TrackResolver".to_string(),
        message: format!("Default desktop resolver unavailable: {}", e),
    })?;
    Ok(Arc::new(resolver))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_track_resolver() -> Result<Arc<dyn TrackResolver>> {
    Err(Error::CapabilityMissing {
        capability: "TrackResolver".to_string(),
        message: "TrackResolver implementation is required to fill the audio cache. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestTrackResolver. \
                 Mobile: inject an OkHttp/URLSession backed resolver."
            .to_string(),
    })
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    cache_dir: Option<PathBuf>,
    cache_size_mb: Option<usize>,
    media_engine: Option<Arc<dyn MediaEngine>>,
    track_resolver: Option<Arc<dyn TrackResolver>>,
    playback: PlaybackTuning,
}

impl CoreConfigBuilder {
    /// Sets the audio cache directory (required).
    pub fn cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    /// Sets the maximum cache size in megabytes (default: 100 MB).
    pub fn cache_size_mb(mut self, size_mb: usize) -> Self {
        self.cache_size_mb = Some(size_mb);
        self
    }

    /// Sets the media engine implementation (required).
    pub fn media_engine(mut self, engine: Arc<dyn MediaEngine>) -> Self {
        self.media_engine = Some(engine);
        self
    }

    /// Sets the track resolver implementation.
    pub fn track_resolver(mut self, resolver: Arc<dyn TrackResolver>) -> Self {
        self.track_resolver = Some(resolver);
        self
    }

    pub fn position_interval(mut self, interval: Duration) -> Self {
        self.playback.position_interval = interval;
        self
    }

    pub fn error_recovery_delay(mut self, delay: Duration) -> Self {
        self.playback.error_recovery_delay = delay;
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.playback.event_buffer_size = size;
        self
    }

    pub fn initial_repeat_mode(mut self, mode: RepeatMode) -> Self {
        self.playback.initial_repeat_mode = mode;
        self
    }

    pub fn stream_while_caching(mut self, enabled: bool) -> Self {
        self.playback.stream_while_caching = enabled;
        self
    }

    /// Replaces all playback knobs at once.
    pub fn playback(mut self, tuning: PlaybackTuning) -> Self {
        self.playback = tuning;
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Returns an error if the cache directory or media engine is missing,
    /// if no resolver is available, or if a value is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let cache_dir = self.cache_dir.ok_or_else(|| {
            Error::Config("Cache directory is required. Use .cache_dir() to set it.".to_string())
        })?;

        let media_engine = self.media_engine.ok_or_else(media_engine_missing_error)?;

        let track_resolver = match self.track_resolver {
            Some(resolver) => resolver,
            None => provide_default_track_resolver()?,
        };

        let config = CoreConfig {
            cache_dir,
            cache_size_mb: self.cache_size_mb.unwrap_or(DEFAULT_CACHE_SIZE_MB),
            media_engine,
            track_resolver,
            playback: self.playback,
        };

        config.validate()?;

        Ok(config)
    }
}
