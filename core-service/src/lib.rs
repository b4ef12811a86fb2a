//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media engine,
//! track resolver) into the shared Rust core and owns the resulting audio
//! cache, queue controller and event bus for the lifetime of the process.
//! Desktop apps typically enable the `desktop-shims` feature, which supplies
//! a `reqwest` based resolver when the host does not inject one.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::PlaybackManager;
//!
//! let config = CoreConfig::builder()
//!     .cache_dir(cache_dir)
//!     .media_engine(engine)
//!     .build()?;
//! let player = PlaybackManager::new(config).await?;
//!
//! player.controller().play_queue(tracks, 0).await;
//! ```

pub mod error;

pub use error::{CoreError, Result};

pub use bridge_traits::{
    EngineEvent, EngineEventSink, EngineState, MediaEngine, MediaSource, RepeatMode,
    TrackResolver,
};
pub use core_playback::{CommandOutcome, Track, TransportState};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{ReqwestTrackResolver, RetryPolicy};

use core_playback::cache::{AudioCacheStore, CacheConfig, CacheStats};
use core_playback::{ControllerConfig, PlaybackQueueController, PlayerObservers};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use std::sync::Arc;
use tracing::{info, instrument};

/// Primary façade exposed to host applications.
///
/// Cloning is cheap and every clone drives the same player.
#[derive(Clone)]
pub struct PlaybackManager {
    controller: Arc<PlaybackQueueController>,
    cache: AudioCacheStore,
    event_bus: EventBus,
}

impl PlaybackManager {
    /// Open the cache and start the controller described by `config`.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(config), fields(cache_dir = %config.cache_dir.display()))]
    pub async fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.playback.event_buffer_size);

        let cache_config =
            CacheConfig::new(&config.cache_dir).with_max_size(config.cache_size_bytes());
        let cache = AudioCacheStore::open(
            cache_config,
            Arc::clone(&config.track_resolver),
            Some(event_bus.clone()),
        )
        .await?;

        let controller_config = ControllerConfig::default()
            .with_position_interval(config.playback.position_interval)
            .with_error_recovery_delay(config.playback.error_recovery_delay)
            .with_repeat_mode(config.playback.initial_repeat_mode)
            .with_stream_while_caching(config.playback.stream_while_caching);
        let controller = PlaybackQueueController::new(
            Arc::clone(&config.media_engine),
            cache.clone(),
            controller_config,
            event_bus.clone(),
        )
        .await?;

        info!(cache_size_mb = config.cache_size_mb, "Playback core initialized");

        Ok(Self {
            controller: Arc::new(controller),
            cache,
            event_bus,
        })
    }

    /// Queue and transport commands.
    pub fn controller(&self) -> &PlaybackQueueController {
        &self.controller
    }

    pub fn cache(&self) -> &AudioCacheStore {
        &self.cache
    }

    /// Continuous player signals.
    pub fn observers(&self) -> PlayerObservers {
        self.controller.observers()
    }

    /// Subscribe to playback and cache events.
    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub async fn cache_stats(&self) -> Result<CacheStats> {
        Ok(self.cache.stats().await?)
    }

    /// Delete every cached track. Returns the number of files removed.
    pub async fn clear_cache(&self) -> Result<usize> {
        Ok(self.cache.clear().await?)
    }

    /// Stop playback and the controller's background tasks.
    pub async fn shutdown(&self) {
        self.controller.shutdown().await;
    }
}
