//! # Playback Module
//!
//! Queue controller and audio cache for track playback.
//!
//! ## Overview
//!
//! This module handles:
//! - Content-addressable disk cache for remote audio with LRU eviction
//! - Play queue with shuffle and repeat
//! - Transport state machine driving a host [`MediaEngine`](bridge_traits::MediaEngine)
//! - Position sampling and state fan-out to observers

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod publisher;
pub mod queue;
pub mod track;

pub use cache::{AudioCacheStore, CacheConfig, CacheStats, EvictionReport, PendingCache};
pub use config::ControllerConfig;
pub use controller::PlaybackQueueController;
pub use error::{PlaybackError, Result};
pub use publisher::PlayerObservers;
pub use queue::PlayQueue;
pub use track::{CommandOutcome, Track, TransportState};
