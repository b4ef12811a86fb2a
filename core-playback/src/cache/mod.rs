//! # Audio Cache Module
//!
//! Serves previously fetched tracks from disk instead of the network.
//!
//! ## Overview
//!
//! - Content-addressable: a URL maps to `<sha256-hex>` in the cache directory
//! - Single serialized download worker fed by a job queue
//! - Atomic promotion: downloads are written to `<sha256-hex>.temp` first
//! - Byte budget with least-recently-used (by mtime) eviction
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ AudioCacheStore              │   is_cached / cached_path / playback_path
//! │  (sync lookups)              │   answered directly from the filesystem
//! └────────┬─────────────────────┘
//!          │ CacheJob (mpsc)
//!          ▼
//! ┌──────────────────────────────┐
//! │ worker task                  │──> TrackResolver (byte stream)
//! │  download → rename → sweep   │──> EventBus (CacheEvent)
//! └──────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_playback::cache::{AudioCacheStore, CacheConfig};
//!
//! let store = AudioCacheStore::open(CacheConfig::new(dir), resolver, None).await?;
//!
//! if !store.is_cached(url) {
//!     // Fire and forget; the handle can be dropped.
//!     store.cache_async(url);
//! }
//! ```

pub mod config;
pub mod stats;
pub mod store;

pub use config::{CacheConfig, DEFAULT_MAX_CACHE_BYTES, TEMP_SUFFIX};
pub use stats::{CacheStats, EvictionReport};
pub use store::{cache_key, AudioCacheStore, PendingCache};
