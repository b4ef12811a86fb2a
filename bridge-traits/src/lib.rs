//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the
//! platform-specific pieces it drives but does not own. Each trait
//! represents a capability the core requires but that is implemented
//! differently per platform (desktop, Android, iOS).
//!
//! ## Traits
//!
//! - [`MediaEngine`](media::MediaEngine) - Decode/render engine driven by the queue controller
//! - [`TrackResolver`](resolver::TrackResolver) - Byte-stream fetcher used by the audio cache
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ `TrackResolver` |
//! | Android  | host app            | 📋 Planned |
//! | iOS      | host app            | 📋 Planned |
//!
//! There is no default `MediaEngine`; hosts always inject their own.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep the original message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. Engines in particular may be
//! called from the controller's command path and its position sampler at
//! the same time.

pub mod error;
pub mod logging;
pub mod media;
pub mod resolver;

pub use error::BridgeError;

// Re-export commonly used types
pub use logging::{LogEntry, LogLevel, LoggerSink, StderrLogger};
pub use media::{
    EngineEvent, EngineEventSink, EngineState, MediaEngine, MediaSource, RepeatMode,
};
pub use resolver::{ByteStream, TrackResolver};
