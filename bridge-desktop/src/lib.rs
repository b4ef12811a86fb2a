//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `TrackResolver` using `reqwest` streaming bodies
//!
//! Desktop hosts still provide their own `MediaEngine`.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestTrackResolver;
//! use std::sync::Arc;
//!
//! let resolver = Arc::new(ReqwestTrackResolver::new()?);
//! // Hand to CoreConfig::builder().track_resolver(resolver)
//! ```

mod resolver;

pub use resolver::{ReqwestTrackResolver, RetryPolicy};
