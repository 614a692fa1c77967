//! # Analysis Module
//!
//! Windowed tactical analysis over a canonical event stream.
//!
//! ## Submodules
//!
//! - `window` - sliding-window position sampling
//! - `shape` - compactness metrics
//! - `formation` - outfield shape classification
//! - `passnet` - pass network aggregation
//! - `timeline` - per-minute orchestration, caching, cancellation

pub mod formation;
pub mod passnet;
pub mod shape;
pub mod timeline;
pub mod window;
