//! # ta_core - Tactical Analytics Engine
//!
//! Turns a raw stream of spatio-temporal match events into structured
//! tactical indicators: formation shape, team compactness, an
//! expected-threat (xT) surface, and pass-network aggregates.
//!
//! ## Features
//! - Tolerant ingestion: multi-encoding/multi-delimiter tables, per-row
//!   skip-and-count error handling
//! - Deterministic formation classification with an explicit tie-break
//!   order
//! - Parallel per-minute timeline with progress, cancellation, and
//!   explicit (match, window) memoization
//! - Pure computation boundary: no network or disk I/O at runtime
//!
//! The engine sits between an ingestion collaborator (raw events, rosters,
//! threat grid) and a presentation collaborator (dashboard rendering);
//! neither side's concerns live here.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod pitch;
pub mod threat;

// Re-export the main analysis surface
pub use analysis::formation::{
    classify_outfield, detect_formation, FormationShape, FormationSnapshot,
};
pub use analysis::passnet::{build_pass_network, PassEdge, PassNetwork, PlayerNode};
pub use analysis::shape::{compactness, Compactness};
pub use analysis::timeline::{
    compute_timeline, CancelToken, Timeline, TimelineEngine, TimelineEntry, TimelineKey,
    TimelineProgress,
};
pub use analysis::window::{position_samples, window_around, MinuteWindow, PositionSample};

// Re-export the pipeline boundary
pub use api::{analyze_match, analyze_match_json, AnalyzeRequest, AnalyzeResponse, SCHEMA_VERSION};
pub use config::AnalysisConfig;
pub use error::{ApiError, ConfigError, IngestError, ThreatGridError, TimelineError};
pub use ingest::{ingest_match, IngestReport, TextEncoding};
pub use models::{
    Event, EventKind, MatchDataset, Outcome, Player, Qualifier, SheetPlayer, Side, Team, TeamSheet,
};
pub use threat::{GridSource, GridSpec, ThreatGrid};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
