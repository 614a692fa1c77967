//! JSON API boundary
//!
//! String-in/string-out entry point for the rendering collaborator: one
//! versioned request carries the raw event table, both team sheets, and the
//! analysis parameters; the response carries every structured output the
//! core produces. The core owns no wire format beyond this JSON.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::passnet::{build_pass_network, PassNetwork};
use crate::analysis::timeline::{compute_timeline, CancelToken, Timeline};
use crate::config::AnalysisConfig;
use crate::error::ApiError;
use crate::ingest::{ingest_match, IngestReport};
use crate::models::{Event, Player, TeamSheet};
use crate::threat::{GridSource, GridSpec, ThreatGrid, DEFAULT_COLS, DEFAULT_ROWS};

pub const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub schema_version: u8,
    pub match_id: String,
    #[serde(default)]
    pub config: AnalysisConfig,
    /// Raw delimiter-separated action table, exactly as supplied by the
    /// event-source collaborator.
    pub event_table: String,
    pub home_team: TeamSheet,
    pub away_team: TeamSheet,
    /// Caller-supplied threat grid; the embedded default when absent.
    #[serde(default)]
    pub threat_grid: Option<GridSpec>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub schema_version: u8,
    pub match_id: String,
    pub grid_source: GridSource,
    /// False when the fallback grid was used; such runs cannot be
    /// reproduced bit-for-bit and callers must surface that.
    pub reproducible: bool,
    pub ingest: IngestReport,
    /// Resolved roster with derived short names, sorted by player id.
    pub players: Vec<Player>,
    /// Canonical events after the xT enrichment pass.
    pub events: Vec<Event>,
    pub timeline: Timeline,
    pub home_network: PassNetwork,
    pub away_network: PassNetwork,
}

/// Run the whole pipeline for one request.
pub fn analyze_match(request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
    if request.schema_version != SCHEMA_VERSION {
        return Err(ApiError::UnsupportedSchema {
            found: request.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let (mut dataset, ingest) = ingest_match(
        &request.match_id,
        request.event_table.as_bytes(),
        &request.home_team,
        &request.away_team,
    )?;

    let grid = resolve_grid(request.threat_grid.clone());
    grid.annotate(&mut dataset.events);

    let timeline = compute_timeline(&dataset, &request.config, &CancelToken::new(), None)?;
    let home_network = build_pass_network(&dataset, dataset.teams[0].id);
    let away_network = build_pass_network(&dataset, dataset.teams[1].id);

    let mut players: Vec<Player> = dataset.players.values().cloned().collect();
    players.sort_by_key(|player| player.id);

    Ok(AnalyzeResponse {
        schema_version: SCHEMA_VERSION,
        match_id: dataset.match_id.clone(),
        grid_source: grid.source(),
        reproducible: grid.is_reproducible(),
        ingest,
        players,
        events: dataset.events,
        timeline,
        home_network,
        away_network,
    })
}

/// JSON-string wrapper around [`analyze_match`].
pub fn analyze_match_json(request_json: &str) -> Result<String, ApiError> {
    let request: AnalyzeRequest = serde_json::from_str(request_json)?;
    let response = analyze_match(&request)?;
    serde_json::to_string(&response).map_err(ApiError::Encode)
}

/// A missing grid uses the embedded default; an invalid one degrades to
/// the flagged fallback instead of failing the pipeline.
fn resolve_grid(spec: Option<GridSpec>) -> ThreatGrid {
    match spec {
        None => ThreatGrid::embedded().clone(),
        Some(spec) => match ThreatGrid::from_spec(spec, GridSource::Provided) {
            Ok(grid) => grid,
            Err(err) => {
                warn!(error = %err, "caller-supplied threat grid rejected");
                ThreatGrid::fallback(DEFAULT_ROWS, DEFAULT_COLS)
            }
        },
    }
}
