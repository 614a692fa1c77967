//! Expected-threat (xT) model
//!
//! A fixed-resolution scalar grid over the pitch assigns each zone a
//! possession value in [0,1). A successful open-play pass is worth the
//! difference between its end-zone and start-zone values.
//!
//! The default grid ships embedded in the binary and loads once per
//! process. When a caller's grid source is unavailable or invalid,
//! [`ThreatGrid::fallback`] substitutes a low-magnitude pseudo-random grid;
//! its `Fallback` source marks the run as non-reproducible and callers must
//! surface that.

use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ThreatGridError;
use crate::models::Event;
use crate::pitch::{self, MeterPos};

/// Default grid resolution (rows x cols over the 105x68 m pitch).
pub const DEFAULT_ROWS: usize = 8;
pub const DEFAULT_COLS: usize = 12;

/// Upper bound for fallback cell values; small enough that fallback xT can
/// never be mistaken for calibrated output.
const FALLBACK_MAGNITUDE: f32 = 0.01;

const EMBEDDED_GRID_JSON: &str = include_str!("../../data/xt_grid.v1.json");

static EMBEDDED_GRID: Lazy<ThreatGrid> = Lazy::new(|| {
    let spec: GridSpec =
        serde_json::from_str(EMBEDDED_GRID_JSON).expect("embedded xT grid JSON is corrupted");
    ThreatGrid::from_spec(spec, GridSource::Embedded).expect("embedded xT grid is invalid")
});

/// Where a grid's values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridSource {
    /// The compiled-in default grid.
    Embedded,
    /// A grid supplied by the caller.
    Provided,
    /// The pseudo-random placeholder; results are not reproducible.
    Fallback,
}

/// Raw grid payload as exchanged with collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cell values.
    pub values: Vec<f32>,
}

/// A validated, immutable threat surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatGrid {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
    source: GridSource,
}

impl ThreatGrid {
    /// The compiled-in default grid, loaded once per process.
    pub fn embedded() -> &'static ThreatGrid {
        &EMBEDDED_GRID
    }

    /// Validate and adopt a caller-supplied grid.
    pub fn from_spec(spec: GridSpec, source: GridSource) -> Result<Self, ThreatGridError> {
        let GridSpec { rows, cols, values } = spec;
        if rows == 0 || cols == 0 || values.is_empty() {
            return Err(ThreatGridError::Empty);
        }
        if values.len() != rows * cols {
            return Err(ThreatGridError::DimensionMismatch {
                rows,
                cols,
                found: values.len(),
            });
        }
        for (index, &value) in values.iter().enumerate() {
            if !value.is_finite() || !(0.0..1.0).contains(&value) {
                return Err(ThreatGridError::ValueOutOfRange {
                    row: index / cols,
                    col: index % cols,
                    value,
                });
            }
        }
        Ok(Self {
            rows,
            cols,
            values,
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ThreatGridError> {
        let spec: GridSpec = serde_json::from_str(json)?;
        Self::from_spec(spec, GridSource::Provided)
    }

    /// Low-magnitude pseudo-random placeholder for an unavailable grid
    /// source. Seeded from entropy, so two fallback grids never agree;
    /// downstream results are flagged non-reproducible.
    pub fn fallback(rows: usize, cols: usize) -> Self {
        warn!(rows, cols, "threat grid unavailable, using non-reproducible fallback");
        let mut rng = ChaCha8Rng::from_entropy();
        let values = (0..rows * cols)
            .map(|_| rng.gen_range(0.0..FALLBACK_MAGNITUDE))
            .collect();
        Self {
            rows,
            cols,
            values,
            source: GridSource::Fallback,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn source(&self) -> GridSource {
        self.source
    }

    /// False only for the fallback grid.
    pub fn is_reproducible(&self) -> bool {
        self.source != GridSource::Fallback
    }

    pub fn value_at(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.cols + col]
    }

    /// Bin a meter position into a cell, clamping to the grid extents.
    /// Non-finite or off-pitch coordinates resolve to no cell.
    pub fn cell_for(&self, pos: MeterPos) -> Option<(usize, usize)> {
        if !pitch::in_bounds(pos) {
            return None;
        }
        let col_width = pitch::LENGTH_M / self.cols as f32;
        let row_height = pitch::WIDTH_M / self.rows as f32;
        let col = ((pos.0 / col_width) as usize).min(self.cols - 1);
        let row = ((pos.1 / row_height) as usize).min(self.rows - 1);
        Some((row, col))
    }

    pub fn threat_at(&self, pos: MeterPos) -> Option<f32> {
        self.cell_for(pos).map(|(row, col)| self.value_at(row, col))
    }

    /// Possession-value delta for a pass. Coordinates outside every defined
    /// cell contribute zero.
    pub fn pass_delta(&self, start_m: MeterPos, end_m: MeterPos) -> f32 {
        match (self.threat_at(end_m), self.threat_at(start_m)) {
            (Some(end), Some(start)) => end - start,
            _ => 0.0,
        }
    }

    /// One-time enrichment pass: set `xt` on every successful open-play
    /// pass with an end location. All other events keep `xt = None`.
    pub fn annotate(&self, events: &mut [Event]) {
        for event in events.iter_mut() {
            if !event.is_open_play_pass() {
                continue;
            }
            let Some(end_m) = event.end_m else {
                continue;
            };
            event.xt = Some(self.pass_delta(event.start_m, end_m));
        }
    }
}
