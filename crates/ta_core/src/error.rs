use thiserror::Error;

/// Errors raised while parsing and normalizing a raw event table.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("no (encoding, delimiter) candidate produced more than {min_columns} columns")]
    NoParsableFormat { min_columns: usize },

    #[error("event table has a header but no data rows")]
    EmptyTable,

    #[error("event table is missing required column '{name}'")]
    MissingColumn { name: &'static str },

    #[error("team sheet '{team}' has no players")]
    EmptyTeamSheet { team: String },

    #[error("home and away team sheets share id {id}")]
    DuplicateTeamId { id: u32 },
}

/// Errors raised while loading or validating a threat grid.
#[derive(Error, Debug)]
pub enum ThreatGridError {
    #[error("grid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("grid has no cells")]
    Empty,

    #[error("grid declares {rows}x{cols} cells but carries {found} values")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        found: usize,
    },

    #[error("grid cell ({row}, {col}) value {value} is outside [0, 1)")]
    ValueOutOfRange { row: usize, col: usize, value: f32 },
}

/// Errors raised by analysis configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("window size must be at least 1 minute, got {0}")]
    WindowTooSmall(u32),

    #[error("percentile band split ({lower}, {upper}) must satisfy 0 < lower < upper < 1")]
    InvalidBandSplit { lower: f32, upper: f32 },
}

/// Errors raised by timeline computation.
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("timeline computation was cancelled")]
    Cancelled,

    #[error("dataset contains no events")]
    EmptyDataset,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised at the JSON API boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request JSON: {0}")]
    Request(#[from] serde_json::Error),

    #[error("unsupported schema_version {found}, expected {expected}")]
    UnsupportedSchema { found: u8, expected: u8 },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error("response JSON: {0}")]
    Encode(#[source] serde_json::Error),
}
