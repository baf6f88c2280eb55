use std::io;

use thiserror::Error;

/// Everything that can abort a load or a render pass.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("dataset '{path}' is unavailable: {reason}")]
    DataUnavailable { path: String, reason: String },
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("cannot aggregate an empty table")]
    EmptyInput,
    #[error("not enough data for this selection")]
    InsufficientData,
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("cannot log-scale '{label}': negative value {value}")]
    InvalidLogInput { label: String, value: f64 },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("chart rendering failed: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
