//! Error types for the cytofreq library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum CytoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{0}' in sample table")]
    MissingColumn(String),

    #[error("Invalid count value '{value}' for population '{population}' in sample '{sample_id}'")]
    InvalidCount {
        value: String,
        population: String,
        sample_id: String,
    },

    #[error("Invalid response code '{value}' in sample '{sample_id}' (expected 'y', 'n', or empty)")]
    InvalidResponse { value: String, sample_id: String },

    #[error("Duplicate sample id '{0}'")]
    DuplicateSample(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Plot rendering error: {0}")]
    Plot(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, CytoError>;
