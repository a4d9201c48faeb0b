//! Error types for the ingestion crate.

use netcdf_parser::NetCdfError;
use obs_common::{ObsError, TimeError};
use thiserror::Error;

/// Errors that end a conversion call without producing a result.
///
/// A file that cannot be opened is not an error; see
/// [`ConversionOutcome::Skipped`](crate::ConversionOutcome::Skipped).
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    #[error("Missing required configuration key: {0}")]
    MissingConfigKey(&'static str),

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Missing required variable: {0}")]
    MissingVariable(String),

    #[error("Variable shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Failed to parse NetCDF data: {0}")]
    NetcdfParse(String),

    #[error("Time reconstruction failed: {0}")]
    Time(#[from] TimeError),

    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl From<NetCdfError> for IngestionError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::MissingData(what) => IngestionError::MissingVariable(what),
            e @ NetCdfError::ShapeMismatch { .. } => IngestionError::ShapeMismatch(e.to_string()),
            NetCdfError::IoError(e) => IngestionError::FileRead(e),
            e => IngestionError::NetcdfParse(e.to_string()),
        }
    }
}

impl From<ObsError> for IngestionError {
    fn from(err: ObsError) -> Self {
        IngestionError::InvariantViolation(err.to_string())
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
