//! Error types for the observation data model.

use thiserror::Error;

/// Result type alias using ObsError.
pub type ObsResult<T> = Result<T, ObsError>;

/// Violations of the [`ObservationSet`](crate::ObservationSet) layout.
#[derive(Debug, Error)]
pub enum ObsError {
    #[error("Array '{name}' has length {actual}, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Metadata table '{name}' has {actual} rows, expected {expected}")]
    MetadataRows {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid observation set: {0}")]
    Invalid(String),
}
