//! Error types for swath variable access.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File missing, truncated, or not a NetCDF/HDF5 container
    #[error("Failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    /// Missing required dimension or variable
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Variable length differs from the product of its declared dimensions
    #[error("Variable '{name}' has {actual} elements, expected {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl NetCdfError {
    /// Whether this error means the file itself is unusable, as opposed to
    /// a required variable being absent or malformed.
    pub fn is_open_failure(&self) -> bool {
        matches!(self, NetCdfError::Open { .. })
    }
}
