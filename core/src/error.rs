use crate::classification::Rejection;
use thiserror::Error;

/// Result type for cirrusvol operations
pub type Result<T> = std::result::Result<T, CirrusError>;

/// Error types for cirrusvol operations
#[derive(Error, Debug)]
pub enum CirrusError {
    /// File does not satisfy the path, name or anchor rules
    #[error("classification rejected: {0}")]
    ClassificationRejected(Rejection),

    /// Byte length matches no known or forced geometry
    #[error("geometry rejected: {0}")]
    GeometryRejected(String),

    /// Raw buffer cannot be reshaped into the requested volume
    #[error("corrupt input: got {actual} bytes, expected {expected}")]
    CorruptInput { expected: usize, actual: usize },

    /// Generic materialization error
    #[error("materialization failed: {0}")]
    MaterializationFailed(String),

    /// Run cannot start with the given configuration
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Writing a .npy artifact failed
    #[error("npy write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    /// Reading a .npy artifact failed
    #[error("npy read error: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    /// Metadata document could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CirrusError {
    /// Returns true for errors that must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, CirrusError::ConfigurationInvalid(_))
    }
}

impl From<Rejection> for CirrusError {
    fn from(r: Rejection) -> Self {
        CirrusError::ClassificationRejected(r)
    }
}

impl From<globset::Error> for CirrusError {
    fn from(e: globset::Error) -> Self {
        CirrusError::ConfigurationInvalid(format!("bad glob pattern: {}", e))
    }
}
