//! Error types for editing operations and configuration.

use thiserror::Error;

/// Errors raised by editing operations.
///
/// None of these are fatal: the session reports them as notices (input and
/// resource errors) or logs them (index errors) and leaves state unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("Point ({x:.1}, {y:.1}) lies outside the image")]
    OutsideImage { x: f64, y: f64 },
    #[error("A polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("The image is not loaded yet")]
    ImageNotReady,
    #[error("No annotation at index {index} (store holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Annotation {0} is not a circle")]
    NotACircle(usize),
    #[error("A save is already in progress")]
    SaveInProgress,
    #[error("Unknown class: {0}")]
    UnknownClass(String),
}

/// Result type for editing operations.
pub type EditResult<T> = Result<T, EditError>;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid color '{0}'")]
    InvalidColor(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
