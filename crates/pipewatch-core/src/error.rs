// Rust guideline compliant 2026-02-06

//! Error types for the Pipewatch core library.

use thiserror::Error;

/// Result type alias for Pipewatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Pipewatch operations.
///
/// None of these ever reach the observed pipeline: the reporter logs and
/// drops them at the event boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while writing to the output sink or a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid reporter configuration.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
