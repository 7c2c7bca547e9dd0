//! Error types for ingest.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for ingest operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors raised while locating or describing clips.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid clip name: {}", .0.display())]
    InvalidClipName(PathBuf),

    #[error("Failed to describe clip at {offset_secs}s: {message}")]
    Describe { offset_secs: u32, message: String },
}

impl IngestError {
    /// Create a describe error.
    pub fn describe(offset_secs: u32, message: impl Into<String>) -> Self {
        Self::Describe {
            offset_secs,
            message: message.into(),
        }
    }
}
