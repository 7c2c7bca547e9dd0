//! Error types for synthesis.
//!
//! Only configuration problems are fatal. Bad clips and unresolvable
//! boundaries are carried in the timeline as gaps and status flags.

use thiserror::Error;

/// Result type for synthesis operations.
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// Errors that stop a synthesis run before it starts.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },
}

impl SynthesisError {
    /// Create an invalid configuration error.
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }

    /// Check if the error came from configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }
}
