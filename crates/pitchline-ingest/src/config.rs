//! Ingest configuration.

use serde::{Deserialize, Serialize};

/// Settings for turning clip descriptions into observation records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum number of clips described concurrently.
    pub pool_size: usize,

    /// Confidence multiplier for descriptions using hedged language.
    pub hedge_penalty: f64,

    /// Confidence assumed for free-text descriptions with no `CONFIDENCE` field.
    pub default_confidence: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            hedge_penalty: 0.8,
            default_confidence: 0.7,
        }
    }
}

impl IngestConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            pool_size: std::env::var("PITCHLINE_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(d.pool_size),
            hedge_penalty: std::env::var("PITCHLINE_HEDGE_PENALTY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|p: &f64| (0.0..=1.0).contains(p))
                .unwrap_or(d.hedge_penalty),
            default_confidence: std::env::var("PITCHLINE_DEFAULT_CONFIDENCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|p: &f64| (0.0..=1.0).contains(p))
                .unwrap_or(d.default_confidence),
        }
    }

    /// Builder-style setter for the worker pool size.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Builder-style setter for the hedge penalty.
    pub fn with_hedge_penalty(mut self, penalty: f64) -> Self {
        self.hedge_penalty = penalty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.pool_size, 8);
        assert!((config.hedge_penalty - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pool_size_never_zero() {
        assert_eq!(IngestConfig::default().with_pool_size(0).pool_size, 1);
    }
}
