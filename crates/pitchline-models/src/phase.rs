//! Canonical match phases.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name of a canonical match phase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    PreMatch,
    FirstHalf,
    Halftime,
    SecondHalf,
    PostMatch,
}

impl PhaseName {
    /// Phases in the order they occur.
    pub const CANONICAL_ORDER: [PhaseName; 5] = [
        PhaseName::PreMatch,
        PhaseName::FirstHalf,
        PhaseName::Halftime,
        PhaseName::SecondHalf,
        PhaseName::PostMatch,
    ];

    /// Returns the phase as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreMatch => "pre_match",
            Self::FirstHalf => "first_half",
            Self::Halftime => "halftime",
            Self::SecondHalf => "second_half",
            Self::PostMatch => "post_match",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PreMatch => "Pre-match",
            Self::FirstHalf => "First half",
            Self::Halftime => "Halftime",
            Self::SecondHalf => "Second half",
            Self::PostMatch => "Post-match",
        }
    }

    /// Returns true for the two halves of play.
    pub fn is_in_play(&self) -> bool {
        matches!(self, Self::FirstHalf | Self::SecondHalf)
    }
}

impl std::fmt::Display for PhaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, half-open interval `[start_secs, end_secs)` of the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Phase {
    pub name: PhaseName,

    /// Inclusive start, seconds from video start
    pub start_secs: u32,

    /// Exclusive end
    pub end_secs: u32,

    /// Confidence in [0, 1]
    pub confidence: f64,

    /// Set when a defining boundary was unresolved or out of its window
    pub degraded: bool,
}

impl Phase {
    /// Duration in seconds (zero for collapsed phases).
    pub fn duration_secs(&self) -> u32 {
        self.end_secs.saturating_sub(self.start_secs)
    }

    /// Whether the phase has zero length.
    pub fn is_empty(&self) -> bool {
        self.end_secs <= self.start_secs
    }

    /// Whether a timestamp falls inside the phase.
    pub fn contains(&self, timestamp_secs: u32) -> bool {
        self.start_secs <= timestamp_secs && timestamp_secs < self.end_secs
    }
}
