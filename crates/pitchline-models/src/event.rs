//! Match event models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of a detected match event.
///
/// The first four are phase boundaries (at most one survives validation per
/// kind); `Kickout` and `ScoringAttempt` repeat through the match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MatchStart,
    FirstHalfEnd,
    SecondHalfStart,
    MatchEnd,
    Kickout,
    ScoringAttempt,
}

impl EventKind {
    /// Boundary kinds in the order they occur in a match.
    pub const BOUNDARY_ORDER: [EventKind; 4] = [
        EventKind::MatchStart,
        EventKind::FirstHalfEnd,
        EventKind::SecondHalfStart,
        EventKind::MatchEnd,
    ];

    /// Kinds that can occur any number of times.
    pub const REPEATABLE: [EventKind; 2] = [EventKind::Kickout, EventKind::ScoringAttempt];

    /// Returns true for the four phase boundary kinds.
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            Self::MatchStart | Self::FirstHalfEnd | Self::SecondHalfStart | Self::MatchEnd
        )
    }

    /// Returns true for kinds that may occur more than once.
    pub fn is_repeatable(&self) -> bool {
        !self.is_boundary()
    }

    /// Position in [`EventKind::BOUNDARY_ORDER`], if this is a boundary.
    pub fn boundary_index(&self) -> Option<usize> {
        Self::BOUNDARY_ORDER.iter().position(|k| k == self)
    }

    /// Returns the kind as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MatchStart => "match_start",
            Self::FirstHalfEnd => "first_half_end",
            Self::SecondHalfStart => "second_half_start",
            Self::MatchEnd => "match_end",
            Self::Kickout => "kickout",
            Self::ScoringAttempt => "scoring_attempt",
        }
    }

    /// Human-readable label used by viewers and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MatchStart => "Match start",
            Self::FirstHalfEnd => "First half end",
            Self::SecondHalfStart => "Second half start",
            Self::MatchEnd => "Match end",
            Self::Kickout => "Kickout",
            Self::ScoringAttempt => "Scoring attempt",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unvalidated, possibly conflicting event detected from one or more clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateEvent {
    /// What was detected
    pub kind: EventKind,

    /// Seconds from the start of the video
    pub timestamp_secs: u32,

    /// Confidence in [0, 1]
    pub confidence: f64,

    /// Clips that contributed to this event, ascending
    pub source_clip_indices: Vec<u32>,

    /// Supporting description text
    pub evidence: String,

    /// Team credited with the event (kickouts), when the description named one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    /// Team that won the ball from the restart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possession_won_by: Option<String>,
}

impl CandidateEvent {
    /// Create a candidate sourced from a single clip.
    pub fn new(
        kind: EventKind,
        timestamp_secs: u32,
        confidence: f64,
        clip_index: u32,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            timestamp_secs,
            confidence,
            source_clip_indices: vec![clip_index],
            evidence: evidence.into(),
            team: None,
            possession_won_by: None,
        }
    }

    /// Set the team.
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Set the team that won possession.
    pub fn with_possession(mut self, team: impl Into<String>) -> Self {
        self.possession_won_by = Some(team.into());
        self
    }

    /// Whether the kicking team kept the ball. `None` when either side is
    /// unknown.
    pub fn retained_possession(&self) -> Option<bool> {
        let team = self.team.as_deref()?;
        let winner = self.possession_won_by.as_deref()?;
        Some(team.eq_ignore_ascii_case(winner))
    }

    /// First contributing clip, used as the last tie-breaker.
    pub fn first_clip_index(&self) -> u32 {
        self.source_clip_indices.first().copied().unwrap_or(u32::MAX)
    }
}
