//! Per-clip observation models.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One structured observation of a single fixed-length clip.
///
/// Built by the observation store from an [`ObservationRecord`] once the
/// record has been checked; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipObservation {
    /// Zero-based clip position
    pub clip_index: u32,

    /// `clip_index * clip_duration_secs`
    pub start_offset_secs: u32,

    /// Normalized tags (see [`crate::tags`])
    pub raw_labels: BTreeSet<String>,

    /// Describer confidence in [0, 1]
    pub confidence: f64,

    /// Free-text description the tags were derived from
    pub evidence_text: String,

    /// Seconds into the clip at which a restart happened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_offset_secs: Option<u32>,

    /// Team named by the description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    /// Team that came away with the ball after a restart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possession_won_by: Option<String>,
}

impl ClipObservation {
    /// Whether the observation carries a normalized tag.
    pub fn has_label(&self, tag: &str) -> bool {
        self.raw_labels.contains(tag)
    }
}

/// Unchecked per-clip record as handed over by the description stage.
///
/// Every field may be missing or wrong; the store turns bad records into
/// [`DataGap`]s instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObservationRecord {
    #[serde(default)]
    pub clip_index: Option<u32>,

    #[serde(default)]
    pub start_offset_secs: Option<u32>,

    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub confidence: Option<f64>,

    #[serde(default)]
    pub evidence_text: String,

    #[serde(default)]
    pub contact_offset_secs: Option<f64>,

    #[serde(default)]
    pub team: Option<String>,

    #[serde(default)]
    pub possession_won_by: Option<String>,
}

impl ObservationRecord {
    /// Create a record for a clip index with a confidence.
    pub fn new(clip_index: u32, confidence: f64) -> Self {
        Self {
            clip_index: Some(clip_index),
            confidence: Some(confidence),
            ..Self::default()
        }
    }

    /// Create a record located only by its start offset.
    pub fn at_offset(start_offset_secs: u32) -> Self {
        Self {
            start_offset_secs: Some(start_offset_secs),
            ..Self::default()
        }
    }

    /// Add labels.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Set the evidence text.
    pub fn with_evidence(mut self, text: impl Into<String>) -> Self {
        self.evidence_text = text.into();
        self
    }

    /// Set the in-clip contact offset.
    pub fn with_contact_offset(mut self, secs: f64) -> Self {
        self.contact_offset_secs = Some(secs);
        self
    }

    /// Set the team.
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Set the team that won the restart.
    pub fn with_possession(mut self, team: impl Into<String>) -> Self {
        self.possession_won_by = Some(team.into());
        self
    }

    /// Set the confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Why a clip produced no observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GapReason {
    /// No record arrived for this index
    MissingRecord,
    /// Record carried no confidence value
    MissingConfidence,
    /// Confidence was NaN or outside [0, 1]
    ConfidenceOutOfRange,
    /// Offset is not on a clip boundary or disagrees with the index
    MisalignedOffset,
    /// An earlier record already covered this index
    DuplicateClip,
    /// The description could not be read or produced
    UnreadableDescription,
    /// Clip start lies past the longest supported video
    OffsetOutOfRange,
}

impl GapReason {
    /// Returns the reason as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRecord => "missing_record",
            Self::MissingConfidence => "missing_confidence",
            Self::ConfidenceOutOfRange => "confidence_out_of_range",
            Self::MisalignedOffset => "misaligned_offset",
            Self::DuplicateClip => "duplicate_clip",
            Self::UnreadableDescription => "unreadable_description",
            Self::OffsetOutOfRange => "offset_out_of_range",
        }
    }
}

/// A clip, or a run of consecutive clips, that contributed nothing to
/// synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DataGap {
    /// Clip index, when the record carried a usable one. For a run this is
    /// the first index.
    pub clip_index: Option<u32>,

    /// Number of consecutive clips covered, starting at `clip_index`
    #[serde(default = "one_clip")]
    pub clip_count: u32,

    /// Why the clip was skipped
    pub reason: GapReason,
}

fn one_clip() -> u32 {
    1
}

impl DataGap {
    pub fn new(clip_index: Option<u32>, reason: GapReason) -> Self {
        Self {
            clip_index,
            clip_count: 1,
            reason,
        }
    }

    /// A run of `clip_count` consecutive clips starting at `first`.
    pub fn span(first: u32, clip_count: u32, reason: GapReason) -> Self {
        Self {
            clip_index: Some(first),
            clip_count: clip_count.max(1),
            reason,
        }
    }

    /// Last clip index covered by the gap.
    pub fn last_index(&self) -> Option<u32> {
        self.clip_index
            .map(|first| first.saturating_add(self.clip_count.saturating_sub(1)))
    }
}
