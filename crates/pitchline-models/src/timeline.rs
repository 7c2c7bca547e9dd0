//! Synthesized match timeline.
//!
//! This is the stable output record handed to exporters and viewers. All
//! timestamps are whole seconds from the start of the video.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::event::{CandidateEvent, EventKind};
use crate::observation::DataGap;
use crate::phase::{Phase, PhaseName};

/// How a phase boundary was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryStatus {
    /// A candidate satisfied every ordering and window rule
    Resolved,
    /// No candidate satisfied the ordering rules
    Unresolved,
    /// Accepted, but outside the configured halftime window
    Degraded,
}

impl BoundaryStatus {
    /// Returns the status as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Unresolved => "unresolved",
            Self::Degraded => "degraded",
        }
    }

    /// Returns true if the boundary has a timestamp.
    pub fn has_timestamp(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// Final state of one phase boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundaryReport {
    pub kind: EventKind,
    pub status: BoundaryStatus,

    /// Accepted candidate; `null` when unresolved
    pub event: Option<CandidateEvent>,
}

impl BoundaryReport {
    /// Timestamp of the accepted candidate.
    pub fn timestamp_secs(&self) -> Option<u32> {
        self.event.as_ref().map(|e| e.timestamp_secs)
    }

    /// Confidence of the accepted candidate.
    pub fn confidence(&self) -> Option<f64> {
        self.event.as_ref().map(|e| e.confidence)
    }
}

/// A validated repeatable event placed inside a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimelineEvent {
    #[serde(flatten)]
    pub event: CandidateEvent,

    /// Phase containing the event timestamp
    pub phase: PhaseName,
}

/// A run of closely spaced kickouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PressurePeriod {
    pub start_secs: u32,
    pub end_secs: u32,
    pub event_count: usize,
}

/// How often one team won back its own kickouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KickoutRetention {
    /// Kickouts taken by the team
    pub kickouts: usize,

    /// Kickouts the team itself won
    pub won_own: usize,

    /// Kickouts won by another team
    pub lost: usize,

    /// `won_own / kickouts`, when the team took any
    pub retention_rate: Option<f64>,
}

/// Statistics derived from the validated timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimelineStats {
    pub total_events: usize,
    pub by_kind: BTreeMap<EventKind, usize>,
    pub by_phase: BTreeMap<PhaseName, usize>,
    pub by_team: BTreeMap<String, usize>,
    pub first_event_secs: Option<u32>,
    pub last_event_secs: Option<u32>,
    pub average_kickout_interval_secs: Option<f64>,
    pub pressure_periods: Vec<PressurePeriod>,
    /// Per kicking team; kickouts with no named kicker are left out
    pub kickout_retention: BTreeMap<String, KickoutRetention>,
    pub first_half_duration_secs: u32,
    pub halftime_duration_secs: u32,
    pub second_half_duration_secs: u32,
}

/// The globally consistent match timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Timeline {
    /// Exactly five phases in canonical order, covering `[0, total_duration_secs)`
    pub phases: Vec<Phase>,

    /// Validated repeatable events sorted by timestamp
    pub events: Vec<TimelineEvent>,

    /// The four phase boundaries in chronological kind order
    pub boundaries: Vec<BoundaryReport>,

    /// Clips that contributed nothing
    pub gaps: Vec<DataGap>,

    pub stats: TimelineStats,

    pub total_duration_secs: u32,
}

impl Timeline {
    /// Look up a phase by name.
    pub fn phase(&self, name: PhaseName) -> Option<&Phase> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// Look up a boundary report by kind.
    pub fn boundary(&self, kind: EventKind) -> Option<&BoundaryReport> {
        self.boundaries.iter().find(|b| b.kind == kind)
    }

    /// Validated events of one kind.
    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &TimelineEvent> {
        self.events.iter().filter(move |e| e.event.kind == kind)
    }

    /// Returns true if every boundary resolved cleanly.
    pub fn is_fully_resolved(&self) -> bool {
        self.boundaries
            .iter()
            .all(|b| b.status == BoundaryStatus::Resolved)
    }
}
