//! Synthesis metrics collection.
//!
//! Counters describing how much of the input survived each stage:
//! - Clips accepted and data gaps by reason
//! - Candidates emitted by kind
//! - Boundaries by resolution status
//! - Repeatable candidates absorbed by merging

use metrics::{counter, histogram};
use pitchline_models::{BoundaryStatus, DataGap, EventKind};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Clips that produced a usable observation.
    pub const CLIPS_ACCEPTED_TOTAL: &str = "pitchline_clips_accepted_total";

    /// Data gaps recorded by reason.
    pub const DATA_GAPS_TOTAL: &str = "pitchline_data_gaps_total";

    /// Candidates emitted by the extractor, by kind.
    pub const CANDIDATES_TOTAL: &str = "pitchline_candidates_total";

    /// Phase boundaries by kind and status.
    pub const BOUNDARIES_TOTAL: &str = "pitchline_boundaries_total";

    /// Repeatable candidates absorbed into a neighbour, by kind.
    pub const MERGED_TOTAL: &str = "pitchline_merged_candidates_total";

    /// Phase confidence distribution.
    pub const PHASE_CONFIDENCE: &str = "pitchline_phase_confidence";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record the outcome of loading the observation store.
pub fn record_clips_accepted(count: usize) {
    counter!(names::CLIPS_ACCEPTED_TOTAL).increment(count as u64);
}

/// Record one data gap, counting every clip it covers.
pub fn record_gap(gap: &DataGap) {
    counter!(
        names::DATA_GAPS_TOTAL,
        "reason" => gap.reason.as_str()
    )
    .increment(u64::from(gap.clip_count));
}

/// Record one emitted candidate.
pub fn record_candidate(kind: EventKind) {
    counter!(
        names::CANDIDATES_TOTAL,
        "kind" => kind.as_str()
    )
    .increment(1);
}

/// Record the final status of a boundary.
pub fn record_boundary(kind: EventKind, status: BoundaryStatus) {
    counter!(
        names::BOUNDARIES_TOTAL,
        "kind" => kind.as_str(),
        "status" => status.as_str()
    )
    .increment(1);
}

/// Record candidates absorbed while merging repeatables.
pub fn record_merged(kind: EventKind, absorbed: usize) {
    if absorbed == 0 {
        return;
    }
    counter!(
        names::MERGED_TOTAL,
        "kind" => kind.as_str()
    )
    .increment(absorbed as u64);
}

/// Record the confidence assigned to a phase.
pub fn record_phase_confidence(phase: &'static str, confidence: f64) {
    histogram!(
        names::PHASE_CONFIDENCE,
        "phase" => phase
    )
    .record(confidence);
}

// =============================================================================
// Tests
// =============================================================================
