//! Timeline synthesis.
//!
//! Places the four boundaries as edges between the five canonical phases
//! and tags every validated event with the phase containing it.

use pitchline_models::{
    BoundaryStatus, CandidateEvent, DataGap, EventKind, Phase, PhaseName, Timeline, TimelineEvent,
};
use tracing::info;

use crate::config::SynthesisConfig;
use crate::metrics;
use crate::stats::compute_stats;
use crate::validator::{BoundaryResolution, ValidationOutcome};

/// Boundary kinds that open and close each phase.
fn defining_boundaries(phase: PhaseName) -> &'static [EventKind] {
    match phase {
        PhaseName::PreMatch => &[EventKind::MatchStart],
        PhaseName::FirstHalf => &[EventKind::MatchStart, EventKind::FirstHalfEnd],
        PhaseName::Halftime => &[EventKind::FirstHalfEnd, EventKind::SecondHalfStart],
        PhaseName::SecondHalf => &[EventKind::SecondHalfStart, EventKind::MatchEnd],
        PhaseName::PostMatch => &[EventKind::MatchEnd],
    }
}

/// Compute the six phase edges.
///
/// An unresolved boundary takes the position of the next resolved one (or
/// the end of the video), so the phase before it absorbs the gap.
pub fn phase_edges(boundaries: &[BoundaryResolution], total_duration_secs: u32) -> [u32; 6] {
    let mut edges = [0u32; 6];
    edges[5] = total_duration_secs;

    for (slot, kind) in EventKind::BOUNDARY_ORDER.iter().enumerate().rev() {
        let i = slot + 1;
        edges[i] = boundaries
            .iter()
            .find(|b| b.kind == *kind)
            .and_then(BoundaryResolution::timestamp_secs)
            .map(|t| t.min(total_duration_secs))
            .unwrap_or(edges[i + 1]);
    }
    for i in 1..6 {
        edges[i] = edges[i].max(edges[i - 1]);
    }
    edges
}

fn phase_confidence(
    phase: PhaseName,
    boundaries: &[BoundaryResolution],
    config: &SynthesisConfig,
) -> (f64, bool) {
    let mut confidence: Option<f64> = None;
    let mut degraded = false;
    let mut unresolved = false;

    for kind in defining_boundaries(phase) {
        let resolution = boundaries.iter().find(|b| b.kind == *kind);
        match resolution.and_then(|r| r.event.as_ref().map(|e| (r.status, e.confidence))) {
            Some((status, c)) => {
                if status == BoundaryStatus::Degraded {
                    degraded = true;
                }
                confidence = Some(confidence.map_or(c, |cur| cur.min(c)));
            }
            None => {
                unresolved = true;
                degraded = true;
            }
        }
    }

    let mut value = confidence.unwrap_or(0.0);
    if unresolved {
        value *= config.unresolved_phase_factor;
    }
    (value.clamp(0.0, 1.0), degraded)
}

/// Build the five contiguous phases in canonical order.
pub fn build_phases(
    boundaries: &[BoundaryResolution],
    total_duration_secs: u32,
    config: &SynthesisConfig,
) -> Vec<Phase> {
    let edges = phase_edges(boundaries, total_duration_secs);

    PhaseName::CANONICAL_ORDER
        .iter()
        .enumerate()
        .map(|(i, &name)| {
            let (confidence, degraded) = phase_confidence(name, boundaries, config);
            metrics::record_phase_confidence(name.as_str(), confidence);
            Phase {
                name,
                start_secs: edges[i],
                end_secs: edges[i + 1],
                confidence,
                degraded,
            }
        })
        .collect()
}

/// Phase containing a timestamp.
///
/// A timestamp at or past the end belongs to the last non-empty phase.
pub fn phase_for(phases: &[Phase], timestamp_secs: u32) -> PhaseName {
    phases
        .iter()
        .find(|p| p.contains(timestamp_secs))
        .or_else(|| phases.iter().rev().find(|p| !p.is_empty()))
        .map(|p| p.name)
        .unwrap_or(PhaseName::PreMatch)
}

/// Tag validated events with their phase.
pub fn tag_events(phases: &[Phase], events: Vec<CandidateEvent>) -> Vec<TimelineEvent> {
    events
        .into_iter()
        .map(|event| TimelineEvent {
            phase: phase_for(phases, event.timestamp_secs),
            event,
        })
        .collect()
}

/// Assemble the final timeline from a validation outcome.
pub fn build_timeline(
    outcome: ValidationOutcome,
    gaps: Vec<DataGap>,
    total_duration_secs: u32,
    config: &SynthesisConfig,
) -> Timeline {
    let phases = build_phases(&outcome.boundaries, total_duration_secs, config);
    let events = tag_events(&phases, outcome.events);
    let stats = compute_stats(&phases, &events, config);

    for phase in &phases {
        info!(
            phase = phase.name.as_str(),
            start_secs = phase.start_secs,
            end_secs = phase.end_secs,
            confidence = phase.confidence,
            degraded = phase.degraded,
            "Phase placed"
        );
    }

    Timeline {
        phases,
        events,
        boundaries: outcome
            .boundaries
            .into_iter()
            .map(BoundaryResolution::into_report)
            .collect(),
        gaps,
        stats,
        total_duration_secs,
    }
}
