//! Temporal consistency validation.
//!
//! Boundaries are settled one kind at a time in chronological order. Each
//! step reads what earlier steps accepted from a [`BoundaryAccumulator`]
//! and appends its own resolution; nothing is revisited. Repeatable kinds
//! are deduplicated separately.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use pitchline_models::{BoundaryReport, BoundaryStatus, CandidateEvent, EventKind};
use tracing::{debug, info, warn};

use crate::config::SynthesisConfig;
use crate::metrics;

/// Separator between merged evidence texts.
pub const EVIDENCE_SEPARATOR: &str = " | ";

/// How one boundary kind was settled.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryResolution {
    pub kind: EventKind,
    pub status: BoundaryStatus,

    /// Accepted candidate, with any window penalty already applied
    pub event: Option<CandidateEvent>,

    /// Candidates of this kind that were not accepted
    pub rejected: usize,
}

impl BoundaryResolution {
    fn unresolved(kind: EventKind, rejected: usize) -> Self {
        Self {
            kind,
            status: BoundaryStatus::Unresolved,
            event: None,
            rejected,
        }
    }

    /// Timestamp of the accepted candidate.
    pub fn timestamp_secs(&self) -> Option<u32> {
        self.event.as_ref().map(|e| e.timestamp_secs)
    }

    /// Convert into the report stored on the timeline.
    pub fn into_report(self) -> BoundaryReport {
        BoundaryReport {
            kind: self.kind,
            status: self.status,
            event: self.event,
        }
    }
}

/// Boundaries accepted so far in a validation pass.
#[derive(Debug, Clone, Default)]
pub struct BoundaryAccumulator {
    resolutions: Vec<BoundaryResolution>,
}

impl BoundaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest timestamp among accepted boundaries.
    pub fn latest_timestamp(&self) -> Option<u32> {
        self.resolutions
            .iter()
            .filter_map(BoundaryResolution::timestamp_secs)
            .max()
    }

    /// Resolution for a kind, if already processed.
    pub fn get(&self, kind: EventKind) -> Option<&BoundaryResolution> {
        kind.boundary_index()
            .and_then(|i| self.resolutions.get(i))
            .filter(|r| r.kind == kind)
    }

    /// Record the resolution of the next kind.
    ///
    /// Resolutions arrive in [`EventKind::BOUNDARY_ORDER`].
    pub fn push(&mut self, resolution: BoundaryResolution) {
        debug_assert_eq!(
            resolution.kind.boundary_index(),
            Some(self.resolutions.len()),
            "boundary resolved out of order"
        );
        self.resolutions.push(resolution);
    }

    pub fn into_resolutions(self) -> Vec<BoundaryResolution> {
        self.resolutions
    }
}

/// Result of a validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// One entry per boundary kind, in chronological kind order
    pub boundaries: Vec<BoundaryResolution>,

    /// Deduplicated repeatable events sorted by timestamp
    pub events: Vec<CandidateEvent>,

    /// Boundary candidates that were not accepted
    pub rejected: usize,

    /// Repeatable candidates absorbed into a neighbour
    pub merged: usize,
}

/// Ranking: higher confidence, then earlier timestamp, then lower clip index.
fn rank(a: &CandidateEvent, b: &CandidateEvent) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.timestamp_secs.cmp(&b.timestamp_secs))
        .then_with(|| a.first_clip_index().cmp(&b.first_clip_index()))
}

fn best<'a>(candidates: impl IntoIterator<Item = &'a CandidateEvent>) -> Option<&'a CandidateEvent> {
    candidates.into_iter().min_by(|a, b| rank(a, b))
}

/// Where a second-half throw-in sits relative to the halftime window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowFit {
    Inside,
    TooShort,
    TooLong,
}

fn halftime_fit(first_half_end: u32, candidate: u32, config: &SynthesisConfig) -> WindowFit {
    let gap = candidate.saturating_sub(first_half_end);
    if gap < config.min_halftime_gap_secs {
        WindowFit::TooShort
    } else if gap > config.max_halftime_gap_secs {
        WindowFit::TooLong
    } else {
        WindowFit::Inside
    }
}

fn half_fits(start: u32, end: u32, config: &SynthesisConfig) -> bool {
    end > start && (config.min_half_secs..=config.max_half_secs).contains(&(end - start))
}

/// Narrow `ordered` to candidates that make a half of plausible length.
///
/// A match start is checked against every first-half-end candidate still
/// to come; a half end against the accepted start of its half. When
/// nothing fits, or there is nothing to measure against, `ordered` is
/// returned unchanged.
fn prefer_plausible_halves<'a>(
    kind: EventKind,
    ordered: Vec<&'a CandidateEvent>,
    candidates: &'a [CandidateEvent],
    accumulator: &BoundaryAccumulator,
    config: &SynthesisConfig,
) -> Vec<&'a CandidateEvent> {
    let accepted = |k: EventKind| accumulator.get(k).and_then(BoundaryResolution::timestamp_secs);

    let plausible: Vec<&CandidateEvent> = match kind {
        EventKind::MatchStart => ordered
            .iter()
            .copied()
            .filter(|start| {
                candidates.iter().any(|end| {
                    end.kind == EventKind::FirstHalfEnd
                        && half_fits(start.timestamp_secs, end.timestamp_secs, config)
                })
            })
            .collect(),
        EventKind::FirstHalfEnd | EventKind::MatchEnd => {
            let start_kind = if kind == EventKind::FirstHalfEnd {
                EventKind::MatchStart
            } else {
                EventKind::SecondHalfStart
            };
            let Some(start) = accepted(start_kind) else {
                return ordered;
            };
            ordered
                .iter()
                .copied()
                .filter(|end| half_fits(start, end.timestamp_secs, config))
                .collect()
        }
        _ => return ordered,
    };

    if plausible.is_empty() {
        return ordered;
    }
    if plausible.len() < ordered.len() {
        debug!(
            kind = ?kind,
            kept = plausible.len(),
            passed_over = ordered.len() - plausible.len(),
            "Preferring candidates with a plausible half length"
        );
    }
    plausible
}

/// Settle one boundary kind against the boundaries accepted before it.
///
/// `candidates` may contain any kinds; only `kind` is considered.
pub fn resolve_boundary(
    kind: EventKind,
    candidates: &[CandidateEvent],
    accumulator: &BoundaryAccumulator,
    config: &SynthesisConfig,
) -> BoundaryResolution {
    let of_kind: Vec<&CandidateEvent> = candidates.iter().filter(|c| c.kind == kind).collect();
    let total = of_kind.len();
    let after = accumulator.latest_timestamp();

    let ordered: Vec<&CandidateEvent> = of_kind
        .into_iter()
        .filter(|c| after.map_or(true, |t| c.timestamp_secs > t))
        .collect();
    let ordered = prefer_plausible_halves(kind, ordered, candidates, accumulator, config);

    let halftime_anchor = match kind {
        EventKind::SecondHalfStart => accumulator
            .get(EventKind::FirstHalfEnd)
            .and_then(BoundaryResolution::timestamp_secs),
        _ => None,
    };

    let (chosen, status) = match halftime_anchor {
        None => (best(ordered.iter().copied()), BoundaryStatus::Resolved),
        Some(anchor) => {
            let fits: Vec<(&CandidateEvent, WindowFit)> = ordered
                .iter()
                .map(|c| (*c, halftime_fit(anchor, c.timestamp_secs, config)))
                .collect();
            for (c, fit) in &fits {
                if *fit == WindowFit::TooShort {
                    debug!(
                        timestamp_secs = c.timestamp_secs,
                        first_half_end_secs = anchor,
                        "Second-half start too close to first-half end"
                    );
                }
            }
            let inside = best(
                fits.iter()
                    .filter(|(_, f)| *f == WindowFit::Inside)
                    .map(|(c, _)| *c),
            );
            match inside {
                Some(c) => (Some(c), BoundaryStatus::Resolved),
                None => (
                    best(
                        fits.iter()
                            .filter(|(_, f)| *f == WindowFit::TooLong)
                            .map(|(c, _)| *c),
                    ),
                    BoundaryStatus::Degraded,
                ),
            }
        }
    };

    match chosen {
        Some(candidate) => {
            let mut event = candidate.clone();
            if status == BoundaryStatus::Degraded {
                event.confidence = (event.confidence * config.out_of_window_penalty).clamp(0.0, 1.0);
                warn!(
                    kind = ?kind,
                    timestamp_secs = event.timestamp_secs,
                    "Boundary accepted outside the halftime window"
                );
            } else {
                debug!(
                    kind = ?kind,
                    timestamp_secs = event.timestamp_secs,
                    confidence = event.confidence,
                    "Boundary resolved"
                );
            }
            BoundaryResolution {
                kind,
                status,
                event: Some(event),
                rejected: total - 1,
            }
        }
        None => {
            warn!(
                kind = ?kind,
                candidates = total,
                after_secs = ?after,
                "Boundary unresolved"
            );
            BoundaryResolution::unresolved(kind, total)
        }
    }
}

/// Sort key making merge input order irrelevant.
fn merge_order(a: &CandidateEvent, b: &CandidateEvent) -> Ordering {
    a.timestamp_secs
        .cmp(&b.timestamp_secs)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.first_clip_index().cmp(&b.first_clip_index()))
        .then_with(|| a.evidence.cmp(&b.evidence))
        .then_with(|| a.team.cmp(&b.team))
        .then_with(|| a.possession_won_by.cmp(&b.possession_won_by))
}

fn collapse(cluster: Vec<CandidateEvent>) -> Option<CandidateEvent> {
    let mut best_idx = 0;
    for (i, c) in cluster.iter().enumerate().skip(1) {
        if c.confidence > cluster[best_idx].confidence {
            best_idx = i;
        }
    }

    let evidence = cluster
        .iter()
        .map(|c| c.evidence.trim())
        .filter(|e| !e.is_empty())
        .collect::<Vec<_>>()
        .join(EVIDENCE_SEPARATOR);
    let clips: BTreeSet<u32> = cluster
        .iter()
        .flat_map(|c| c.source_clip_indices.iter().copied())
        .collect();

    let mut merged = cluster.into_iter().nth(best_idx)?;
    merged.evidence = evidence;
    merged.source_clip_indices = clips.into_iter().collect();
    Some(merged)
}

/// Collapse candidates of one repeatable kind that fall within the merge
/// window of a cluster's first member.
pub fn merge_repeatables(mut candidates: Vec<CandidateEvent>, window_secs: u32) -> Vec<CandidateEvent> {
    candidates.sort_by(merge_order);

    let mut merged = Vec::new();
    let mut cluster: Vec<CandidateEvent> = Vec::new();

    for candidate in candidates {
        let joins = cluster
            .first()
            .map_or(false, |first| candidate.timestamp_secs - first.timestamp_secs <= window_secs);
        if !joins && !cluster.is_empty() {
            merged.extend(collapse(std::mem::take(&mut cluster)));
        }
        cluster.push(candidate);
    }
    if !cluster.is_empty() {
        merged.extend(collapse(cluster));
    }

    merged
}

/// Reduce raw candidates to one resolution per boundary kind plus
/// deduplicated repeatable events.
pub fn validate_candidates(candidates: Vec<CandidateEvent>, config: &SynthesisConfig) -> ValidationOutcome {
    let (boundary, repeatable): (Vec<CandidateEvent>, Vec<CandidateEvent>) =
        candidates.into_iter().partition(|c| c.kind.is_boundary());

    let mut accumulator = BoundaryAccumulator::new();
    for kind in EventKind::BOUNDARY_ORDER {
        let resolution = resolve_boundary(kind, &boundary, &accumulator, config);
        metrics::record_boundary(kind, resolution.status);
        accumulator.push(resolution);
    }
    let boundaries = accumulator.into_resolutions();
    let rejected = boundaries.iter().map(|b| b.rejected).sum();

    let mut by_kind: BTreeMap<EventKind, Vec<CandidateEvent>> = BTreeMap::new();
    for candidate in repeatable {
        by_kind.entry(candidate.kind).or_default().push(candidate);
    }

    let mut events = Vec::new();
    let mut merged = 0;
    for (kind, group) in by_kind {
        let before = group.len();
        let deduped = merge_repeatables(group, config.merge_window_secs);
        let absorbed = before - deduped.len();
        metrics::record_merged(kind, absorbed);
        merged += absorbed;
        events.extend(deduped);
    }
    events.sort_by(|a, b| {
        a.timestamp_secs
            .cmp(&b.timestamp_secs)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.first_clip_index().cmp(&b.first_clip_index()))
    });

    info!(
        resolved = boundaries
            .iter()
            .filter(|b| b.status != BoundaryStatus::Unresolved)
            .count(),
        rejected,
        events = events.len(),
        merged,
        "Validation complete"
    );

    ValidationOutcome {
        boundaries,
        events,
        rejected,
        merged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(kind: EventKind, ts: u32, conf: f64, clip: u32) -> CandidateEvent {
        CandidateEvent::new(kind, ts, conf, clip, format!("clip {clip}"))
    }

    fn kickout(ts: u32, conf: f64, clip: u32, evidence: &str) -> CandidateEvent {
        CandidateEvent::new(EventKind::Kickout, ts, conf, clip, evidence)
    }

    #[test]
    fn test_picks_highest_confidence_then_earliest() {
        let candidates = vec![
            candidate(EventKind::MatchStart, 300, 0.7, 20),
            candidate(EventKind::MatchStart, 15, 0.9, 1),
            candidate(EventKind::MatchStart, 45, 0.9, 3),
        ];
        let r = resolve_boundary(
            EventKind::MatchStart,
            &candidates,
            &BoundaryAccumulator::new(),
            &SynthesisConfig::default(),
        );
        assert_eq!(r.status, BoundaryStatus::Resolved);
        assert_eq!(r.timestamp_secs(), Some(15));
        assert_eq!(r.rejected, 2);
    }

    #[test]
    fn test_ordering_excludes_earlier_candidates() {
        let mut acc = BoundaryAccumulator::new();
        acc.push(BoundaryResolution {
            kind: EventKind::MatchStart,
            status: BoundaryStatus::Resolved,
            event: Some(candidate(EventKind::MatchStart, 600, 0.9, 40)),
            rejected: 0,
        });
        let candidates = vec![
            candidate(EventKind::FirstHalfEnd, 600, 1.0, 40),
            candidate(EventKind::FirstHalfEnd, 300, 1.0, 20),
        ];
        let r = resolve_boundary(
            EventKind::FirstHalfEnd,
            &candidates,
            &acc,
            &SynthesisConfig::default(),
        );
        assert_eq!(r.status, BoundaryStatus::Unresolved);
        assert!(r.event.is_none());
        assert_eq!(r.rejected, 2);
    }

    #[test]
    fn test_halftime_too_short_rejected_later_chosen() {
        let candidates = vec![
            candidate(EventKind::FirstHalfEnd, 1980, 0.9, 132),
            candidate(EventKind::SecondHalfStart, 2050, 0.95, 136),
            candidate(EventKind::SecondHalfStart, 2700, 0.7, 180),
        ];
        let outcome = validate_candidates(candidates, &SynthesisConfig::default());
        let second = &outcome.boundaries[2];
        assert_eq!(second.kind, EventKind::SecondHalfStart);
        assert_eq!(second.status, BoundaryStatus::Resolved);
        assert_eq!(second.timestamp_secs(), Some(2700));
    }

    #[test]
    fn test_halftime_too_long_is_degraded() {
        let candidates = vec![
            candidate(EventKind::FirstHalfEnd, 1980, 0.9, 132),
            candidate(EventKind::SecondHalfStart, 4200, 0.8, 280),
        ];
        let outcome = validate_candidates(candidates, &SynthesisConfig::default());
        let second = &outcome.boundaries[2];
        assert_eq!(second.status, BoundaryStatus::Degraded);
        let conf = second.event.as_ref().unwrap().confidence;
        assert!((conf - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_in_window_beats_out_of_window() {
        let candidates = vec![
            candidate(EventKind::FirstHalfEnd, 1980, 0.9, 132),
            candidate(EventKind::SecondHalfStart, 4200, 1.0, 280),
            candidate(EventKind::SecondHalfStart, 2700, 0.6, 180),
        ];
        let outcome = validate_candidates(candidates, &SynthesisConfig::default());
        assert_eq!(outcome.boundaries[2].timestamp_secs(), Some(2700));
        assert_eq!(outcome.boundaries[2].status, BoundaryStatus::Resolved);
    }

    #[test]
    fn test_match_start_waits_for_plausible_first_half() {
        // A second-half throw-in outscoring the real one must not open the match
        let candidates = vec![
            candidate(EventKind::MatchStart, 60, 0.8, 4),
            candidate(EventKind::MatchStart, 3060, 0.9, 204),
            candidate(EventKind::SecondHalfStart, 60, 0.8, 4),
            candidate(EventKind::SecondHalfStart, 3060, 0.9, 204),
            candidate(EventKind::FirstHalfEnd, 2160, 0.85, 144),
            candidate(EventKind::MatchEnd, 5250, 0.9, 350),
        ];
        let outcome = validate_candidates(candidates, &SynthesisConfig::default());
        let times: Vec<Option<u32>> = outcome.boundaries.iter().map(|b| b.timestamp_secs()).collect();
        assert_eq!(times, vec![Some(60), Some(2160), Some(3060), Some(5250)]);
        assert!(outcome
            .boundaries
            .iter()
            .all(|b| b.status == BoundaryStatus::Resolved));
    }

    #[test]
    fn test_implausible_half_used_when_nothing_fits() {
        // 300s is far too short for a half, but it is the only pairing
        let candidates = vec![
            candidate(EventKind::MatchStart, 60, 0.8, 4),
            candidate(EventKind::FirstHalfEnd, 360, 0.9, 24),
        ];
        let outcome = validate_candidates(candidates, &SynthesisConfig::default());
        assert_eq!(outcome.boundaries[0].timestamp_secs(), Some(60));
        assert_eq!(outcome.boundaries[1].timestamp_secs(), Some(360));
    }

    #[test]
    fn test_half_end_prefers_plausible_length() {
        let mut acc = BoundaryAccumulator::new();
        acc.push(BoundaryResolution {
            kind: EventKind::MatchStart,
            status: BoundaryStatus::Resolved,
            event: Some(candidate(EventKind::MatchStart, 60, 0.9, 4)),
            rejected: 0,
        });
        let candidates = vec![
            candidate(EventKind::FirstHalfEnd, 400, 0.95, 26),
            candidate(EventKind::FirstHalfEnd, 2160, 0.7, 144),
        ];
        let r = resolve_boundary(
            EventKind::FirstHalfEnd,
            &candidates,
            &acc,
            &SynthesisConfig::default(),
        );
        assert_eq!(r.timestamp_secs(), Some(2160));
        assert_eq!(r.rejected, 1);
    }

    #[test]
    fn test_accumulator_lookup_by_kind() {
        let mut acc = BoundaryAccumulator::new();
        assert!(acc.get(EventKind::MatchStart).is_none());
        acc.push(BoundaryResolution::unresolved(EventKind::MatchStart, 0));
        acc.push(BoundaryResolution {
            kind: EventKind::FirstHalfEnd,
            status: BoundaryStatus::Resolved,
            event: Some(candidate(EventKind::FirstHalfEnd, 2160, 0.9, 144)),
            rejected: 0,
        });
        assert_eq!(
            acc.get(EventKind::FirstHalfEnd).and_then(BoundaryResolution::timestamp_secs),
            Some(2160)
        );
        assert!(acc.get(EventKind::SecondHalfStart).is_none());
        assert!(acc.get(EventKind::Kickout).is_none());
        assert_eq!(acc.latest_timestamp(), Some(2160));
    }

    #[test]
    fn test_merge_keeps_best_member() {
        let merged = merge_repeatables(
            vec![kickout(112, 0.8, 7, "second"), kickout(100, 0.6, 6, "first")],
            30,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].timestamp_secs, 112);
        assert!((merged[0].confidence - 0.8).abs() < 1e-12);
        assert_eq!(merged[0].evidence, "first | second");
        assert_eq!(merged[0].source_clip_indices, vec![6, 7]);
    }

    #[test]
    fn test_merge_window_measured_from_cluster_start() {
        let merged = merge_repeatables(
            vec![
                kickout(100, 0.6, 6, "a"),
                kickout(125, 0.6, 8, "b"),
                kickout(150, 0.6, 10, "c"),
            ],
            30,
        );
        let times: Vec<u32> = merged.iter().map(|e| e.timestamp_secs).collect();
        assert_eq!(times, vec![100, 150]);
    }

    #[test]
    fn test_merge_window_is_inclusive() {
        let merged = merge_repeatables(vec![kickout(100, 0.6, 6, "a"), kickout(130, 0.6, 8, "b")], 30);
        assert_eq!(merged.len(), 1);
        // Equal confidence keeps the earlier member
        assert_eq!(merged[0].timestamp_secs, 100);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = vec![
            kickout(100, 0.6, 6, "a"),
            kickout(112, 0.8, 7, "b"),
            kickout(400, 0.7, 26, "c"),
        ];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(merge_repeatables(a, 30), merge_repeatables(b, 30));
    }

    #[test]
    fn test_validate_counts_and_sorts_events() {
        let candidates = vec![
            CandidateEvent::new(EventKind::ScoringAttempt, 500, 0.9, 33, "point"),
            kickout(112, 0.8, 7, "b"),
            kickout(100, 0.6, 6, "a"),
            candidate(EventKind::MatchStart, 15, 0.9, 1),
        ];
        let outcome = validate_candidates(candidates, &SynthesisConfig::default());
        assert_eq!(outcome.boundaries.len(), 4);
        assert_eq!(outcome.events.len(), 2);
        assert_eq!(outcome.events[0].kind, EventKind::Kickout);
        assert_eq!(outcome.events[1].kind, EventKind::ScoringAttempt);
        assert_eq!(outcome.merged, 1);
        assert_eq!(outcome.rejected, 0);
    }
}
