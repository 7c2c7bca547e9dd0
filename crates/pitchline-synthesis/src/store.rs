//! Observation store.
//!
//! Turns unchecked per-clip records into an ordered list of immutable
//! [`ClipObservation`]s. Bad records never fail the run; each one becomes a
//! [`DataGap`] carried through to the timeline.

use std::collections::{BTreeMap, BTreeSet};

use pitchline_models::timestamp::MAX_VIDEO_DURATION_SECS;
use pitchline_models::{tags, ClipObservation, DataGap, GapReason, ObservationRecord};
use tracing::{debug, info, warn};

use crate::config::SynthesisConfig;
use crate::metrics;

/// Ordered, validated clip observations plus the gaps found on the way.
#[derive(Debug, Clone, Default)]
pub struct ObservationStore {
    observations: Vec<ClipObservation>,
    gaps: Vec<DataGap>,
    total_duration_secs: u32,
}

impl ObservationStore {
    /// Build the store from raw records.
    ///
    /// The first valid record for an index wins; later ones are
    /// `DuplicateClip` gaps. Runs of indices below the highest seen index
    /// with no record at all become one `MissingRecord` gap each. Records
    /// starting past [`MAX_VIDEO_DURATION_SECS`] are `OffsetOutOfRange` gaps
    /// and do not extend the covered duration.
    pub fn from_records(records: Vec<ObservationRecord>, config: &SynthesisConfig) -> Self {
        let clip_duration = config.clip_duration_secs.max(1);
        let mut accepted: BTreeMap<u32, ClipObservation> = BTreeMap::new();
        let mut seen: BTreeSet<u32> = BTreeSet::new();
        let mut gaps = Vec::new();

        for record in records {
            match check_record(record, clip_duration) {
                Ok(observation) => {
                    let index = observation.clip_index;
                    seen.insert(index);
                    if accepted.contains_key(&index) {
                        gaps.push(DataGap::new(Some(index), GapReason::DuplicateClip));
                    } else {
                        accepted.insert(index, observation);
                    }
                }
                Err(gap) => {
                    if let Some(index) = gap.clip_index {
                        if gap.reason != GapReason::OffsetOutOfRange {
                            seen.insert(index);
                        }
                    }
                    gaps.push(gap);
                }
            }
        }

        let max_index = seen.iter().next_back().copied();
        gaps.extend(missing_runs(&seen));
        // Stable: gaps for one index keep their arrival order
        gaps.sort_by_key(|g| g.clip_index);

        for gap in &gaps {
            warn!(
                clip_index = ?gap.clip_index,
                clip_count = gap.clip_count,
                reason = gap.reason.as_str(),
                "Skipping clip with unusable observation"
            );
            metrics::record_gap(gap);
        }

        let total_duration_secs = max_index
            .map(|m| (m + 1).saturating_mul(clip_duration))
            .unwrap_or(0);

        let observations: Vec<ClipObservation> = accepted.into_values().collect();
        metrics::record_clips_accepted(observations.len());
        info!(
            observations = observations.len(),
            gaps = gaps.len(),
            total_duration_secs,
            "Observation store loaded"
        );

        Self {
            observations,
            gaps,
            total_duration_secs,
        }
    }

    /// Observations ordered by clip index.
    pub fn observations(&self) -> &[ClipObservation] {
        &self.observations
    }

    /// Gaps ordered by clip index (index-less gaps first).
    pub fn gaps(&self) -> &[DataGap] {
        &self.gaps
    }

    /// Length of the video covered by the input.
    pub fn total_duration_secs(&self) -> u32 {
        self.total_duration_secs
    }

    /// Consume the store, keeping only its gaps.
    pub fn into_gaps(self) -> Vec<DataGap> {
        self.gaps
    }
}

/// One `MissingRecord` gap per run of absent indices below the highest seen.
fn missing_runs(seen: &BTreeSet<u32>) -> Vec<DataGap> {
    let mut runs = Vec::new();
    let mut next = 0u32;
    for &index in seen {
        if index > next {
            runs.push(DataGap::span(next, index - next, GapReason::MissingRecord));
        }
        next = index.saturating_add(1);
    }
    runs
}

fn resolve_index(record: &ObservationRecord, clip_duration: u32) -> Result<u32, DataGap> {
    let index = located_index(record, clip_duration)?;
    match index.checked_mul(clip_duration) {
        Some(start) if start <= MAX_VIDEO_DURATION_SECS => Ok(index),
        _ => Err(DataGap::new(Some(index), GapReason::OffsetOutOfRange)),
    }
}

fn located_index(record: &ObservationRecord, clip_duration: u32) -> Result<u32, DataGap> {
    match (record.clip_index, record.start_offset_secs) {
        (Some(index), Some(offset)) => {
            if index.checked_mul(clip_duration) == Some(offset) {
                Ok(index)
            } else {
                Err(DataGap::new(Some(index), GapReason::MisalignedOffset))
            }
        }
        (Some(index), None) => Ok(index),
        (None, Some(offset)) => {
            if offset % clip_duration == 0 {
                Ok(offset / clip_duration)
            } else {
                Err(DataGap::new(None, GapReason::MisalignedOffset))
            }
        }
        (None, None) => Err(DataGap::new(None, GapReason::MissingRecord)),
    }
}

fn check_record(record: ObservationRecord, clip_duration: u32) -> Result<ClipObservation, DataGap> {
    let clip_index = resolve_index(&record, clip_duration)?;

    let confidence = match record.confidence {
        Some(c) if c.is_finite() && (0.0..=1.0).contains(&c) => c,
        Some(_) => {
            return Err(DataGap::new(
                Some(clip_index),
                GapReason::ConfidenceOutOfRange,
            ))
        }
        // A describer failure leaves neither text nor confidence behind
        None if record.evidence_text.trim().is_empty() && record.labels.is_empty() => {
            return Err(DataGap::new(
                Some(clip_index),
                GapReason::UnreadableDescription,
            ))
        }
        None => return Err(DataGap::new(Some(clip_index), GapReason::MissingConfidence)),
    };

    let raw_labels: BTreeSet<String> = record
        .labels
        .iter()
        .map(|l| tags::normalize(l))
        .filter(|l| !l.is_empty())
        .collect();
    for label in raw_labels.iter().filter(|l| !tags::is_known(l)) {
        debug!(clip_index, label = %label, "Unrecognized tag kept as-is");
    }

    let contact_offset_secs = record
        .contact_offset_secs
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(|s| s.floor() as u32);

    let team = trimmed(record.team);

    Ok(ClipObservation {
        clip_index,
        start_offset_secs: clip_index * clip_duration,
        raw_labels,
        confidence,
        evidence_text: record.evidence_text.trim().to_string(),
        contact_offset_secs,
        team,
        possession_won_by: trimmed(record.possession_won_by),
    })
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(records: Vec<ObservationRecord>) -> ObservationStore {
        ObservationStore::from_records(records, &SynthesisConfig::default())
    }

    #[test]
    fn test_empty_input() {
        let s = store(vec![]);
        assert!(s.observations().is_empty());
        assert!(s.gaps().is_empty());
        assert_eq!(s.total_duration_secs(), 0);
    }

    #[test]
    fn test_orders_by_index_and_derives_offset() {
        let s = store(vec![
            ObservationRecord::new(2, 0.7),
            ObservationRecord::new(0, 0.9),
            ObservationRecord::new(1, 0.8),
        ]);
        let indices: Vec<u32> = s.observations().iter().map(|o| o.clip_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(s.observations()[2].start_offset_secs, 30);
        assert_eq!(s.total_duration_secs(), 45);
    }

    #[test]
    fn test_offset_only_record() {
        let s = store(vec![ObservationRecord::at_offset(45).with_confidence(0.6)]);
        assert_eq!(s.observations()[0].clip_index, 3);
        // Indices 0..3 never arrived
        assert_eq!(
            s.gaps(),
            &[DataGap::span(0, 3, GapReason::MissingRecord)]
        );
        assert_eq!(s.total_duration_secs(), 60);
    }

    #[test]
    fn test_misaligned_offset() {
        let s = store(vec![
            ObservationRecord::at_offset(20).with_confidence(0.6),
            ObservationRecord {
                start_offset_secs: Some(30),
                ..ObservationRecord::new(0, 0.6)
            },
        ]);
        assert!(s.observations().is_empty());
        assert_eq!(s.gaps().len(), 2);
        assert_eq!(s.gaps()[0], DataGap::new(None, GapReason::MisalignedOffset));
        assert_eq!(
            s.gaps()[1],
            DataGap::new(Some(0), GapReason::MisalignedOffset)
        );
    }

    #[test]
    fn test_bad_confidence_is_a_gap() {
        let s = store(vec![
            ObservationRecord::new(0, 0.9),
            ObservationRecord::new(1, f64::NAN),
            ObservationRecord::new(2, 1.2),
            ObservationRecord {
                clip_index: Some(3),
                evidence_text: "players warming up".into(),
                ..ObservationRecord::default()
            },
            ObservationRecord {
                clip_index: Some(4),
                ..ObservationRecord::default()
            },
        ]);
        assert_eq!(s.observations().len(), 1);
        let reasons: Vec<GapReason> = s.gaps().iter().map(|g| g.reason).collect();
        assert_eq!(
            reasons,
            vec![
                GapReason::ConfidenceOutOfRange,
                GapReason::ConfidenceOutOfRange,
                GapReason::MissingConfidence,
                GapReason::UnreadableDescription,
            ]
        );
        // Gapped records still extend the covered duration
        assert_eq!(s.total_duration_secs(), 75);
    }

    #[test]
    fn test_duplicate_first_wins() {
        let s = store(vec![
            ObservationRecord::new(0, 0.9).with_evidence("first"),
            ObservationRecord::new(0, 0.4).with_evidence("second"),
        ]);
        assert_eq!(s.observations().len(), 1);
        assert_eq!(s.observations()[0].evidence_text, "first");
        assert_eq!(s.gaps(), &[DataGap::new(Some(0), GapReason::DuplicateClip)]);
    }

    #[test]
    fn test_labels_normalized_and_contact_floored() {
        let s = store(vec![ObservationRecord::new(0, 0.9)
            .with_labels(["Ball Out Of Play", "goalkeeper-ground-ball", "  "])
            .with_contact_offset(7.8)
            .with_team("  Team A ")
            .with_possession(" Team B ")]);
        let obs = &s.observations()[0];
        assert!(obs.has_label(tags::BALL_OUT_OF_PLAY));
        assert!(obs.has_label(tags::GOALKEEPER_GROUND_BALL));
        assert_eq!(obs.raw_labels.len(), 2);
        assert_eq!(obs.contact_offset_secs, Some(7));
        assert_eq!(obs.team.as_deref(), Some("Team A"));
        assert_eq!(obs.possession_won_by.as_deref(), Some("Team B"));
    }

    #[test]
    fn test_record_without_location() {
        let s = store(vec![ObservationRecord {
            confidence: Some(0.5),
            ..ObservationRecord::default()
        }]);
        assert_eq!(s.gaps(), &[DataGap::new(None, GapReason::MissingRecord)]);
        assert_eq!(s.total_duration_secs(), 0);
    }

    #[test]
    fn test_missing_indices_collapse_into_runs() {
        let s = store(vec![
            ObservationRecord::new(0, 0.9),
            ObservationRecord::new(4, 0.9),
            ObservationRecord::new(6, 0.9),
        ]);
        assert_eq!(
            s.gaps(),
            &[
                DataGap::span(1, 3, GapReason::MissingRecord),
                DataGap::span(5, 1, GapReason::MissingRecord),
            ]
        );
        assert_eq!(s.total_duration_secs(), 105);
    }

    #[test]
    fn test_index_past_longest_video_is_rejected() {
        let s = store(vec![
            ObservationRecord::new(0, 0.9),
            ObservationRecord::new(2_000_000, 0.9),
            ObservationRecord::at_offset(MAX_VIDEO_DURATION_SECS + 15).with_confidence(0.9),
        ]);
        assert_eq!(s.observations().len(), 1);
        assert_eq!(
            s.gaps(),
            &[
                DataGap::new(Some(5_761), GapReason::OffsetOutOfRange),
                DataGap::new(Some(2_000_000), GapReason::OffsetOutOfRange),
            ]
        );
        // Out-of-range records neither stretch the video nor open a gap run
        assert_eq!(s.total_duration_secs(), 15);
    }

    #[test]
    fn test_last_supported_clip_is_accepted() {
        let last = MAX_VIDEO_DURATION_SECS / 15;
        let s = store(vec![ObservationRecord::new(last, 0.9)]);
        assert_eq!(s.observations().len(), 1);
        assert_eq!(
            s.gaps(),
            &[DataGap::span(0, last, GapReason::MissingRecord)]
        );
    }
}
