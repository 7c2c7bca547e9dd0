//! Event candidate extraction.
//!
//! Every observation is scored against every rule. The output may overlap
//! and contradict itself; the validator sorts that out.

use pitchline_models::{CandidateEvent, ClipObservation};
use tracing::{debug, info};

use crate::config::SynthesisConfig;
use crate::metrics;
use crate::rules::SignalRule;

/// Extract raw candidates from ordered observations.
///
/// Pure: the result depends only on the arguments, and empty input yields
/// an empty list.
pub fn extract_candidates(
    observations: &[ClipObservation],
    catalog: &[SignalRule],
    config: &SynthesisConfig,
) -> Vec<CandidateEvent> {
    let mut candidates = Vec::new();

    for observation in observations {
        for rule in catalog {
            let score = rule.score(observation);
            if score == 0.0 {
                continue;
            }
            let confidence = (score * observation.confidence).clamp(0.0, 1.0);
            if confidence < config.min_candidate_confidence {
                debug!(
                    clip_index = observation.clip_index,
                    kind = ?rule.kind,
                    confidence,
                    "Candidate below threshold"
                );
                continue;
            }

            let timestamp_secs = candidate_timestamp(observation, rule, config);
            let mut candidate = CandidateEvent::new(
                rule.kind,
                timestamp_secs,
                confidence,
                observation.clip_index,
                observation.evidence_text.trim(),
            );
            candidate.team = observation.team.clone();
            candidate.possession_won_by = observation.possession_won_by.clone();

            debug!(
                clip_index = observation.clip_index,
                kind = ?rule.kind,
                timestamp_secs,
                confidence,
                "Candidate emitted"
            );
            metrics::record_candidate(rule.kind);
            candidates.push(candidate);
        }
    }

    info!(
        observations = observations.len(),
        candidates = candidates.len(),
        "Candidate extraction complete"
    );
    candidates
}

/// Boundaries are stamped at clip start; restarts at the contact moment.
fn candidate_timestamp(
    observation: &ClipObservation,
    rule: &SignalRule,
    config: &SynthesisConfig,
) -> u32 {
    if rule.kind.is_boundary() {
        return observation.start_offset_secs;
    }
    let offset = observation
        .contact_offset_secs
        .unwrap_or(0)
        .min(config.clip_duration_secs.saturating_sub(1));
    observation.start_offset_secs.saturating_add(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RULE_CATALOG;
    use pitchline_models::{tags, EventKind};

    fn observation(index: u32, confidence: f64, labels: &[&str]) -> ClipObservation {
        ClipObservation {
            clip_index: index,
            start_offset_secs: index * 15,
            raw_labels: labels.iter().map(|s| s.to_string()).collect(),
            confidence,
            evidence_text: format!("  clip {index} "),
            contact_offset_secs: None,
            team: None,
            possession_won_by: None,
        }
    }

    #[test]
    fn test_empty_input() {
        let out = extract_candidates(&[], RULE_CATALOG, &SynthesisConfig::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_ceremony_yields_both_throw_in_kinds() {
        let obs = observation(1, 0.9, &[tags::THROW_IN_CEREMONY, tags::TWO_PLAYER_CONTEST]);
        let out = extract_candidates(&[obs], RULE_CATALOG, &SynthesisConfig::default());
        let kinds: Vec<EventKind> = out.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![EventKind::MatchStart, EventKind::SecondHalfStart]);
        assert_eq!(out[0].timestamp_secs, 15);
        assert!((out[0].confidence - 0.9).abs() < 1e-12);
        assert_eq!(out[0].evidence, "clip 1");
        assert_eq!(out[0].source_clip_indices, vec![1]);
    }

    #[test]
    fn test_partial_match_below_threshold_dropped() {
        // 2/3 * 0.8 * 0.9 = 0.48
        let obs = observation(
            4,
            0.9,
            &[tags::BALL_OUT_OF_PLAY, tags::GOALKEEPER_GROUND_BALL],
        );
        let out = extract_candidates(&[obs.clone()], RULE_CATALOG, &SynthesisConfig::default());
        assert!(out.is_empty());

        let lenient = SynthesisConfig::default().with_min_candidate_confidence(0.4);
        let out = extract_candidates(&[obs], RULE_CATALOG, &lenient);
        assert_eq!(out.len(), 1);
        assert!((out[0].confidence - 0.48).abs() < 1e-9);
    }

    #[test]
    fn test_kickout_uses_contact_offset() {
        let mut obs = observation(
            6,
            0.8,
            &[
                tags::BALL_OUT_OF_PLAY,
                tags::GOALKEEPER_GROUND_BALL,
                tags::STATIONARY_BALL,
            ],
        );
        obs.contact_offset_secs = Some(22);
        obs.team = Some("Team B".into());
        obs.possession_won_by = Some("Team A".into());
        let out = extract_candidates(&[obs], RULE_CATALOG, &SynthesisConfig::default());
        assert_eq!(out.len(), 1);
        // 90 + min(22, 14)
        assert_eq!(out[0].timestamp_secs, 104);
        assert_eq!(out[0].team.as_deref(), Some("Team B"));
        assert_eq!(out[0].possession_won_by.as_deref(), Some("Team A"));
        assert_eq!(out[0].retained_possession(), Some(false));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let observations = vec![
            observation(0, 0.9, &[tags::THROW_IN_CEREMONY, tags::TWO_PLAYER_CONTEST]),
            observation(1, 0.7, &[tags::SHOT_AT_GOAL, tags::UMPIRE_SIGNAL]),
        ];
        let config = SynthesisConfig::default();
        let a = extract_candidates(&observations, RULE_CATALOG, &config);
        let b = extract_candidates(&observations, RULE_CATALOG, &config);
        assert_eq!(a, b);
    }
}
