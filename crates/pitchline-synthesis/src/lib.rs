//! Temporal synthesis of per-clip observations into a match timeline.
//!
//! The pipeline is pure and single-threaded:
//!
//! 1. [`store`] checks raw records and records data gaps
//! 2. [`extractor`] scores every clip against the [`rules`] catalog
//! 3. [`validator`] enforces boundary ordering, the halftime window, and
//!    merges repeatable events
//! 4. [`synthesizer`] lays out the five phases and tags events
//!
//! Running it twice on the same input produces identical output.

pub mod config;
pub mod error;
pub mod extractor;
pub mod metrics;
pub mod rules;
pub mod stats;
pub mod store;
pub mod synthesizer;
pub mod validator;

pub use config::SynthesisConfig;
pub use error::{SynthesisError, SynthesisResult};
pub use extractor::extract_candidates;
pub use rules::{default_catalog, match_score, SignalRule, RULE_CATALOG};
pub use store::ObservationStore;
pub use synthesizer::build_timeline;
pub use validator::{
    merge_repeatables, resolve_boundary, validate_candidates, BoundaryAccumulator,
    BoundaryResolution, ValidationOutcome,
};

use pitchline_models::{ObservationRecord, Timeline};
use tracing::info;

/// Run the full pipeline over a batch of records.
///
/// Fails only on invalid configuration, before any record is looked at.
pub fn synthesize_timeline(
    records: Vec<ObservationRecord>,
    config: &SynthesisConfig,
) -> SynthesisResult<Timeline> {
    config.validate()?;

    let record_count = records.len();
    let store = ObservationStore::from_records(records, config);
    let candidates = extract_candidates(store.observations(), default_catalog(), config);
    let total_duration_secs = store.total_duration_secs();
    let outcome = validate_candidates(candidates, config);
    let timeline = build_timeline(outcome, store.into_gaps(), total_duration_secs, config);

    info!(
        records = record_count,
        events = timeline.events.len(),
        gaps = timeline.gaps.len(),
        fully_resolved = timeline.is_fully_resolved(),
        "Timeline synthesized"
    );
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchline_models::tags;

    #[test]
    fn test_invalid_config_stops_before_work() {
        let config = SynthesisConfig::default().with_halftime_gap_secs(600, 500);
        let err = synthesize_timeline(vec![ObservationRecord::new(0, 0.9)], &config).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_empty_input_yields_empty_timeline() {
        let timeline = synthesize_timeline(vec![], &SynthesisConfig::default()).unwrap();
        assert_eq!(timeline.phases.len(), 5);
        assert_eq!(timeline.total_duration_secs, 0);
        assert!(timeline.events.is_empty());
        assert_eq!(timeline.boundaries.len(), 4);
    }

    #[test]
    fn test_gaps_reach_timeline() {
        let records = vec![
            ObservationRecord::new(0, 0.9).with_labels([tags::ACTIVE_PLAY]),
            ObservationRecord::new(2, 0.9).with_labels([tags::ACTIVE_PLAY]),
        ];
        let timeline = synthesize_timeline(records, &SynthesisConfig::default()).unwrap();
        assert_eq!(timeline.gaps.len(), 1);
        assert_eq!(timeline.total_duration_secs, 45);
    }
}
