//! Configuration for timeline synthesis.
//!
//! The thresholds here are empirically tuned per competition and camera
//! setup, so none of them are hardcoded in the engine. The defaults fit
//! 15-second clips of a GAA match.

use serde::{Deserialize, Serialize};

use crate::error::{SynthesisError, SynthesisResult};

/// Configuration for the synthesis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Length of every input clip (seconds).
    pub clip_duration_secs: u32,

    /// Shortest plausible halftime break (seconds).
    ///
    /// A second-half throw-in closer than this to the first-half whistle is
    /// rejected outright.
    pub min_halftime_gap_secs: u32,

    /// Longest plausible halftime break (seconds).
    ///
    /// A second-half throw-in further away than this is only accepted when
    /// nothing inside the window exists, and is marked degraded.
    pub max_halftime_gap_secs: u32,

    /// Shortest plausible half, throw-in to whistle (seconds).
    pub min_half_secs: u32,

    /// Longest plausible half, throw-in to whistle (seconds).
    ///
    /// Boundary pairs spanning a half outside `[min_half_secs, max_half_secs]`
    /// are passed over in favour of a pair that fits, when one exists.
    pub max_half_secs: u32,

    /// Repeatable events of one kind closer than this collapse into one (seconds).
    pub merge_window_secs: u32,

    /// Candidates scoring below this are never emitted (0.0-1.0).
    pub min_candidate_confidence: f64,

    /// Confidence multiplier for a boundary accepted outside the halftime window.
    pub out_of_window_penalty: f64,

    /// Confidence multiplier for a phase with an unresolved defining boundary.
    pub unresolved_phase_factor: f64,

    /// Kickouts closer than this belong to the same pressure period (seconds).
    pub pressure_gap_secs: u32,

    /// Minimum kickouts in a run before it counts as a pressure period.
    pub pressure_min_events: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            clip_duration_secs: 15,
            min_halftime_gap_secs: 600,
            max_halftime_gap_secs: 1800,
            min_half_secs: 900,
            max_half_secs: 2700,
            merge_window_secs: 30,
            min_candidate_confidence: 0.5,
            out_of_window_penalty: 0.5,
            unresolved_phase_factor: 0.5,
            pressure_gap_secs: 120,
            pressure_min_events: 3,
        }
    }
}

fn env_or<T: std::str::FromStr>(
    name: &'static str,
    field: &'static str,
    default: T,
) -> SynthesisResult<T> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            SynthesisError::invalid_config(field, format!("{name}={raw:?} is not a valid value"))
        }),
        Err(_) => Ok(default),
    }
}

/// First known key whose value alone fails to deserialize.
fn offending_field(doc: &serde_json::Value) -> Option<&'static str> {
    let object = doc.as_object()?;
    SynthesisConfig::FIELDS.into_iter().find(|field| {
        object.get(*field).is_some_and(|value| {
            let mut single = serde_json::Map::new();
            single.insert((*field).to_string(), value.clone());
            serde_json::from_value::<SynthesisConfig>(serde_json::Value::Object(single)).is_err()
        })
    })
}

fn check_unit(field: &'static str, value: f64) -> SynthesisResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(SynthesisError::invalid_config(
            field,
            format!("must be within [0, 1], got {value}"),
        ));
    }
    Ok(())
}

impl SynthesisConfig {
    /// Every configuration key.
    pub const FIELDS: [&'static str; 11] = [
        "clip_duration_secs",
        "min_halftime_gap_secs",
        "max_halftime_gap_secs",
        "min_half_secs",
        "max_half_secs",
        "merge_window_secs",
        "min_candidate_confidence",
        "out_of_window_penalty",
        "unresolved_phase_factor",
        "pressure_gap_secs",
        "pressure_min_events",
    ];

    /// Create config from environment variables, falling back to defaults
    /// for unset variables.
    ///
    /// A variable that is set but unparsable (for example a negative clip
    /// duration) is an error rather than a silent fallback.
    pub fn from_env() -> SynthesisResult<Self> {
        let d = Self::default();
        Ok(Self {
            clip_duration_secs: env_or(
                "PITCHLINE_CLIP_DURATION_SECS",
                "clip_duration_secs",
                d.clip_duration_secs,
            )?,
            min_halftime_gap_secs: env_or(
                "PITCHLINE_MIN_HALFTIME_GAP_SECS",
                "min_halftime_gap_secs",
                d.min_halftime_gap_secs,
            )?,
            max_halftime_gap_secs: env_or(
                "PITCHLINE_MAX_HALFTIME_GAP_SECS",
                "max_halftime_gap_secs",
                d.max_halftime_gap_secs,
            )?,
            min_half_secs: env_or(
                "PITCHLINE_MIN_HALF_SECS",
                "min_half_secs",
                d.min_half_secs,
            )?,
            max_half_secs: env_or(
                "PITCHLINE_MAX_HALF_SECS",
                "max_half_secs",
                d.max_half_secs,
            )?,
            merge_window_secs: env_or(
                "PITCHLINE_MERGE_WINDOW_SECS",
                "merge_window_secs",
                d.merge_window_secs,
            )?,
            min_candidate_confidence: env_or(
                "PITCHLINE_MIN_CANDIDATE_CONFIDENCE",
                "min_candidate_confidence",
                d.min_candidate_confidence,
            )?,
            out_of_window_penalty: env_or(
                "PITCHLINE_OUT_OF_WINDOW_PENALTY",
                "out_of_window_penalty",
                d.out_of_window_penalty,
            )?,
            unresolved_phase_factor: env_or(
                "PITCHLINE_UNRESOLVED_PHASE_FACTOR",
                "unresolved_phase_factor",
                d.unresolved_phase_factor,
            )?,
            pressure_gap_secs: env_or(
                "PITCHLINE_PRESSURE_GAP_SECS",
                "pressure_gap_secs",
                d.pressure_gap_secs,
            )?,
            pressure_min_events: env_or(
                "PITCHLINE_PRESSURE_MIN_EVENTS",
                "pressure_min_events",
                d.pressure_min_events,
            )?,
        })
    }

    /// Parse a JSON config document; missing keys take their defaults.
    ///
    /// A value of the wrong type or range is reported against its key.
    pub fn from_json_str(json: &str) -> SynthesisResult<Self> {
        let doc: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| SynthesisError::invalid_config("config", e.to_string()))?;
        serde_json::from_value(doc.clone()).map_err(|e| {
            SynthesisError::invalid_config(offending_field(&doc).unwrap_or("config"), e.to_string())
        })
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> SynthesisResult<()> {
        if self.clip_duration_secs == 0 {
            return Err(SynthesisError::invalid_config(
                "clip_duration_secs",
                "must be greater than zero",
            ));
        }
        if self.max_halftime_gap_secs < self.min_halftime_gap_secs {
            return Err(SynthesisError::invalid_config(
                "max_halftime_gap_secs",
                format!(
                    "{} is below min_halftime_gap_secs {}",
                    self.max_halftime_gap_secs, self.min_halftime_gap_secs
                ),
            ));
        }
        if self.max_half_secs < self.min_half_secs {
            return Err(SynthesisError::invalid_config(
                "max_half_secs",
                format!(
                    "{} is below min_half_secs {}",
                    self.max_half_secs, self.min_half_secs
                ),
            ));
        }
        check_unit("min_candidate_confidence", self.min_candidate_confidence)?;
        check_unit("out_of_window_penalty", self.out_of_window_penalty)?;
        check_unit("unresolved_phase_factor", self.unresolved_phase_factor)?;
        if self.pressure_min_events == 0 {
            return Err(SynthesisError::invalid_config(
                "pressure_min_events",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Builder-style setter for clip duration.
    pub fn with_clip_duration_secs(mut self, secs: u32) -> Self {
        self.clip_duration_secs = secs;
        self
    }

    /// Builder-style setter for the halftime window.
    pub fn with_halftime_gap_secs(mut self, min: u32, max: u32) -> Self {
        self.min_halftime_gap_secs = min;
        self.max_halftime_gap_secs = max;
        self
    }

    /// Builder-style setter for the plausible half length.
    pub fn with_half_secs(mut self, min: u32, max: u32) -> Self {
        self.min_half_secs = min;
        self.max_half_secs = max;
        self
    }

    /// Builder-style setter for the repeatable-event merge window.
    pub fn with_merge_window_secs(mut self, secs: u32) -> Self {
        self.merge_window_secs = secs;
        self
    }

    /// Builder-style setter for the candidate threshold.
    pub fn with_min_candidate_confidence(mut self, confidence: f64) -> Self {
        self.min_candidate_confidence = confidence;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SynthesisConfig::default();
        assert_eq!(config.clip_duration_secs, 15);
        assert_eq!(config.min_halftime_gap_secs, 600);
        assert_eq!(config.max_halftime_gap_secs, 1800);
        assert_eq!(config.merge_window_secs, 30);
        assert_eq!(config.min_half_secs, 900);
        assert_eq!(config.max_half_secs, 2700);
        assert!((config.min_candidate_confidence - 0.5).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SynthesisConfig::default()
            .with_clip_duration_secs(10)
            .with_merge_window_secs(45)
            .with_min_candidate_confidence(0.7);

        assert_eq!(config.clip_duration_secs, 10);
        assert_eq!(config.merge_window_secs, 45);
        assert!((config.min_candidate_confidence - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inverted_halftime_window_rejected() {
        let config = SynthesisConfig::default().with_halftime_gap_secs(600, 500);
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("max_halftime_gap_secs"));
    }

    #[test]
    fn test_zero_clip_duration_rejected() {
        let config = SynthesisConfig::default().with_clip_duration_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_confidence_bounds_rejected() {
        let config = SynthesisConfig::default().with_min_candidate_confidence(1.5);
        assert!(config.validate().is_err());

        let config = SynthesisConfig::default().with_min_candidate_confidence(f64::NAN);
        assert!(config.validate().is_err());

        let config = SynthesisConfig {
            unresolved_phase_factor: -0.1,
            ..SynthesisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_equal_halftime_bounds_allowed() {
        let config = SynthesisConfig::default().with_halftime_gap_secs(900, 900);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            SynthesisConfig::from_json_str(r#"{"clip_duration_secs": 10, "merge_window_secs": 20}"#)
                .unwrap();
        assert_eq!(config.clip_duration_secs, 10);
        assert_eq!(config.merge_window_secs, 20);
        assert_eq!(config.min_halftime_gap_secs, 600);
    }

    #[test]
    fn test_from_json_rejects_negative_duration() {
        let err = SynthesisConfig::from_json_str(r#"{"clip_duration_secs": -15}"#).unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            SynthesisError::InvalidConfiguration {
                field: "clip_duration_secs",
                ..
            }
        ));
    }

    #[test]
    fn test_from_json_malformed_document() {
        let err = SynthesisConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::InvalidConfiguration { field: "config", .. }
        ));

        let err = SynthesisConfig::from_json_str("[1, 2]").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_inverted_half_length_rejected() {
        let config = SynthesisConfig::default().with_half_secs(2000, 1000);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_half_secs"));
    }

    #[test]
    fn test_fields_cover_serialized_keys() {
        let json = serde_json::to_value(SynthesisConfig::default()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        let mut fields = SynthesisConfig::FIELDS.to_vec();
        fields.sort_unstable();
        assert_eq!(keys, fields);
    }
}
