//! Signal rules mapping normalized tags to event kinds.
//!
//! Each rule lists the tags that must be present for its kind and the tags
//! that rule it out. Scoring is a single pure function so every candidate's
//! confidence can be reproduced from its clip's tags.

use pitchline_models::{tags, ClipObservation, EventKind};

/// Multiplier applied when only some required tags are present.
pub const PARTIAL_MATCH_PENALTY: f64 = 0.8;

/// One entry of the rule catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalRule {
    pub kind: EventKind,
    pub required: &'static [&'static str],
    pub forbidden: &'static [&'static str],
}

impl SignalRule {
    /// Score an observation against this rule.
    pub fn score(&self, observation: &ClipObservation) -> f64 {
        let matched = self
            .required
            .iter()
            .filter(|t| observation.has_label(t))
            .count();
        let forbidden_present = self.forbidden.iter().any(|t| observation.has_label(t));
        match_score(matched, self.required.len(), forbidden_present)
    }
}

/// The default catalog, one rule per event kind.
///
/// The two throw-in kinds share their signal; only `teams_returning` tells
/// a restart after the break from the opening throw-in. A clip showing
/// break-time activity is never a throw-in. The two whistle kinds are split
/// by `match_concluded`.
pub const RULE_CATALOG: &[SignalRule] = &[
    SignalRule {
        kind: EventKind::MatchStart,
        required: &[tags::THROW_IN_CEREMONY, tags::TWO_PLAYER_CONTEST],
        forbidden: &[tags::TEAMS_RETURNING, tags::HALFTIME_ACTIVITY],
    },
    SignalRule {
        kind: EventKind::FirstHalfEnd,
        required: &[tags::FINAL_WHISTLE, tags::PLAYERS_LEAVING],
        forbidden: &[tags::MATCH_CONCLUDED, tags::ACTIVE_PLAY],
    },
    SignalRule {
        kind: EventKind::SecondHalfStart,
        required: &[tags::THROW_IN_CEREMONY, tags::TWO_PLAYER_CONTEST],
        forbidden: &[tags::HALFTIME_ACTIVITY],
    },
    SignalRule {
        kind: EventKind::MatchEnd,
        required: &[
            tags::FINAL_WHISTLE,
            tags::PLAYERS_LEAVING,
            tags::MATCH_CONCLUDED,
        ],
        forbidden: &[tags::ACTIVE_PLAY],
    },
    SignalRule {
        kind: EventKind::Kickout,
        required: &[
            tags::BALL_OUT_OF_PLAY,
            tags::GOALKEEPER_GROUND_BALL,
            tags::STATIONARY_BALL,
        ],
        forbidden: &[tags::ACTIVE_PLAY],
    },
    SignalRule {
        kind: EventKind::ScoringAttempt,
        required: &[tags::SHOT_AT_GOAL, tags::UMPIRE_SIGNAL],
        forbidden: &[],
    },
];

/// Returns the default rule catalog.
pub fn default_catalog() -> &'static [SignalRule] {
    RULE_CATALOG
}

/// Score how well a tag set matches a rule.
///
/// `0` when a forbidden tag is present or nothing matched, `1` on a full
/// match, and `matched / total * PARTIAL_MATCH_PENALTY` otherwise.
pub fn match_score(matched: usize, total: usize, forbidden_present: bool) -> f64 {
    if forbidden_present || matched == 0 || total == 0 {
        return 0.0;
    }
    if matched >= total {
        return 1.0;
    }
    (matched as f64 / total as f64) * PARTIAL_MATCH_PENALTY
}
