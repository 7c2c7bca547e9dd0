//! Phrase catalog mapping description prose to normalized tags.
//!
//! Describers write free text; this catalog is the only place where wording
//! is interpreted. Everything downstream works on tags.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use pitchline_models::tags;
use regex::Regex;

type Phrase = (Regex, &'static [&'static str]);

fn phrase(pattern: &str, implied: &'static [&'static str]) -> Phrase {
    (Regex::new(pattern).unwrap(), implied)
}

/// Phrase patterns and the tags each one implies.
static PHRASES: LazyLock<Vec<Phrase>> = LazyLock::new(|| {
    vec![
        // Throw-ins
        phrase(
            r"(?i)throw[- ]?in ceremony",
            &[tags::THROW_IN_CEREMONY],
        ),
        phrase(
            r"(?i)referee (throws|throwing|tosses|tossing) (the )?ball (up|in)",
            &[tags::THROW_IN_CEREMONY, tags::TWO_PLAYER_CONTEST],
        ),
        phrase(
            r"(?i)ball (is )?(thrown )?up between (two|2) (players|midfielders)",
            &[tags::TWO_PLAYER_CONTEST],
        ),
        phrase(
            r"(?i)(teams?|players) (are )?(return|returning|coming back) (to|onto) the (field|pitch)|start of the second half",
            &[tags::TEAMS_RETURNING],
        ),
        // Whistles and departures
        phrase(
            r"(?i)final whistle|full[- ]time whistle|referee blows (the |his |her )?whistle",
            &[tags::FINAL_WHISTLE],
        ),
        phrase(
            r"(?i)walking off|leaving the (field|pitch)|heading (to|towards) the (dressing rooms?|tunnel)",
            &[tags::PLAYERS_LEAVING],
        ),
        phrase(
            r"(?i)shaking hands|handshakes|match (is )?over|end of the (match|game)|\bfull[- ]time\b",
            &[tags::MATCH_CONCLUDED],
        ),
        phrase(
            r"(?i)warm(ing)?[- ]?ups?|practi[cs]ing|casual (kick|play)",
            &[tags::HALFTIME_ACTIVITY],
        ),
        // Restarts
        phrase(
            r"(?i)\bwide\b|out of play|over the end ?line",
            &[tags::BALL_OUT_OF_PLAY],
        ),
        phrase(
            r"(?i)goalkeeper (places|placing|puts|sets) the ball",
            &[tags::GOALKEEPER_GROUND_BALL],
        ),
        phrase(
            r"(?i)\bstationary\b|dead ball|ball (is )?(still|at rest)",
            &[tags::STATIONARY_BALL],
        ),
        // Play
        phrase(
            r"(?i)competitive play|open play|counter[- ]attack|\btackl(e|es|ing)\b",
            &[tags::ACTIVE_PLAY],
        ),
        phrase(
            r"(?i)\bshot\b|\bshoots\b|attempt at (goal|a point)|kicks? (at|towards) goal",
            &[tags::SHOT_AT_GOAL],
        ),
        phrase(
            r"(?i)umpire (signals?|waves|raises)|(white|green) flag",
            &[tags::UMPIRE_SIGNAL],
        ),
    ]
});

/// Wording that signals the describer was unsure.
static HEDGES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)appears to be|seems to|\bpossibly\b|might be|may be").unwrap(),
        Regex::new(r"(?i)\bunclear\b|not (entirely )?sure|hard to tell").unwrap(),
    ]
});

/// Tags implied by the prose of a description.
pub fn tags_for(text: &str) -> BTreeSet<&'static str> {
    PHRASES
        .iter()
        .filter(|(re, _)| re.is_match(text))
        .flat_map(|(_, implied)| implied.iter().copied())
        .collect()
}

/// Whether a description hedges its observations.
pub fn is_hedged(text: &str) -> bool {
    HEDGES.iter().any(|re| re.is_match(text))
}
