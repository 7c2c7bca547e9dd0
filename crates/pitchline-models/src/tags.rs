//! Normalized observation tags.
//!
//! The description stage produces free text; ingest reduces it to this fixed
//! vocabulary and the extractor's rule table only ever sees these strings.

/// Referee throws the ball up to start a half.
pub const THROW_IN_CEREMONY: &str = "throw_in_ceremony";
/// Two players contesting the throw-in at midfield.
pub const TWO_PLAYER_CONTEST: &str = "two_player_contest";
/// Teams coming back onto the pitch after the break.
pub const TEAMS_RETURNING: &str = "teams_returning";
/// Referee blows for the end of a half or the match.
pub const FINAL_WHISTLE: &str = "final_whistle";
/// Players walking off the field.
pub const PLAYERS_LEAVING: &str = "players_leaving";
/// Handshakes, presentations, players leaving for good.
pub const MATCH_CONCLUDED: &str = "match_concluded";
/// Warm-ups and casual kicking during the break.
pub const HALFTIME_ACTIVITY: &str = "halftime_activity";
/// Ball went wide, over the bar, or was saved out.
pub const BALL_OUT_OF_PLAY: &str = "ball_out_of_play";
/// Goalkeeper places the ball on the ground for the restart.
pub const GOALKEEPER_GROUND_BALL: &str = "goalkeeper_ground_ball";
/// Clear pause with the ball stationary before the kick.
pub const STATIONARY_BALL: &str = "stationary_ball";
/// Open, competitive play.
pub const ACTIVE_PLAY: &str = "active_play";
/// A shot or kick at the posts.
pub const SHOT_AT_GOAL: &str = "shot_at_goal";
/// Umpire flag or signal after a shot.
pub const UMPIRE_SIGNAL: &str = "umpire_signal";
/// The description hedged ("appears to be", "possibly").
pub const HEDGED_LANGUAGE: &str = "hedged_language";

/// Every tag the default rule catalog knows about.
pub const ALL: &[&str] = &[
    THROW_IN_CEREMONY,
    TWO_PLAYER_CONTEST,
    TEAMS_RETURNING,
    FINAL_WHISTLE,
    PLAYERS_LEAVING,
    MATCH_CONCLUDED,
    HALFTIME_ACTIVITY,
    BALL_OUT_OF_PLAY,
    GOALKEEPER_GROUND_BALL,
    STATIONARY_BALL,
    ACTIVE_PLAY,
    SHOT_AT_GOAL,
    UMPIRE_SIGNAL,
    HEDGED_LANGUAGE,
];

/// Normalize a raw label: trim, lowercase, and fold whitespace and hyphens
/// into single underscores.
///
/// # Examples
/// ```
/// use pitchline_models::tags::normalize;
/// assert_eq!(normalize("  Throw-In Ceremony "), "throw_in_ceremony");
/// ```
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = !out.is_empty();
            continue;
        }
        if pending_sep {
            out.push('_');
            pending_sep = false;
        }
        out.extend(ch.to_lowercase());
    }

    out
}

/// Whether a normalized tag belongs to the known vocabulary.
pub fn is_known(tag: &str) -> bool {
    ALL.contains(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_separators() {
        assert_eq!(normalize("Final Whistle"), "final_whistle");
        assert_eq!(normalize("ball--out   of_play"), "ball_out_of_play");
        assert_eq!(normalize("_leading"), "leading");
        assert_eq!(normalize("trailing- "), "trailing");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_known_tags_are_normalized() {
        for tag in ALL {
            assert_eq!(&normalize(tag), tag);
            assert!(is_known(tag));
        }
        assert!(!is_known("corner_kick"));
    }
}
