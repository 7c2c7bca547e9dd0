//! Description parser.
//!
//! A description is either free prose or the structured analysis format:
//!
//! ```text
//! TIMESTAMP: 04:15
//! CATEGORY: GAME_START
//! KICKOUT: YES
//! CONFIDENCE: 8
//! EXACT_CONTACT_TIME: 6.4
//! KICKING_TEAM: Team A
//! POSSESSION_WON_BY: Team B
//! TRIGGER_EVENT: shot wide
//! ```
//!
//! Both forms end up as one [`ObservationRecord`]. Structured fields win
//! over prose where they overlap.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use pitchline_models::{parse_match_clock, tags, ObservationRecord};
use regex::Regex;
use tracing::debug;

use crate::config::IngestConfig;
use crate::phrases;

/// `FIELD_NAME: value` lines.
static FIELD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Z][A-Z_]+)\s*:\s*(.*?)\s*$").unwrap());

/// Leading decimal number of a field value (`6.4 seconds` -> `6.4`).
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)").unwrap());

/// Longest evidence text kept per clip.
const MAX_EVIDENCE_CHARS: usize = 240;

const KICKOUT_TAGS: [&str; 3] = [
    tags::BALL_OUT_OF_PLAY,
    tags::GOALKEEPER_GROUND_BALL,
    tags::STATIONARY_BALL,
];

/// Split a description into structured fields and remaining prose.
fn split_fields(text: &str) -> (BTreeMap<String, String>, Vec<String>) {
    let mut fields = BTreeMap::new();
    let mut prose = Vec::new();

    for line in text.lines() {
        if let Some(caps) = FIELD_LINE.captures(line) {
            let value = caps[2].trim_matches(|c| c == '[' || c == ']').trim();
            fields
                .entry(caps[1].to_string())
                .or_insert_with(|| value.to_string());
            continue;
        }
        let line = line.trim().trim_start_matches(['-', '*', '•']).trim();
        if !line.is_empty() {
            prose.push(line.to_string());
        }
    }

    (fields, prose)
}

fn leading_number(value: &str) -> Option<f64> {
    LEADING_NUMBER
        .captures(value)
        .and_then(|c| c[1].parse().ok())
}

/// Tags implied by a `CATEGORY` value.
fn category_tags(category: &str) -> &'static [&'static str] {
    match category.trim().to_ascii_uppercase().as_str() {
        "GAME_START" => &[tags::THROW_IN_CEREMONY, tags::TWO_PLAYER_CONTEST],
        "HALFTIME" => &[tags::HALFTIME_ACTIVITY],
        "ACTIVE_PLAY" => &[tags::ACTIVE_PLAY],
        "GAME_END" => &[tags::FINAL_WHISTLE, tags::PLAYERS_LEAVING],
        _ => &[],
    }
}

/// A team name from a field value, skipping placeholders.
fn named_team(value: Option<&String>) -> Option<String> {
    let team = value?.trim();
    let placeholder = ["", "n/a", "none", "unclear", "unknown", "contested"]
        .contains(&team.to_ascii_lowercase().as_str());
    (!placeholder).then(|| team.to_string())
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

/// Parse one clip description into an observation record.
///
/// `stem_offset_secs` is the clip start taken from its file name. A
/// `TIMESTAMP` field overrides it; the store flags the record if the two
/// disagree with the clip grid.
pub fn parse_description(
    stem_offset_secs: u32,
    text: &str,
    config: &IngestConfig,
    clip_duration_secs: u32,
) -> ObservationRecord {
    let clip_duration = clip_duration_secs.max(1);
    let (fields, prose) = split_fields(text);
    let prose_text = prose.join(" ");

    let start_offset_secs = fields
        .get("TIMESTAMP")
        .and_then(|t| parse_match_clock(t).ok())
        .unwrap_or(stem_offset_secs);
    let clip_index = (stem_offset_secs % clip_duration == 0).then(|| stem_offset_secs / clip_duration);

    let mut labels: BTreeSet<&'static str> = phrases::tags_for(text);
    if let Some(category) = fields.get("CATEGORY") {
        labels.extend(category_tags(category));
    }
    match fields.get("KICKOUT").map(|v| v.to_ascii_uppercase()) {
        Some(v) if v.starts_with("YES") => labels.extend(KICKOUT_TAGS),
        Some(v) if v.starts_with("NO") => {
            for t in KICKOUT_TAGS {
                labels.remove(t);
            }
        }
        _ => {}
    }

    // Field values such as `POSSESSION_WON_BY: Unclear` are not hedges
    let hedged = phrases::is_hedged(&prose_text);
    if hedged {
        labels.insert(tags::HEDGED_LANGUAGE);
    }

    let confidence = match fields.get("CONFIDENCE").and_then(|c| leading_number(c)) {
        Some(score) => Some(score / 10.0),
        None if text.trim().is_empty() => None,
        None => Some(config.default_confidence),
    }
    .map(|c| if hedged { c * config.hedge_penalty } else { c });

    let contact_offset_secs = fields
        .get("EXACT_CONTACT_TIME")
        .and_then(|v| leading_number(v));

    let team = named_team(fields.get("KICKING_TEAM"));
    let possession_won_by = named_team(fields.get("POSSESSION_WON_BY"));

    let evidence = if prose_text.is_empty() {
        fields
            .get("TRIGGER_EVENT")
            .or_else(|| fields.get("CATEGORY"))
            .cloned()
            .unwrap_or_default()
    } else {
        prose_text
    };

    debug!(
        stem_offset_secs,
        labels = labels.len(),
        hedged,
        "Parsed clip description"
    );

    ObservationRecord {
        clip_index,
        start_offset_secs: Some(start_offset_secs),
        labels: labels.into_iter().map(str::to_string).collect(),
        confidence,
        evidence_text: truncate_chars(&evidence, MAX_EVIDENCE_CHARS),
        contact_offset_secs,
        team,
        possession_won_by,
    }
}
