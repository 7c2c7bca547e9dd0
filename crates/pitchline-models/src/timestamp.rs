//! Match clock parsing and formatting.
//!
//! Clip descriptions carry their position either as a match clock
//! (`MM:SS`, `HH:MM:SS`, or plain seconds) or encoded in the clip file
//! stem (`clip_15m30s`). Everything downstream works in whole seconds.

use thiserror::Error;

/// Longest video we accept (24 hours in seconds).
pub const MAX_VIDEO_DURATION_SECS: u32 = 86_400;

/// Match clock parsing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid timestamp format '{0}'. Use HH:MM:SS, MM:SS, or SS")]
    InvalidFormat(String),

    #[error("Seconds component out of range in '{0}'")]
    SecondsOutOfRange(String),

    #[error("Timestamp exceeds maximum allowed duration ({0}s)")]
    ExceedsMaxDuration(u32),

    #[error("Invalid clip name '{0}'. Expected clip_<M>m<S>s")]
    InvalidClipName(String),
}

fn parse_component(name: &'static str, value: &str) -> Result<u32, TimestampError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| TimestampError::InvalidValue(name, value.to_string()))
}

fn check_max(total: u32) -> Result<u32, TimestampError> {
    if total > MAX_VIDEO_DURATION_SECS {
        return Err(TimestampError::ExceedsMaxDuration(MAX_VIDEO_DURATION_SECS));
    }
    Ok(total)
}

/// Parse a match clock string to whole seconds.
///
/// Supports `HH:MM:SS`, `MM:SS` (minutes may exceed 59, as match clocks do)
/// and `SS`.
///
/// # Examples
/// ```
/// use pitchline_models::timestamp::parse_match_clock;
/// assert_eq!(parse_match_clock("15:30").unwrap(), 930);
/// assert_eq!(parse_match_clock("84:00").unwrap(), 5040);
/// assert_eq!(parse_match_clock("01:02:03").unwrap(), 3723);
/// ```
pub fn parse_match_clock(ts: &str) -> Result<u32, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    let total = match parts.as_slice() {
        [secs] => parse_component("seconds", secs)?,
        [mins, secs] => {
            let minutes = parse_component("minutes", mins)?;
            let seconds = parse_component("seconds", secs)?;
            if seconds >= 60 {
                return Err(TimestampError::SecondsOutOfRange(ts.to_string()));
            }
            minutes.saturating_mul(60).saturating_add(seconds)
        }
        [hours, mins, secs] => {
            let hours = parse_component("hours", hours)?;
            let minutes = parse_component("minutes", mins)?;
            let seconds = parse_component("seconds", secs)?;
            if seconds >= 60 || minutes >= 60 {
                return Err(TimestampError::SecondsOutOfRange(ts.to_string()));
            }
            hours
                .saturating_mul(3600)
                .saturating_add(minutes * 60)
                .saturating_add(seconds)
        }
        _ => return Err(TimestampError::InvalidFormat(ts.to_string())),
    };

    check_max(total)
}

/// Parse the offset encoded in a clip stem such as `clip_15m30s`.
///
/// A trailing extension (`clip_15m30s.txt`, `clip_00m15s.mp4`) is ignored.
///
/// # Examples
/// ```
/// use pitchline_models::timestamp::parse_clip_stem;
/// assert_eq!(parse_clip_stem("clip_15m30s").unwrap(), 930);
/// assert_eq!(parse_clip_stem("clip_00m15s.txt").unwrap(), 15);
/// ```
pub fn parse_clip_stem(name: &str) -> Result<u32, TimestampError> {
    let invalid = || TimestampError::InvalidClipName(name.to_string());

    let stem = name.split('.').next().unwrap_or(name);
    let body = stem.strip_prefix("clip_").ok_or_else(invalid)?;
    let body = body.strip_suffix('s').ok_or_else(invalid)?;
    let (mins, secs) = body.split_once('m').ok_or_else(invalid)?;

    if mins.is_empty() || secs.is_empty() {
        return Err(invalid());
    }
    let minutes: u32 = mins.parse().map_err(|_| invalid())?;
    let seconds: u32 = secs.parse().map_err(|_| invalid())?;
    if seconds >= 60 {
        return Err(invalid());
    }

    check_max(minutes.saturating_mul(60).saturating_add(seconds))
}

/// Format whole seconds as a match clock (`MM:SS`, minutes unbounded).
pub fn format_match_clock(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Format whole seconds as the clip stem used by the splitter (`clip_MMmSSs`).
pub fn format_clip_stem(total_secs: u32) -> String {
    format!("clip_{:02}m{:02}s", total_secs / 60, total_secs % 60)
}
