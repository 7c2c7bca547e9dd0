//! Plain-text match report.

use std::fmt::Write;

use pitchline_models::{format_match_clock, Timeline};

use crate::website::UNKNOWN_TEAM;

fn clock_or_blank(secs: Option<u32>) -> String {
    secs.map(format_match_clock)
        .unwrap_or_else(|| "--:--".to_string())
}

/// Render the human-readable summary.
pub fn render_summary(timeline: &Timeline) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "MATCH TIMELINE");
    let _ = writeln!(out, "==============");
    let _ = writeln!(
        out,
        "Video length: {}",
        format_match_clock(timeline.total_duration_secs)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "PHASES");
    for phase in &timeline.phases {
        let _ = writeln!(
            out,
            "  {:<12} {} - {}  confidence {:.2}{}",
            phase.name.label(),
            format_match_clock(phase.start_secs),
            format_match_clock(phase.end_secs),
            phase.confidence,
            if phase.degraded { "  [degraded]" } else { "" }
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "BOUNDARIES");
    for b in &timeline.boundaries {
        let _ = writeln!(
            out,
            "  {:<18} {:<10} {}{}",
            b.kind.label(),
            b.status.as_str(),
            clock_or_blank(b.timestamp_secs()),
            b.confidence()
                .map(|c| format!("  ({c:.2})"))
                .unwrap_or_default()
        );
    }
    let _ = writeln!(out);

    let stats = &timeline.stats;
    let _ = writeln!(out, "DURATIONS");
    let _ = writeln!(
        out,
        "  First half:  {}",
        format_match_clock(stats.first_half_duration_secs)
    );
    let _ = writeln!(
        out,
        "  Halftime:    {}",
        format_match_clock(stats.halftime_duration_secs)
    );
    let _ = writeln!(
        out,
        "  Second half: {}",
        format_match_clock(stats.second_half_duration_secs)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "EVENTS ({})", timeline.events.len());
    for e in &timeline.events {
        let _ = writeln!(
            out,
            "  {} - {} - {} ({})",
            format_match_clock(e.event.timestamp_secs),
            e.event.kind.label(),
            e.event.team.as_deref().unwrap_or(UNKNOWN_TEAM),
            e.phase
        );
    }
    if let Some(avg) = stats.average_kickout_interval_secs {
        let _ = writeln!(out, "  Average time between kickouts: {avg:.0}s");
    }
    for (team, count) in &stats.by_team {
        let _ = writeln!(out, "  {team}: {count}");
    }
    for (team, r) in &stats.kickout_retention {
        let rate = r
            .retention_rate
            .map(|rate| format!("{:.0}%", rate * 100.0))
            .unwrap_or_else(|| "--".to_string());
        let _ = writeln!(
            out,
            "  {team} kept {} of {} own kickouts ({rate}), lost {}",
            r.won_own, r.kickouts, r.lost
        );
    }
    for period in &stats.pressure_periods {
        let _ = writeln!(
            out,
            "  Pressure period {} - {}: {} kickouts",
            format_match_clock(period.start_secs),
            format_match_clock(period.end_secs),
            period.event_count
        );
    }
    let in_play: usize = stats
        .by_phase
        .iter()
        .filter(|(p, _)| p.is_in_play())
        .map(|(_, n)| n)
        .sum();
    let _ = writeln!(
        out,
        "  During play: {in_play}, outside play: {}",
        stats.total_events - in_play
    );
    let _ = writeln!(out);

    let gap_clips: u32 = timeline.gaps.iter().map(|g| g.clip_count).sum();
    let _ = writeln!(
        out,
        "DATA GAPS: {} (clips skipped: {gap_clips})",
        timeline.gaps.len()
    );
    if !timeline.is_fully_resolved() {
        let unresolved: Vec<&str> = timeline
            .boundaries
            .iter()
            .filter(|b| !b.status.has_timestamp())
            .map(|b| b.kind.label())
            .collect();
        if !unresolved.is_empty() {
            let _ = writeln!(out, "UNRESOLVED: {}", unresolved.join(", "));
        }
    }

    out
}
