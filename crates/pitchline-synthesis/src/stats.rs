//! Statistics derived from a synthesized timeline.

use std::collections::BTreeMap;

use pitchline_models::{
    EventKind, KickoutRetention, Phase, PhaseName, PressurePeriod, TimelineEvent, TimelineStats,
};

use crate::config::SynthesisConfig;

/// Team label for events whose description named no team.
pub const UNKNOWN_TEAM: &str = "Unknown";

/// Summarize validated events and phase lengths.
pub fn compute_stats(
    phases: &[Phase],
    events: &[TimelineEvent],
    config: &SynthesisConfig,
) -> TimelineStats {
    let mut stats = TimelineStats {
        total_events: events.len(),
        ..TimelineStats::default()
    };

    for e in events {
        *stats.by_kind.entry(e.event.kind).or_default() += 1;
        *stats.by_phase.entry(e.phase).or_default() += 1;
        let team = e.event.team.as_deref().unwrap_or(UNKNOWN_TEAM);
        *stats.by_team.entry(team.to_string()).or_default() += 1;
    }

    stats.first_event_secs = events.iter().map(|e| e.event.timestamp_secs).min();
    stats.last_event_secs = events.iter().map(|e| e.event.timestamp_secs).max();

    let mut kickouts: Vec<u32> = events
        .iter()
        .filter(|e| e.event.kind == EventKind::Kickout)
        .map(|e| e.event.timestamp_secs)
        .collect();
    kickouts.sort_unstable();

    stats.kickout_retention = kickout_retention(events);
    stats.average_kickout_interval_secs = average_interval(&kickouts);
    stats.pressure_periods =
        pressure_periods(&kickouts, config.pressure_gap_secs, config.pressure_min_events);

    let duration = |name: PhaseName| {
        phases
            .iter()
            .find(|p| p.name == name)
            .map(Phase::duration_secs)
            .unwrap_or(0)
    };
    stats.first_half_duration_secs = duration(PhaseName::FirstHalf);
    stats.halftime_duration_secs = duration(PhaseName::Halftime);
    stats.second_half_duration_secs = duration(PhaseName::SecondHalf);

    stats
}

/// Possession outcome of each team's kickouts.
pub fn kickout_retention(events: &[TimelineEvent]) -> BTreeMap<String, KickoutRetention> {
    let mut by_team: BTreeMap<String, KickoutRetention> = BTreeMap::new();

    for e in events.iter().filter(|e| e.event.kind == EventKind::Kickout) {
        let Some(team) = e.event.team.as_deref() else {
            continue;
        };
        let entry = by_team.entry(team.to_string()).or_default();
        entry.kickouts += 1;
        match e.event.retained_possession() {
            Some(true) => entry.won_own += 1,
            Some(false) => entry.lost += 1,
            None => {}
        }
    }

    for entry in by_team.values_mut() {
        entry.retention_rate = Some(entry.won_own as f64 / entry.kickouts as f64);
    }
    by_team
}

/// Mean gap between consecutive sorted timestamps.
pub fn average_interval(sorted: &[u32]) -> Option<f64> {
    if sorted.len() < 2 {
        return None;
    }
    let span = sorted[sorted.len() - 1] - sorted[0];
    Some(f64::from(span) / (sorted.len() - 1) as f64)
}

/// Maximal runs of timestamps each within `max_gap_secs` of the previous.
pub fn pressure_periods(sorted: &[u32], max_gap_secs: u32, min_events: usize) -> Vec<PressurePeriod> {
    let mut periods = Vec::new();
    let mut run_start = 0;

    for i in 1..=sorted.len() {
        let breaks = i == sorted.len() || sorted[i] - sorted[i - 1] > max_gap_secs;
        if breaks {
            let count = i - run_start;
            if count >= min_events && count > 0 {
                periods.push(PressurePeriod {
                    start_secs: sorted[run_start],
                    end_secs: sorted[i - 1],
                    event_count: count,
                });
            }
            run_start = i;
        }
    }

    periods
}
