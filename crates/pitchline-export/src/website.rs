//! Viewer JSON format.
//!
//! A flat event list the match viewer can render without knowing about
//! boundaries or gaps. Times are whole seconds from video start.

use std::collections::BTreeMap;

use pitchline_models::{PhaseName, Timeline};
use serde::Serialize;

/// Team shown for events whose description named none.
pub const UNKNOWN_TEAM: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebsiteExport {
    pub match_info: MatchInfo,
    pub events: Vec<WebsiteEvent>,
    pub phases: Vec<WebsitePhase>,
    pub summary: WebsiteSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchInfo {
    pub title: String,
    pub description: String,
    pub total_events: usize,
    pub analysis_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebsiteEvent {
    pub time: u32,
    pub team: String,
    pub action: String,
    pub outcome: String,
    pub confidence: f64,
    pub validated: bool,
    pub phase: PhaseName,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebsitePhase {
    pub name: PhaseName,
    pub label: String,
    pub start: u32,
    pub end: u32,
    pub confidence: f64,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeRange {
    pub first_event: Option<String>,
    pub last_event: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebsiteSummary {
    pub total_events: usize,
    pub by_team: BTreeMap<String, usize>,
    pub time_range: TimeRange,
}

impl WebsiteExport {
    /// Build the viewer document from a timeline.
    pub fn from_timeline(timeline: &Timeline) -> Self {
        let events: Vec<WebsiteEvent> = timeline
            .events
            .iter()
            .map(|e| WebsiteEvent {
                time: e.event.timestamp_secs,
                team: e
                    .event
                    .team
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_TEAM.to_string()),
                action: e.event.kind.label().to_string(),
                outcome: e
                    .event
                    .possession_won_by
                    .as_ref()
                    .map(|w| format!("Won by {w}"))
                    .unwrap_or_else(|| "N/A".to_string()),
                confidence: e.event.confidence,
                validated: false,
                phase: e.phase,
            })
            .collect();

        let phases = timeline
            .phases
            .iter()
            .map(|p| WebsitePhase {
                name: p.name,
                label: p.name.label().to_string(),
                start: p.start_secs,
                end: p.end_secs,
                confidence: p.confidence,
                degraded: p.degraded,
            })
            .collect();

        let mut by_team = BTreeMap::new();
        for e in &events {
            *by_team.entry(e.team.clone()).or_insert(0) += 1;
        }

        let time_range = TimeRange {
            first_event: events.iter().map(|e| e.time).min().map(|t| format!("{t}s")),
            last_event: events.iter().map(|e| e.time).max().map(|t| format!("{t}s")),
        };

        Self {
            match_info: MatchInfo {
                title: "GAA Match - Timeline".to_string(),
                description: "Match phases, kickouts and scoring attempts detected from clip descriptions"
                    .to_string(),
                total_events: events.len(),
                analysis_method: "Per-clip description analysis with temporal validation".to_string(),
            },
            summary: WebsiteSummary {
                total_events: events.len(),
                by_team,
                time_range,
            },
            events,
            phases,
        }
    }
}

/// Render the viewer document as pretty JSON.
pub fn render_website_json(timeline: &Timeline) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&WebsiteExport::from_timeline(timeline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_timeline;

    #[test]
    fn test_website_events() {
        let export = WebsiteExport::from_timeline(&sample_timeline());
        assert_eq!(export.match_info.total_events, 3);
        assert_eq!(export.events[0].action, "Kickout");
        assert_eq!(export.events[0].team, "Team A");
        assert_eq!(export.events[2].team, UNKNOWN_TEAM);
        assert!(export.events.iter().all(|e| !e.validated));
        assert_eq!(export.events[0].outcome, "Won by Team A");
        assert_eq!(export.events[1].outcome, "N/A");
        assert_eq!(export.summary.by_team["Team A"], 1);
        assert_eq!(export.summary.time_range.first_event.as_deref(), Some("453s"));
        assert_eq!(export.summary.time_range.last_event.as_deref(), Some("3752s"));
        assert_eq!(export.phases.len(), 5);
    }

    #[test]
    fn test_website_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&render_website_json(&sample_timeline()).unwrap()).unwrap();
        assert_eq!(json["events"][1]["phase"], "first_half");
        assert_eq!(json["events"][2]["action"], "Scoring attempt");
        assert_eq!(json["summary"]["total_events"], 3);
        assert_eq!(json["phases"][0]["name"], "pre_match");
    }
}
