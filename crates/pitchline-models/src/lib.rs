//! Shared data models for the pitchline match timeline.
//!
//! This crate provides Serde-serializable types for:
//! - Per-clip observations produced by the description stage
//! - Candidate and validated match events
//! - Canonical match phases and the synthesized timeline
//! - The normalized tag vocabulary shared by ingest and extraction

pub mod event;
pub mod observation;
pub mod phase;
pub mod tags;
pub mod timeline;
pub mod timestamp;

// Re-export common types
pub use event::{CandidateEvent, EventKind};
pub use observation::{ClipObservation, DataGap, GapReason, ObservationRecord};
pub use phase::{Phase, PhaseName};
pub use timeline::{
    BoundaryReport, BoundaryStatus, KickoutRetention, PressurePeriod, Timeline, TimelineEvent,
    TimelineStats,
};
pub use timestamp::{format_match_clock, parse_clip_stem, parse_match_clock, TimestampError};
