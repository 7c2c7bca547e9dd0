//! Clip description ingest.
//!
//! Turns per-clip description text into [`ObservationRecord`]s for the
//! synthesis engine:
//! - [`scan`] finds `clip_MMmSSs.txt` descriptions on disk
//! - [`describe`] runs a [`ClipDescriber`] over clips with bounded concurrency
//! - [`parser`] and [`phrases`] map text to normalized tags and confidence
//!
//! [`ObservationRecord`]: pitchline_models::ObservationRecord

pub mod config;
pub mod describe;
pub mod error;
pub mod parser;
pub mod phrases;
pub mod scan;

pub use config::IngestConfig;
pub use describe::{describe_clips, ClipDescriber, ClipSource, FileDescriber};
pub use error::{IngestError, IngestResult};
pub use parser::parse_description;
pub use scan::scan_description_dir;
