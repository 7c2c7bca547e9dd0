//! Timeline exporters.
//!
//! Renderers are pure and return strings; [`export_all`] writes them to an
//! output directory. Nothing rendered here depends on the wall clock, so the
//! same timeline always produces byte-identical files.

pub mod error;
pub mod summary;
pub mod website;

use std::path::{Path, PathBuf};

use pitchline_models::Timeline;
use tracing::info;

pub use error::{ExportError, ExportResult};
pub use summary::render_summary;
pub use website::{render_website_json, WebsiteExport};

/// Full timeline file name.
pub const TIMELINE_FILE: &str = "timeline.json";
/// Viewer file name.
pub const WEBSITE_FILE: &str = "website.json";
/// Text report file name.
pub const SUMMARY_FILE: &str = "summary.txt";

/// Render the full timeline as pretty JSON.
pub fn render_timeline_json(timeline: &Timeline) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(timeline)?)
}

/// Write every export into `dir`, creating it if needed.
///
/// Returns the written paths in a fixed order.
pub fn export_all(timeline: &Timeline, dir: &Path) -> ExportResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let outputs = [
        (TIMELINE_FILE, render_timeline_json(timeline)?),
        (WEBSITE_FILE, render_website_json(timeline)?),
        (SUMMARY_FILE, render_summary(timeline)),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, contents) in outputs {
        let path = dir.join(name);
        std::fs::write(&path, contents)?;
        info!(path = %path.display(), "Wrote export");
        written.push(path);
    }
    Ok(written)
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::sample_timeline;

    #[test]
    fn test_export_all_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let written = export_all(&sample_timeline(), &out).unwrap();
        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists());
        }

        let timeline: Timeline =
            serde_json::from_str(&std::fs::read_to_string(out.join(TIMELINE_FILE)).unwrap())
                .unwrap();
        assert_eq!(timeline, sample_timeline());
    }

    #[test]
    fn test_exports_are_byte_identical() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        export_all(&sample_timeline(), a.path()).unwrap();
        export_all(&sample_timeline(), b.path()).unwrap();
        for name in [TIMELINE_FILE, WEBSITE_FILE, SUMMARY_FILE] {
            assert_eq!(
                std::fs::read(a.path().join(name)).unwrap(),
                std::fs::read(b.path().join(name)).unwrap()
            );
        }
    }
}
