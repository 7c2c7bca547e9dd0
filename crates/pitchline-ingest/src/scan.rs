//! Description directory scanning.

use std::path::Path;

use tracing::{debug, warn};

use crate::describe::ClipSource;
use crate::error::IngestResult;

/// List `clip_*.txt` descriptions in a directory, sorted by clip offset.
///
/// Files that merely look like clips but carry an unparsable name are
/// skipped with a warning. When both a plain and a `_compressed` description
/// exist for one offset, the compressed one is kept.
pub async fn scan_description_dir(dir: &Path) -> IngestResult<Vec<ClipSource>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut clips: Vec<ClipSource> = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_description = path.extension().is_some_and(|e| e == "txt")
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("clip_"));
        if !is_description {
            debug!(path = %path.display(), "Ignoring non-description file");
            continue;
        }

        match ClipSource::from_path(&path) {
            Ok(clip) => clips.push(clip),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping clip file"),
        }
    }

    // Within one offset the compressed twin sorts first and survives dedup
    clips.sort_by(|a, b| {
        a.offset_secs
            .cmp(&b.offset_secs)
            .then_with(|| b.path.cmp(&a.path))
    });
    clips.dedup_by_key(|c| c.offset_secs);
    Ok(clips)
}
