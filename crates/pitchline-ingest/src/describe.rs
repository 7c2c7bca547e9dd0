//! Clip describing with bounded concurrency.
//!
//! A [`ClipDescriber`] turns one clip into description text. The text
//! source is pluggable: the bundled [`FileDescriber`] reads sidecar files,
//! while a model-backed describer would call out to a service. Timeouts and
//! retries belong to the implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::join_all;
use pitchline_models::{parse_clip_stem, ObservationRecord};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};
use crate::parser::parse_description;

/// Suffix left by the description compression pass.
const COMPRESSED_SUFFIX: &str = "_compressed";

/// A clip located by its start offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSource {
    /// Clip start, seconds from video start
    pub offset_secs: u32,

    /// Clip or description file
    pub path: PathBuf,
}

impl ClipSource {
    /// Locate a clip from a `clip_MMmSSs` file name.
    pub fn from_path(path: impl Into<PathBuf>) -> IngestResult<Self> {
        let path = path.into();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| IngestError::InvalidClipName(path.clone()))?;
        let stem = stem.strip_suffix(COMPRESSED_SUFFIX).unwrap_or(stem);
        let offset_secs =
            parse_clip_stem(stem).map_err(|_| IngestError::InvalidClipName(path.clone()))?;
        Ok(Self { offset_secs, path })
    }
}

/// Produces a text description for one clip.
#[async_trait]
pub trait ClipDescriber: Send + Sync {
    /// Describer name for logs.
    fn name(&self) -> &'static str;

    /// Describe one clip.
    async fn describe(&self, clip: &ClipSource) -> IngestResult<String>;
}

/// Reads a `.txt` description next to each clip.
#[derive(Debug, Clone, Default)]
pub struct FileDescriber;

impl FileDescriber {
    pub fn new() -> Self {
        Self
    }

    fn sidecar(path: &Path) -> PathBuf {
        path.with_extension("txt")
    }
}

#[async_trait]
impl ClipDescriber for FileDescriber {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn describe(&self, clip: &ClipSource) -> IngestResult<String> {
        let text = tokio::fs::read_to_string(Self::sidecar(&clip.path)).await?;
        Ok(text)
    }
}

/// Record standing in for a clip whose description failed.
fn failed_record(clip: &ClipSource, clip_duration: u32) -> ObservationRecord {
    ObservationRecord {
        clip_index: (clip.offset_secs % clip_duration == 0).then(|| clip.offset_secs / clip_duration),
        start_offset_secs: Some(clip.offset_secs),
        ..ObservationRecord::default()
    }
}

/// Describe and parse every clip, at most `config.pool_size` at a time.
///
/// Returns one record per clip sorted by offset. A failed clip still
/// yields a record, carrying no confidence, so synthesis reports it as a
/// gap instead of silently shifting the timeline.
pub async fn describe_clips<D>(
    describer: &D,
    clips: &[ClipSource],
    config: &IngestConfig,
    clip_duration_secs: u32,
) -> Vec<ObservationRecord>
where
    D: ClipDescriber + ?Sized,
{
    let clip_duration = clip_duration_secs.max(1);
    let semaphore = Semaphore::new(config.pool_size.max(1));

    info!(
        describer = describer.name(),
        clips = clips.len(),
        pool_size = config.pool_size,
        "Describing clips"
    );

    let futures: Vec<_> = clips
        .iter()
        .map(|clip| {
            let semaphore = &semaphore;
            async move {
                let text = match semaphore.acquire().await {
                    Ok(_permit) => describer.describe(clip).await,
                    Err(e) => Err(IngestError::describe(clip.offset_secs, e.to_string())),
                };
                match text {
                    Ok(text) => parse_description(clip.offset_secs, &text, config, clip_duration),
                    Err(e) => {
                        warn!(
                            offset_secs = clip.offset_secs,
                            path = %clip.path.display(),
                            error = %e,
                            "Failed to describe clip"
                        );
                        failed_record(clip, clip_duration)
                    }
                }
            }
        })
        .collect();

    let mut records = join_all(futures).await;
    records.sort_by_key(|r| (r.start_offset_secs, r.clip_index));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedDescriber {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedDescriber {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ClipDescriber for ScriptedDescriber {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn describe(&self, clip: &ClipSource) -> IngestResult<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if clip.offset_secs == 30 {
                return Err(IngestError::describe(30, "model timed out"));
            }
            Ok(format!("KICKOUT: YES\nCONFIDENCE: 8\nTIMESTAMP: {:02}:{:02}", clip.offset_secs / 60, clip.offset_secs % 60))
        }
    }

    fn clip(offset: u32) -> ClipSource {
        ClipSource {
            offset_secs: offset,
            path: PathBuf::from(format!("clip_{:02}m{:02}s.mp4", offset / 60, offset % 60)),
        }
    }

    #[test]
    fn test_clip_source_from_path() {
        let c = ClipSource::from_path("/tmp/clips/clip_02m15s.txt").unwrap();
        assert_eq!(c.offset_secs, 135);
        let c = ClipSource::from_path("clip_00m30s_compressed.txt").unwrap();
        assert_eq!(c.offset_secs, 30);
        assert!(matches!(
            ClipSource::from_path("notes.txt"),
            Err(IngestError::InvalidClipName(_))
        ));
    }

    #[tokio::test]
    async fn test_describe_clips_bounded_and_sorted() {
        let describer = ScriptedDescriber::new();
        let clips: Vec<ClipSource> = (0..12).rev().map(|i| clip(i * 15)).collect();
        let config = IngestConfig::default().with_pool_size(3);

        let records = describe_clips(&describer, &clips, &config, 15).await;

        assert_eq!(records.len(), 12);
        assert!(describer.peak.load(Ordering::SeqCst) <= 3);
        let offsets: Vec<u32> = records.iter().filter_map(|r| r.start_offset_secs).collect();
        assert_eq!(offsets, (0..12).map(|i| i * 15).collect::<Vec<_>>());

        let failed = &records[2];
        assert_eq!(failed.clip_index, Some(2));
        assert_eq!(failed.confidence, None);
        assert_eq!(records[3].confidence, Some(0.8));
    }

    #[tokio::test]
    async fn test_file_describer_reads_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip_00m45s.mp4");
        tokio::fs::write(dir.path().join("clip_00m45s.txt"), "CATEGORY: ACTIVE_PLAY\nCONFIDENCE: 9")
            .await
            .unwrap();

        let source = ClipSource::from_path(&video).unwrap();
        let text = FileDescriber::new().describe(&source).await.unwrap();
        assert!(text.contains("ACTIVE_PLAY"));

        let missing = ClipSource::from_path(dir.path().join("clip_01m00s.mp4")).unwrap();
        assert!(FileDescriber::new().describe(&missing).await.is_err());
    }

    #[test]
    fn test_describe_clips_with_tokio_test_runtime() {
        let records = tokio_test::block_on(describe_clips(
            &ScriptedDescriber::new(),
            &[clip(15)],
            &IngestConfig::default(),
            15,
        ));
        assert_eq!(records[0].clip_index, Some(1));
    }
}
