//! Command implementations.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pitchline_ingest::{describe_clips, scan_description_dir, FileDescriber};
use pitchline_models::Timeline;
use pitchline_synthesis::{synthesize_timeline, SynthesisConfig};
use serde::Serialize;
use tracing::Instrument;

use crate::cli::{Commands, SynthesizeArgs};
use crate::logging::RunLogger;

/// Run manifest file name.
pub const MANIFEST_FILE: &str = "run.json";

/// Bookkeeping for one synthesis run, written next to the exports.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub run_id: String,
    pub operation: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub clip_count: usize,
    pub gap_count: usize,
    pub event_count: usize,
    pub fully_resolved: bool,
    pub elapsed_ms: u64,
    pub config: SynthesisConfig,
    pub outputs: Vec<PathBuf>,
}

/// Dispatch a parsed command.
pub async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Synthesize(args) => {
            let manifest = run_synthesize(&args).await?;
            println!(
                "Wrote {} events ({} gaps) to {}",
                manifest.event_count,
                manifest.gap_count,
                manifest.output_dir.display()
            );
            Ok(())
        }
        Commands::Schema => {
            println!("{}", render_schema()?);
            Ok(())
        }
    }
}

/// Timeline JSON schema.
pub fn render_schema() -> Result<String> {
    let schema = schemars::schema_for!(Timeline);
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// Scan, describe, synthesize and export one match.
pub async fn run_synthesize(args: &SynthesizeArgs) -> Result<RunManifest> {
    let logger = RunLogger::new("synthesize");
    let span = logger.create_span();

    async {
        let started_at = Utc::now();
        let timer = Instant::now();

        let config = args
            .synthesis_config()
            .context("Invalid synthesis configuration")?;
        let ingest = args.ingest_config();
        logger.log_start(&format!("input {}", args.input_dir.display()));

        let clips = scan_description_dir(&args.input_dir)
            .await
            .with_context(|| format!("Failed to scan {}", args.input_dir.display()))?;
        if clips.is_empty() {
            logger.log_warning("no clip descriptions found");
        }
        logger.log_progress(&format!("found {} clip descriptions", clips.len()));

        let records =
            describe_clips(&FileDescriber::new(), &clips, &ingest, config.clip_duration_secs).await;
        let timeline = synthesize_timeline(records, &config)?;
        if !timeline.is_fully_resolved() {
            logger.log_warning("one or more phase boundaries could not be resolved");
        }

        let outputs = pitchline_export::export_all(&timeline, &args.output_dir)
            .with_context(|| format!("Failed to write exports to {}", args.output_dir.display()))?;

        let manifest = RunManifest {
            run_id: logger.run_id().to_string(),
            operation: logger.operation().to_string(),
            started_at,
            finished_at: Utc::now(),
            input_dir: args.input_dir.clone(),
            output_dir: args.output_dir.clone(),
            clip_count: clips.len(),
            gap_count: timeline.gaps.len(),
            event_count: timeline.events.len(),
            fully_resolved: timeline.is_fully_resolved(),
            elapsed_ms: timer.elapsed().as_millis() as u64,
            config,
            outputs,
        };
        write_manifest(&manifest, &args.output_dir)?;

        logger.log_completion(&format!(
            "{} events, {} gaps in {}ms",
            manifest.event_count, manifest.gap_count, manifest.elapsed_ms
        ));
        Ok::<_, anyhow::Error>(manifest)
    }
    .instrument(span)
    .await
}

fn write_manifest(manifest: &RunManifest, dir: &Path) -> Result<()> {
    let path = dir.join(MANIFEST_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(manifest)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
