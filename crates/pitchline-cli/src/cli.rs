//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pitchline_ingest::IngestConfig;
use pitchline_synthesis::{SynthesisConfig, SynthesisResult};

#[derive(Debug, Parser)]
#[command(name = "pitchline")]
#[command(about = "GAA match phase segmentation and kickout detection", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a match timeline from clip descriptions
    Synthesize(SynthesizeArgs),
    /// Print the JSON schema of the timeline output
    Schema,
}

#[derive(Debug, Clone, Args)]
pub struct SynthesizeArgs {
    /// Directory of `clip_MMmSSs.txt` descriptions
    #[arg(long, env = "PITCHLINE_INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory for timeline.json, website.json, summary.txt and run.json
    #[arg(long, env = "PITCHLINE_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// JSON synthesis config; replaces PITCHLINE_* environment settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub clip_duration: Option<u32>,

    #[arg(long)]
    pub min_halftime_gap: Option<u32>,

    #[arg(long)]
    pub max_halftime_gap: Option<u32>,

    #[arg(long)]
    pub merge_window: Option<u32>,

    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Concurrent describer tasks
    #[arg(long, env = "PITCHLINE_WORKERS")]
    pub workers: Option<usize>,
}

impl SynthesizeArgs {
    /// Layer command-line flags over a base config.
    pub fn apply_overrides(&self, mut config: SynthesisConfig) -> SynthesisConfig {
        if let Some(v) = self.clip_duration {
            config.clip_duration_secs = v;
        }
        if let Some(v) = self.min_halftime_gap {
            config.min_halftime_gap_secs = v;
        }
        if let Some(v) = self.max_halftime_gap {
            config.max_halftime_gap_secs = v;
        }
        if let Some(v) = self.merge_window {
            config.merge_window_secs = v;
        }
        if let Some(v) = self.min_confidence {
            config.min_candidate_confidence = v;
        }
        config
    }

    /// Resolve the synthesis config: file or environment, then flags.
    pub fn synthesis_config(&self) -> anyhow::Result<SynthesisConfig> {
        let base = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                SynthesisConfig::from_json_str(&text)?
            }
            None => SynthesisConfig::from_env()?,
        };
        Ok(check_config(self, base)?)
    }

    /// Resolve the ingest config from the environment and flags.
    pub fn ingest_config(&self) -> IngestConfig {
        let config = IngestConfig::from_env();
        match self.workers {
            Some(n) => config.with_pool_size(n),
            None => config,
        }
    }
}

/// Validate a config without touching the filesystem.
pub fn check_config(args: &SynthesizeArgs, base: SynthesisConfig) -> SynthesisResult<SynthesisConfig> {
    let config = args.apply_overrides(base);
    config.validate()?;
    Ok(config)
}
