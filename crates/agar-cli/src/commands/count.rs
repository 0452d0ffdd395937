use std::collections::HashSet;
use std::path::{Path, PathBuf};

use agar_core::io::{load_image, save_rgb};
use agar_core::pipeline::{analyze, sink_for};
use agar_core::{ColonyReport, PipelineConfig};
use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

#[derive(Args)]
pub struct CountArgs {
    /// Dish photographs to analyse
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory for annotated images and JSON reports
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Pipeline config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write numbered intermediate images under this directory
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// Print reports as JSON instead of a summary table
    #[arg(long)]
    pub json: bool,
}

/// Outcome for one input file.
pub struct FileOutcome {
    pub file: PathBuf,
    pub result: Result<ColonyReport>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a ColonyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(args: &CountArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(ref dir) = args.debug_dir {
        config.debug_directory = Some(dir.clone());
    }
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    if !args.json {
        crate::summary::print_config_summary(&config, args.files.len());
    }

    let pb = ProgressBar::new(args.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Counting colonies");

    let stems = output_stems(&args.files);
    let outcomes: Vec<FileOutcome> = args
        .files
        .par_iter()
        .zip(stems.par_iter())
        .map(|(file, stem)| {
            let result = process_file(file, stem, &config, &args.output);
            if let Err(ref e) = result {
                warn!(file = %file.display(), error = %e, "Analysis failed");
            }
            pb.inc(1);
            FileOutcome {
                file: file.clone(),
                result,
            }
        })
        .collect();
    pb.finish_and_clear();

    if args.json {
        let entries: Vec<JsonEntry> = outcomes
            .iter()
            .map(|o| JsonEntry {
                file: o.file.display().to_string(),
                report: o.result.as_ref().ok(),
                error: o.result.as_ref().err().map(|e| format!("{e:#}")),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        crate::summary::print_count_results(&outcomes, &args.output);
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} images failed", outcomes.len());
    }
    Ok(())
}

/// Output name per input file. Repeated stems get `_2`, `_3`, ... so inputs
/// from different directories never overwrite each other's results.
fn output_stems(files: &[PathBuf]) -> Vec<String> {
    let mut taken = HashSet::new();
    files
        .iter()
        .map(|file| {
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let mut candidate = stem.clone();
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{stem}_{n}");
                n += 1;
            }
            if candidate != stem {
                warn!(
                    file = %file.display(),
                    output = %candidate,
                    "Duplicate file stem, renaming outputs"
                );
            }
            candidate
        })
        .collect()
}

/// Analyse one image and write `<stem>_colonies.png` and `<stem>_colonies.json`.
fn process_file(
    file: &Path,
    stem: &str,
    config: &PipelineConfig,
    output_dir: &Path,
) -> Result<ColonyReport> {
    let image =
        load_image(file).with_context(|| format!("Failed to load {}", file.display()))?;
    let sink = sink_for(config).context("Failed to prepare debug directory")?;
    let analysis = analyze(&image, config, sink.as_ref())?;

    let image_path = output_dir.join(format!("{stem}_colonies.png"));
    save_rgb(&analysis.image, &image_path)
        .with_context(|| format!("Failed to write {}", image_path.display()))?;

    let report_path = output_dir.join(format!("{stem}_colonies.json"));
    std::fs::write(&report_path, serde_json::to_string_pretty(&analysis.report)?)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;

    Ok(analysis.report)
}
