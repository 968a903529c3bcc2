use anyhow::Context;
use clap::{Parser, ValueEnum};
use salicyl_vision::batch::{BatchAnalyzer, FileOutcome};
use salicyl_vision::config::Settings;
use salicyl_vision::pipeline::{BandMode, ConcentrationPipeline, Report};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "salicyl_vision")]
#[command(version, about = "Estimate salicylic acid concentration regions in images", long_about = None)]
struct Cli {
    /// Images to analyse (jpg, jpeg, png, bmp)
    #[arg(value_name = "IMAGES", required = true)]
    images: Vec<PathBuf>,

    /// Settings file (toml, yaml or json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Block edge length in pixels
    #[arg(short, long, value_name = "N")]
    block_size: Option<u32>,

    /// Highlight the mode-to-max range or only the mode value
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Write highlighted copies of each image into this directory
    #[arg(short, long, value_name = "DIR")]
    annotate_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Range,
    Single,
}

impl From<ModeArg> for BandMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Range => BandMode::Range,
            ModeArg::Single => BandMode::Single,
        }
    }
}

#[derive(Serialize)]
struct JsonOutcome<'a> {
    path: &'a PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<&'a salicyl_vision::batch::ImageAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_human(outcome: &FileOutcome) {
    let name = outcome.path.display();
    match &outcome.result {
        Ok(analysis) => match &analysis.report {
            Report::Region(region) => {
                println!("{}: {}", name, region.summary());
                if let Some((low, high)) = region.histogram.peak_interval() {
                    println!(
                        "{}: most blocks between {:.2}% and {:.2}%",
                        name,
                        low * 100.0,
                        high * 100.0
                    );
                }
                if let Some(path) = &analysis.annotated {
                    println!("{}: highlighted copy saved to {}", name, path.display());
                }
            }
            Report::NoValidRegion { .. } | Report::NoBlocks => {
                println!(
                    "{}: no valid salicylic acid concentration blocks detected",
                    name
                );
            }
        },
        Err(e) => eprintln!("{}: error: {}", name, e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(block_size) = cli.block_size {
        settings.analysis.block_size = block_size;
    }
    if let Some(mode) = cli.mode {
        settings.analysis.band_mode = mode.into();
    }
    settings.validate().context("validating settings")?;

    if let Some(dir) = &cli.annotate_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    let pipeline = ConcentrationPipeline::new(settings.analysis.clone())?;
    let analyzer = BatchAnalyzer::new(pipeline, settings.overlay, &settings.batch);
    info!(
        images = cli.images.len(),
        concurrency = settings.batch.concurrency(),
        "starting analysis"
    );

    let outcomes = analyzer
        .analyze_paths(cli.images.clone(), cli.annotate_dir.clone())
        .await;

    if cli.json {
        let rows: Vec<JsonOutcome> = outcomes
            .iter()
            .map(|outcome| JsonOutcome {
                path: &outcome.path,
                analysis: outcome.result.as_ref().ok(),
                error: outcome.result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        outcomes.iter().for_each(print_human);
    }

    let failures = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failures > 0 {
        anyhow::bail!("{} of {} images failed", failures, outcomes.len());
    }
    Ok(())
}
