use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use espboard_core::{parse_core_list, CoreSource, Dataset};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Collect board and partition data from installed Arduino cores.
#[derive(Parser)]
struct Cli {
    /// Output of `arduino-cli core list`
    #[clap(long)]
    core_list: PathBuf,

    /// arduino-cli packages directory (e.g. ~/.arduino15/packages)
    #[clap(long)]
    packages: PathBuf,

    /// Data directory to write
    #[clap(long, default_value = "data")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let text = fs::read_to_string(&cli.core_list)
        .with_context(|| format!("reading {}", cli.core_list.display()))?;
    let cores = parse_core_list(&text);
    tracing::info!("Found {} installed cores", cores.len());

    let sources: Vec<CoreSource> = cores
        .into_iter()
        .map(|info| CoreSource::installed(&cli.packages, info))
        .collect();

    let dataset = Dataset::from_cores(&sources).context("collecting core data")?;
    dataset
        .save(&cli.out)
        .with_context(|| format!("writing dataset to {}", cli.out.display()))?;

    tracing::info!(
        esp8266_boards = dataset.esp8266_boards.len(),
        esp32_boards = dataset.esp32_boards.len(),
        partition_boards = dataset.partitions.len(),
        "Dataset written to {}",
        cli.out.display()
    );
    Ok(())
}
