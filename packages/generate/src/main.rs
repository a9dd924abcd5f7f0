#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI tool for generating the risk map outputs.
//!
//! Renders `data_final.json` into `markers.geojson`, writes the static
//! Leaflet page that displays it, and summarizes the dataset.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use risk_map_generate::{
    ALL_OUTPUTS, GenerateArgs, MapConfig, OUTPUT_MARKERS, OUTPUT_PAGE, OUTPUT_SUMMARY, output_dir,
    run,
};

#[derive(Parser)]
#[command(name = "risk_map_generate", about = "Risk map generation tool")]
struct Cli {
    /// Map config TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset file path or URL (overrides the config)
    #[arg(long, global = true)]
    data: Option<String>,

    /// Directory the outputs are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the marker `GeoJSON`
    Geojson,
    /// Generate the static map page
    Page,
    /// Log the dataset summary and write `summary.json`
    Summary,
    /// Generate every output plus `metadata.json`
    All,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = MapConfig::load(cli.config.as_deref())?;
    let args = GenerateArgs {
        source: config.dataset_source(cli.data.as_deref()),
        config,
    };
    let dir = cli.output_dir.unwrap_or_else(output_dir);

    let requested_outputs: &[&str] = match cli.command {
        Commands::Geojson => &[OUTPUT_MARKERS],
        Commands::Page => &[OUTPUT_PAGE],
        Commands::Summary => &[OUTPUT_SUMMARY],
        Commands::All => ALL_OUTPUTS,
    };

    run(&args, &dir, requested_outputs).await
}
