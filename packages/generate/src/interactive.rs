//! Interactive menu for the generate tool.
//!
//! Provides a terminal-based UI using `dialoguer` that lets users select
//! which outputs to generate and where the dataset lives without
//! memorizing CLI flags.

use std::path::{Path, PathBuf};

use dialoguer::{Input, Select};

use crate::{
    ALL_OUTPUTS, GenerateArgs, MapConfig, OUTPUT_MARKERS, OUTPUT_PAGE, OUTPUT_SUMMARY, output_dir,
    run as run_outputs,
};

/// Runs the interactive generation menu.
///
/// Prompts for the outputs, an optional config file, the dataset
/// location, and the output directory, then runs the generator.
///
/// # Errors
///
/// Returns an error if user input, config loading, or generation fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let choices = &[
        "Generate all outputs",
        "Generate marker GeoJSON",
        "Generate map page",
        "Generate dataset summary",
    ];

    let selection = Select::new()
        .with_prompt("What would you like to generate?")
        .items(choices)
        .default(0)
        .interact()?;

    let requested_outputs: &[&str] = match selection {
        0 => ALL_OUTPUTS,
        1 => &[OUTPUT_MARKERS],
        2 => &[OUTPUT_PAGE],
        3 => &[OUTPUT_SUMMARY],
        _ => unreachable!(),
    };

    let config_str: String = Input::new()
        .with_prompt("Map config TOML (leave empty for defaults)")
        .allow_empty(true)
        .interact_text()?;

    let config_path = (!config_str.trim().is_empty()).then(|| PathBuf::from(config_str.trim()));
    let config = MapConfig::load(config_path.as_deref())?;

    let default_source = config.dataset_source(None).to_string();
    let data: String = Input::new()
        .with_prompt("Dataset file path or URL")
        .default(default_source)
        .interact_text()?;

    let dir: String = Input::new()
        .with_prompt("Output directory")
        .default(output_dir().display().to_string())
        .interact_text()?;

    let args = GenerateArgs {
        source: config.dataset_source(Some(&data)),
        config,
    };

    run_outputs(&args, Path::new(dir.trim()), requested_outputs).await?;

    Ok(())
}
