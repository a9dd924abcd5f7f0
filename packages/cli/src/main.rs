#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive CLI orchestrator for the risk map toolchain.
//!
//! Provides a single entry point that lets users pick which tool to run
//! (generate the map outputs or start the server) and guides them through
//! its configuration.

use dialoguer::Select;

/// Top-level tool selection for the risk map toolchain.
enum Tool {
    Generate,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[Self::Generate, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Generate => "Generate map outputs",
            Self::Server => "Start server",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    println!("Risk Map Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    log::debug!("Selected tool: {}", labels[idx]);

    match Tool::ALL[idx] {
        Tool::Generate => risk_map_generate::interactive::run().await?,
        Tool::Server => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(risk_map_server::interactive::run())
            })
            .await??;
        }
    }

    Ok(())
}
