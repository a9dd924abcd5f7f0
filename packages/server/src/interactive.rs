//! Interactive mode for the server.
//!
//! Prompts for the dataset, the directory holding the generated page, and
//! the listen address before starting the server.

use dialoguer::{Confirm, Input};

/// Prompts for one setting, falling back to the current environment
/// value (or `default`) when the prompt cannot be shown.
fn prompt_env(prompt: &str, var: &str, default: &str) -> String {
    let current = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Input::new()
        .with_prompt(prompt)
        .default(current.clone())
        .interact_text()
        .unwrap_or(current)
}

/// Runs the server in interactive mode, prompting for configuration.
///
/// The answers are exported as `RISK_MAP_DATA`, `RISK_MAP_OUTPUT_DIR`,
/// `BIND_ADDR`, and `PORT`, then [`super::run_server`] takes over.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Risk Map Server");
    println!();

    let data = prompt_env(
        "Dataset file path or URL",
        "RISK_MAP_DATA",
        risk_map_loader::DEFAULT_DATASET_PATH,
    );
    let output_dir = prompt_env(
        "Directory with the generated page",
        "RISK_MAP_OUTPUT_DIR",
        "data/generated",
    );
    let bind_addr = prompt_env("Bind address", "BIND_ADDR", "127.0.0.1");
    let port = prompt_env("Port", "PORT", "8080");

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("RISK_MAP_DATA", &data);
        std::env::set_var("RISK_MAP_OUTPUT_DIR", &output_dir);
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port);
    }

    if !Confirm::new()
        .with_prompt(format!("Serve {data} on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
