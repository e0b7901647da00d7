pub mod api; // HTTP analysis endpoint
pub mod cli;
pub mod client; // Upload, request and rendering flow
pub mod commands;
pub mod config;
pub mod models;
pub mod pipeline; // Normalization + vision model access

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub fn run() -> ExitCode {
    let cli = cli::Cli::parse();

    // Initialize tracing on stderr so `--json` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
