//! Subcommand handlers behind the `hawiya` binary.

pub mod analyze;
pub mod serve;

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::cli::{Cli, Commands};
use crate::client::request::{AnalysisError, TransportError};
use crate::config::ConfigError;
use crate::pipeline::normalize::NormalizeConfig;
use crate::pipeline::vision::VisionError;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vision client error: {0}")]
    Vision(#[from] VisionError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{}", .0.display_text())]
    Analysis(#[from] AnalysisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Envelope for `--json` output.
#[derive(Debug, Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Run the parsed command to completion.
pub fn dispatch(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Serve { bind, static_dir } => serve::serve(bind, static_dir),
        Commands::Analyze {
            front,
            back,
            server,
            timeout_secs,
            fast_resize,
        } => {
            let normalize = if fast_resize {
                NormalizeConfig::fast()
            } else {
                NormalizeConfig::default()
            };
            analyze::analyze(&front, &back, &server, timeout_secs, normalize, cli.json)
        }
    }
}
