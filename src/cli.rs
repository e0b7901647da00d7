use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_SERVER_URL;

#[derive(Parser, Debug)]
#[command(name = "hawiya", version, about = "ID card field extraction")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the analysis server.
    Serve {
        #[arg(long, help = "Listen address (overrides HAWIYA_BIND_ADDR)")]
        bind: Option<SocketAddr>,
        #[arg(long, help = "Directory of browser assets served at /")]
        static_dir: Option<PathBuf>,
    },
    /// Normalize two card images and submit them to a running server.
    Analyze {
        #[arg(long, help = "Image of the card front")]
        front: PathBuf,
        #[arg(long, help = "Image of the card back")]
        back: PathBuf,
        #[arg(long, default_value = DEFAULT_SERVER_URL, help = "Server root URL")]
        server: String,
        #[arg(long, default_value_t = 180, help = "Request timeout in seconds")]
        timeout_secs: u64,
        #[arg(long, default_value_t = false, help = "Bilinear resampling (faster, softer text)")]
        fast_resize: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_with_defaults() {
        let cli = Cli::try_parse_from([
            "hawiya", "analyze", "--front", "f.jpg", "--back", "b.jpg",
        ])
        .unwrap();
        assert!(!cli.json);
        let Commands::Analyze {
            front,
            back,
            server,
            timeout_secs,
            fast_resize,
        } = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(front, PathBuf::from("f.jpg"));
        assert_eq!(back, PathBuf::from("b.jpg"));
        assert_eq!(server, DEFAULT_SERVER_URL);
        assert_eq!(timeout_secs, 180);
        assert!(!fast_resize);
    }

    #[test]
    fn parses_fast_resize_flag() {
        let cli = Cli::try_parse_from([
            "hawiya", "analyze", "--front", "f", "--back", "b", "--fast-resize",
        ])
        .unwrap();
        let Commands::Analyze { fast_resize, .. } = cli.command else {
            panic!("expected analyze");
        };
        assert!(fast_resize);
    }

    #[test]
    fn json_flag_is_global() {
        let cli = Cli::try_parse_from([
            "hawiya", "analyze", "--front", "f", "--back", "b", "--json",
        ])
        .unwrap();
        assert!(cli.json);
    }

    #[test]
    fn analyze_requires_both_sides() {
        assert!(Cli::try_parse_from(["hawiya", "analyze", "--front", "f"]).is_err());
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from([
            "hawiya",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--static-dir",
            "public",
        ])
        .unwrap();
        let Commands::Serve { bind, static_dir } = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(bind, Some("0.0.0.0:8080".parse().unwrap()));
        assert_eq!(static_dir, Some(PathBuf::from("public")));
    }

    #[test]
    fn rejects_bad_bind_address() {
        assert!(Cli::try_parse_from(["hawiya", "serve", "--bind", "nope"]).is_err());
    }
}
