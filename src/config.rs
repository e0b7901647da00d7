//! Application constants and environment-driven configuration.
//!
//! The server reads its settings once at startup. The vendor credential is
//! optional at load time: its absence is reported per request by the analyze
//! endpoint, so a misconfigured server still answers health checks.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Hawiya";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the vendor API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "HAWIYA_MODEL";
pub const VENDOR_URL_VAR: &str = "HAWIYA_VENDOR_URL";
pub const VENDOR_TIMEOUT_VAR: &str = "HAWIYA_VENDOR_TIMEOUT_SECS";
pub const BIND_ADDR_VAR: &str = "HAWIYA_BIND_ADDR";
pub const STATIC_DIR_VAR: &str = "HAWIYA_STATIC_DIR";

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_VENDOR_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_VENDOR_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
/// Where `hawiya analyze` sends images when `--server` is not given.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Tracing filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,hawiya_lib=debug"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the analysis server.
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Vendor API key. `None` when unset or blank.
    pub api_key: Option<String>,
    pub model: String,
    /// Base URL of the vendor REST API, without trailing slash.
    pub vendor_url: String,
    pub vendor_timeout_secs: u64,
    pub bind_addr: SocketAddr,
    /// Optional directory of browser assets served at `/`.
    pub static_dir: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let vendor_timeout_secs = match non_blank(VENDOR_TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                Ok(_) => {
                    return Err(ConfigError::InvalidValue {
                        var: VENDOR_TIMEOUT_VAR,
                        value: raw,
                        reason: "must be greater than zero".into(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        var: VENDOR_TIMEOUT_VAR,
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_VENDOR_TIMEOUT_SECS,
        };

        let bind_raw = non_blank(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                var: BIND_ADDR_VAR,
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            api_key: non_blank(API_KEY_VAR).map(|k| k.trim().to_string()),
            model: non_blank(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            vendor_url: non_blank(VENDOR_URL_VAR)
                .unwrap_or_else(|| DEFAULT_VENDOR_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            vendor_timeout_secs,
            bind_addr,
            static_dir: non_blank(STATIC_DIR_VAR).map(PathBuf::from),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

// The key never reaches logs.
impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("vendor_url", &self.vendor_url)
            .field("vendor_timeout_secs", &self.vendor_timeout_secs)
            .field("bind_addr", &self.bind_addr)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}
