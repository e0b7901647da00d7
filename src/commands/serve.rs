//! `hawiya serve`: run the analysis endpoint until Ctrl-C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::server::start_server;
use crate::api::types::ApiContext;
use crate::commands::CommandError;
use crate::config::{AnalysisConfig, APP_NAME, APP_VERSION};
use crate::pipeline::vision::{GeminiClient, VisionModel};

/// Apply CLI overrides on top of the environment configuration.
pub fn resolve_config(
    mut config: AnalysisConfig,
    bind: Option<SocketAddr>,
    static_dir: Option<PathBuf>,
) -> AnalysisConfig {
    if let Some(bind) = bind {
        config.bind_addr = bind;
    }
    if static_dir.is_some() {
        config.static_dir = static_dir;
    }
    config
}

pub fn serve(bind: Option<SocketAddr>, static_dir: Option<PathBuf>) -> Result<(), CommandError> {
    let config = resolve_config(AnalysisConfig::from_env()?, bind, static_dir);

    tracing::info!(
        app = APP_NAME,
        version = APP_VERSION,
        model = %config.model,
        static_dir = ?config.static_dir,
        "Starting analysis server"
    );
    if !config.has_credential() {
        tracing::warn!("GEMINI_API_KEY is not set; analyze requests will fail");
    }

    // The blocking client is built here and its last handle dropped here,
    // never on a runtime thread.
    let vision: Arc<dyn VisionModel> = Arc::new(GeminiClient::new(
        &config.vendor_url,
        config.vendor_timeout_secs,
    )?);
    let bind_addr = config.bind_addr;
    let ctx = ApiContext::new(config, vision.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async move {
        let server = start_server(ctx, bind_addr).await?;
        tracing::info!(url = %server.base_url(), session = %server.session.session_id, "Listening");

        tokio::signal::ctrl_c().await?;
        tracing::info!("Ctrl-C received, shutting down");
        server.stop().await;
        Ok::<(), CommandError>(())
    });

    drop(runtime);
    drop(vision);
    result
}
