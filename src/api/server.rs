//! Analysis API server lifecycle: starts/stops the axum HTTP server.
//!
//! Pattern: bind → spawn background task → return handle with shutdown
//! channel. The caller decides when to stop (Ctrl-C in the CLI, drop in
//! tests).

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::router::analysis_router;
use crate::api::types::ApiContext;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// Session metadata for a running server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSession {
    pub session_id: String,
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running server.
pub struct ApiServer {
    pub session: ApiSession,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ApiServer {
    /// Base URL clients should use, e.g. `http://127.0.0.1:3000`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.session.server_addr)
    }

    /// Send the shutdown signal. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Shut down and wait for in-flight requests to finish.
    pub async fn stop(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("API server task failed: {e}");
            }
        }
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `addr` and serve the analysis router in a background task.
///
/// Port 0 picks an ephemeral port; the chosen address is in the session.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> std::io::Result<ApiServer> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    let app = analysis_router(ctx);

    let session = ApiSession {
        session_id: Uuid::new_v4().to_string(),
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        session,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
