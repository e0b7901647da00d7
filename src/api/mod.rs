//! HTTP API for card analysis.
//!
//! Exposes `POST /api/analyze`, which forwards two normalized card images
//! to the vision model and returns the extracted fields, plus a health
//! check. The router is composable: `analysis_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::analysis_router;
pub use server::{start_server, ApiServer, ApiSession};
pub use types::ApiContext;
