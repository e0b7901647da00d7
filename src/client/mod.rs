//! Client side of the analysis flow.
//!
//! Holds the two card images a user selected, normalizes them before they
//! leave the machine, submits them once to `POST /api/analyze` and renders
//! the returned fields. Screens are abstracted behind small ports
//! (`PreviewSink`, `AnalysisTransport`) so the same flow drives the CLI
//! and tests.

pub mod render;
pub mod request;
pub mod session;
pub mod upload;

pub use render::{render_entries, DisplayEntry, ResultView};
pub use request::{
    AnalysisClient, AnalysisError, AnalysisErrorKind, AnalysisTransport, AnalyzeBody,
    HttpTransport, TransportError,
};
pub use session::{ImagePayload, Slot, UploadSession};
pub use upload::{LogPreview, PreviewSink, SelectedFile, UploadController};
