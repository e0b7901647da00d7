//! Analysis request client: validates the session, submits both images
//! once, and maps every failure to a user-facing Arabic message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::session::{Slot, UploadSession};
use crate::models::identity::IdentityRecord;

/// Shown when a side is missing: "Please upload both images (front and back)".
pub const MISSING_IMAGES_MESSAGE: &str = "برجاء رفع الصورتين (الأمامية والخلفية)";

/// Shown for any submission failure: "An error occurred while analyzing the
/// data. Try again."
pub const ANALYSIS_FAILED_MESSAGE: &str = "حدث خطأ أثناء تحليل البيانات. حاول مرة أخرى.";

/// Shown when the trigger is pressed during a submission: "Analysis in
/// progress, please wait".
pub const BUSY_MESSAGE: &str = "جاري تحليل البيانات، برجاء الانتظار";

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    /// One or both slots empty; nothing was sent.
    MissingImages,
    /// Another submission is still outstanding; nothing was sent.
    Busy,
    /// Transport, server or response failure.
    Failed,
}

/// User-facing analysis failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AnalysisError {
    pub kind: AnalysisErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl AnalysisError {
    pub fn missing_images() -> Self {
        Self {
            kind: AnalysisErrorKind::MissingImages,
            message: MISSING_IMAGES_MESSAGE.to_string(),
            detail: None,
        }
    }

    pub fn busy() -> Self {
        Self {
            kind: AnalysisErrorKind::Busy,
            message: BUSY_MESSAGE.to_string(),
            detail: None,
        }
    }

    pub fn failed(detail: Option<String>) -> Self {
        Self {
            kind: AnalysisErrorKind::Failed,
            message: ANALYSIS_FAILED_MESSAGE.to_string(),
            detail,
        }
    }

    /// Message plus detail, as shown inline to the user.
    pub fn display_text(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{} ({detail})", self.message),
            None => self.message.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned status {status}")]
    Server { status: u16, detail: Option<String> },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Best available human-readable detail.
    pub fn detail(&self) -> String {
        match self {
            TransportError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            other => other.to_string(),
        }
    }
}

// ──────────────────────────────────────────────
// Transport
// ──────────────────────────────────────────────

/// JSON body of `POST /api/analyze`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody<'a> {
    pub front_image: &'a str,
    pub back_image: &'a str,
}

/// Delivers an analysis request to the backend (allows mocking).
pub trait AnalysisTransport: Send + Sync {
    fn submit(&self, body: &AnalyzeBody<'_>) -> Result<IdentityRecord, TransportError>;
}

/// Error body returned by the backend on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Blocking HTTP transport to a hawiya server.
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// `server_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            endpoint: format!("{}/api/analyze", server_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AnalysisTransport for HttpTransport {
    fn submit(&self, body: &AnalyzeBody<'_>) -> Result<IdentityRecord, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(parsed) => parsed.details.or(parsed.error),
                Err(_) if !text.trim().is_empty() => Some(text),
                Err(_) => None,
            };
            return Err(TransportError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<IdentityRecord>()
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

// ──────────────────────────────────────────────
// AnalysisClient
// ──────────────────────────────────────────────

/// Submits a complete upload session for analysis, one at a time.
pub struct AnalysisClient {
    transport: Box<dyn AnalysisTransport>,
    in_flight: AtomicBool,
}

impl AnalysisClient {
    pub fn new(transport: Box<dyn AnalysisTransport>) -> Self {
        Self {
            transport,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a submission is outstanding (the trigger is disabled).
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Analyze the session's two images.
    ///
    /// Fails without any network call when a slot is empty or another
    /// submission is outstanding. The trigger is re-enabled on every exit.
    pub fn analyze(&self, session: &UploadSession) -> Result<IdentityRecord, AnalysisError> {
        let (front, back) = match (session.payload(Slot::Front), session.payload(Slot::Back)) {
            (Some(front), Some(back)) => (front, back),
            _ => {
                tracing::debug!(missing = ?session.missing_slots(), "Analysis blocked");
                return Err(AnalysisError::missing_images());
            }
        };

        let _guard = TriggerGuard::acquire(&self.in_flight).ok_or_else(AnalysisError::busy)?;
        let start = Instant::now();

        let body = AnalyzeBody {
            front_image: front.base64(),
            back_image: back.base64(),
        };

        match self.transport.submit(&body) {
            Ok(record) => {
                tracing::info!(
                    elapsed_ms = %start.elapsed().as_millis(),
                    fields = record.present_count(),
                    "Analysis complete"
                );
                Ok(record)
            }
            Err(e) => {
                tracing::error!(error = %e, "API Error");
                Err(AnalysisError::failed(Some(e.detail())))
            }
        }
    }
}

/// Holds the in-flight flag; clearing it on drop re-enables the trigger.
struct TriggerGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> TriggerGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
