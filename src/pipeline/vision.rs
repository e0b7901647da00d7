//! Multimodal model access: one instruction plus inline images in, text out.
//!
//! `VisionModel` is the seam between the analyze endpoint and the vendor.
//! `GeminiClient` is the production implementation; `MockVisionModel`
//! stands in for it in tests and counts invocations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;

use super::gemini_types::{GenerateContentRequest, GenerateContentResponse, InlineData};

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Cannot reach vision API at {0}")]
    Connection(String),

    #[error("Vision API request timed out after {0}s")]
    Timeout(u64),

    #[error("Vision API returned error (status {status}): {body}")]
    Vendor { status: u16, body: String },

    #[error("Vision API blocked the request: {0}")]
    Blocked(String),

    #[error("Vision API returned no text")]
    EmptyResponse,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// One image attached to a request.
#[derive(Debug, Clone, Copy)]
pub struct InlineImage<'a> {
    pub mime_type: &'a str,
    /// Base64 without data-URI prefix.
    pub data: &'a str,
}

/// Multimodal model abstraction (allows mocking).
pub trait VisionModel: Send + Sync {
    /// Send `prompt` followed by `images` as one user turn and return the
    /// model's raw reply text.
    fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        images: &[InlineImage<'_>],
    ) -> Result<String, VisionError>;
}

// ──────────────────────────────────────────────
// GeminiClient
// ──────────────────────────────────────────────

/// Blocking HTTP client for the Gemini REST API.
///
/// Must be created and dropped outside an async context; call it from
/// `tokio::task::spawn_blocking` when serving requests.
pub struct GeminiClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, VisionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| VisionError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn endpoint_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

impl VisionModel for GeminiClient {
    fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        images: &[InlineImage<'_>],
    ) -> Result<String, VisionError> {
        let _span = tracing::info_span!(
            "vision_generate",
            model = %model,
            images = images.len(),
            payload_bytes = images.iter().map(|i| i.data.len()).sum::<usize>(),
        )
        .entered();
        let start = std::time::Instant::now();

        let inline: Vec<InlineData<'_>> = images
            .iter()
            .map(|img| InlineData {
                mime_type: img.mime_type,
                data: img.data,
            })
            .collect();
        let body = GenerateContentRequest::user_turn(prompt, &inline);

        let response = self
            .client
            .post(self.endpoint_url(model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    VisionError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    VisionError::Connection(self.base_url.clone())
                } else {
                    VisionError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(VisionError::Vendor {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| VisionError::ResponseParsing(e.to_string()))?;

        let text = match parsed.text() {
            Some(text) => text,
            None => {
                return Err(match parsed.block_reason() {
                    Some(reason) => VisionError::Blocked(reason.to_string()),
                    None => VisionError::EmptyResponse,
                })
            }
        };

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            reply_len = text.len(),
            "Vision model replied"
        );

        Ok(text)
    }
}

// ──────────────────────────────────────────────
// MockVisionModel
// ──────────────────────────────────────────────

/// Mock vision model for testing: returns a fixed reply or a fixed failure
/// and records how often it was called.
pub struct MockVisionModel {
    reply: Result<String, (u16, String)>,
    calls: AtomicUsize,
    last_image_count: Mutex<Option<usize>>,
}

impl MockVisionModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_image_count: Mutex::new(None),
        }
    }

    /// Fails every call with a vendor error of the given status.
    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            reply: Err((status, body.to_string())),
            calls: AtomicUsize::new(0),
            last_image_count: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_image_count(&self) -> Option<usize> {
        self.last_image_count.lock().ok().and_then(|guard| *guard)
    }
}

impl VisionModel for MockVisionModel {
    fn generate_content(
        &self,
        _api_key: &str,
        _model: &str,
        _prompt: &str,
        images: &[InlineImage<'_>],
    ) -> Result<String, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_image_count.lock() {
            *guard = Some(images.len());
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, body)) => Err(VisionError::Vendor {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
