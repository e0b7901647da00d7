//! API error types with JSON responses.
//!
//! Wire shape is `{ "error": ..., "details": ... }`; `details` is present
//! only on 500 responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::reply::ReplyError;
use crate::pipeline::vision::VisionError;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";
pub const MISSING_IMAGES_MESSAGE: &str = "Missing images";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Payload too large";
pub const CONFIGURATION_MESSAGE: &str = "Server configuration error";
pub const PROCESSING_MESSAGE: &str = "Failed to process ID card";

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// API-level errors with HTTP status mapping.
///
/// Vendor failures and unparsable replies both become `Processing`; the
/// wire does not tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Missing images")]
    MissingImages,
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Processing failed: {0}")]
    Processing(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE, None)
            }
            ApiError::MissingImages => (StatusCode::BAD_REQUEST, MISSING_IMAGES_MESSAGE, None),
            ApiError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE_MESSAGE, None)
            }
            ApiError::Configuration(detail) => {
                tracing::error!(detail, "Analyze endpoint misconfigured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    CONFIGURATION_MESSAGE,
                    Some(detail),
                )
            }
            ApiError::Processing(detail) => {
                tracing::error!(detail, "ID card processing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    PROCESSING_MESSAGE,
                    Some(detail),
                )
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

impl From<VisionError> for ApiError {
    fn from(err: VisionError) -> Self {
        tracing::warn!(error = %err, "Vision call failed");
        ApiError::Processing(err.to_string())
    }
}

impl From<ReplyError> for ApiError {
    fn from(err: ReplyError) -> Self {
        tracing::warn!(error = %err, "Model reply unparsable");
        ApiError::Processing(err.to_string())
    }
}
