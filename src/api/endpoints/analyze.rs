//! `POST /api/analyze`: two card images in, extracted fields out.
//!
//! Validation order matters: a missing image is reported before a missing
//! credential, and neither reaches the vendor.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config::API_KEY_VAR;
use crate::pipeline::normalize::OUTPUT_MIME_TYPE;
use crate::pipeline::prompt::build_extraction_prompt;
use crate::pipeline::reply::parse_identity_reply;
use crate::pipeline::vision::InlineImage;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Base64 JPEG of the card front, no data-URI prefix.
    #[serde(default)]
    pub front_image: Option<String>,
    #[serde(default)]
    pub back_image: Option<String>,
}

/// `POST /api/analyze`: extract identity fields from front and back images.
///
/// Returns the model's JSON object verbatim; keys are not validated.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request_id = Uuid::new_v4();

    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(%request_id, error = %rejection, "Analyze body rejected");
        // Only an over-limit body keeps its own status; anything else
        // unreadable counts as images not supplied.
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::MissingImages
        }
    })?;

    let (front, back) = match (
        non_empty(payload.front_image),
        non_empty(payload.back_image),
    ) {
        (Some(front), Some(back)) => (front, back),
        _ => return Err(ApiError::MissingImages),
    };

    let api_key = ctx.config.api_key.clone().ok_or_else(|| {
        ApiError::Configuration(format!("{API_KEY_VAR} environment variable is not set."))
    })?;

    tracing::info!(
        %request_id,
        model = %ctx.config.model,
        front_len = front.len(),
        back_len = back.len(),
        "Analyzing ID card"
    );

    let vision = ctx.vision.clone();
    let model = ctx.config.model.clone();

    // Blocking vendor call on a dedicated thread
    let reply = tokio::task::spawn_blocking(move || {
        let prompt = build_extraction_prompt();
        let images = [
            InlineImage {
                mime_type: OUTPUT_MIME_TYPE,
                data: &front,
            },
            InlineImage {
                mime_type: OUTPUT_MIME_TYPE,
                data: &back,
            },
        ];
        vision.generate_content(&api_key, &model, &prompt, &images)
    })
    .await
    .map_err(|e| ApiError::Processing(format!("Vision task failed: {e}")))??;

    let record = parse_identity_reply(&reply)?;

    tracing::info!(%request_id, keys = record.len(), "ID card analyzed");

    Ok(Json(Value::Object(record)))
}

/// Any method other than POST on `/api/analyze`.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
