//! Analysis API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`; an optional static directory is served
//! for everything else.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Request body cap. Two 1024 px JPEGs in base64 are well under 2 MB;
/// unnormalized phone photos sent by other clients still fit.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Build the analysis API router.
pub fn analysis_router(ctx: ApiContext) -> Router {
    let static_dir = ctx.config.static_dir.clone();

    let api = Router::new()
        .route(
            "/analyze",
            post(endpoints::analyze::analyze).fallback(endpoints::analyze::method_not_allowed),
        )
        .route("/health", get(endpoints::health::check))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(ctx);

    let router = Router::new().nest("/api", api);

    match static_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Serving static files");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AnalysisConfig;
    use crate::pipeline::vision::MockVisionModel;

    fn test_config(api_key: Option<&str>) -> AnalysisConfig {
        let mut config = AnalysisConfig::from_lookup(|_| None).unwrap();
        config.api_key = api_key.map(str::to_string);
        config
    }

    fn test_router(vision: Arc<MockVisionModel>, api_key: Option<&str>) -> Router {
        analysis_router(ApiContext::new(test_config(api_key), vision))
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn both_images() -> Value {
        json!({ "frontImage": "RlJPTlQ=", "backImage": "QkFDSw==" })
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn fenced_reply_is_returned_as_record() {
        let vision = Arc::new(MockVisionModel::replying("```json\n{\"name\":\"X\"}\n```"));
        let (status, json) = send(test_router(vision.clone(), Some("key")), post_json(both_images())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"name": "X"}));
        assert_eq!(vision.calls(), 1);
        assert_eq!(vision.last_image_count(), Some(2));
    }

    #[tokio::test]
    async fn full_record_passes_through_with_extra_keys() {
        let reply = json!({
            "national_id": "29001011234567",
            "name": "محمد أحمد علي",
            "address": "القاهرة",
            "dob": "1990/01/01",
            "job": "مهندس",
            "gender": "ذكر",
            "religion": "مسلم",
            "marital_status": "أعزب",
            "expiry_date": "2030/01/01",
            "issuer": "unexpected"
        });
        let vision = Arc::new(MockVisionModel::replying(&reply.to_string()));
        let (status, json) = send(test_router(vision, Some("key")), post_json(both_images())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, reply);
    }

    #[tokio::test]
    async fn non_json_reply_returns_500_with_parse_details() {
        let vision = Arc::new(MockVisionModel::replying("Sorry, the image is too blurry."));
        let (status, json) = send(test_router(vision, Some("key")), post_json(both_images())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to process ID card");
        assert!(json["details"]
            .as_str()
            .unwrap()
            .contains("not valid JSON"));
    }

    #[tokio::test]
    async fn vendor_failure_returns_500_with_details() {
        let vision = Arc::new(MockVisionModel::failing(429, "quota exhausted"));
        let (status, json) = send(test_router(vision.clone(), Some("key")), post_json(both_images())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to process ID card");
        assert!(json["details"].as_str().unwrap().contains("quota exhausted"));
        assert_eq!(vision.calls(), 1);
    }

    #[tokio::test]
    async fn missing_credential_returns_500_without_vendor_call() {
        let vision = Arc::new(MockVisionModel::replying("{}"));
        let (status, json) = send(test_router(vision.clone(), None), post_json(both_images())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["details"].as_str().unwrap().contains("GEMINI_API_KEY"));
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn missing_back_image_returns_400_without_vendor_call() {
        let vision = Arc::new(MockVisionModel::replying("{}"));
        let (status, json) = send(
            test_router(vision.clone(), Some("key")),
            post_json(json!({ "frontImage": "RlJPTlQ=" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"error": "Missing images"}));
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn empty_image_strings_count_as_missing() {
        let vision = Arc::new(MockVisionModel::replying("{}"));
        let (status, _) = send(
            test_router(vision.clone(), Some("key")),
            post_json(json!({ "frontImage": "", "backImage": "QkFDSw==" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn missing_images_checked_before_credential() {
        let vision = Arc::new(MockVisionModel::replying("{}"));
        let (status, _) = send(test_router(vision, None), post_json(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_returns_400() {
        let vision = Arc::new(MockVisionModel::replying("{}"));
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, json) = send(test_router(vision.clone(), Some("key")), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing images");
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn oversized_body_returns_413_not_missing_images() {
        let vision = Arc::new(MockVisionModel::replying("{}"));
        let front = "A".repeat(MAX_BODY_BYTES);
        let request = post_json(json!({ "frontImage": front, "backImage": "QQ==" }));
        let (status, json) = send(test_router(vision.clone(), Some("key")), request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json, json!({ "error": "Payload too large" }));
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn get_on_analyze_returns_405_json() {
        let vision = Arc::new(MockVisionModel::replying("{}"));
        let request = Request::builder()
            .method("GET")
            .uri("/api/analyze")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(test_router(vision.clone(), Some("key")), request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json, json!({"error": "Method Not Allowed"}));
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn put_on_analyze_returns_405() {
        let vision = Arc::new(MockVisionModel::replying("{}"));
        let request = Request::builder()
            .method("PUT")
            .uri("/api/analyze")
            .header("Content-Type", "application/json")
            .body(Body::from(both_images().to_string()))
            .unwrap();
        let (status, _) = send(test_router(vision.clone(), Some("key")), request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn health_reports_credential_state() {
        let vision = Arc::new(MockVisionModel::replying("{}"));
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(test_router(vision, None), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["credential_configured"], false);
        assert_eq!(json["model"], crate::config::DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn unknown_route_is_404_without_static_dir() {
        let vision = Arc::new(MockVisionModel::replying("{}"));
        let request = Request::builder()
            .uri("/index.html")
            .body(Body::empty())
            .unwrap();
        let response = test_router(vision, None).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn static_dir_is_served_at_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hawiya</h1>").unwrap();

        let mut config = test_config(Some("key"));
        config.static_dir = Some(dir.path().to_path_buf());
        let router = analysis_router(ApiContext::new(
            config,
            Arc::new(MockVisionModel::replying("{}")),
        ));

        let request = Request::builder()
            .uri("/index.html")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"<h1>hawiya</h1>");
    }
}
