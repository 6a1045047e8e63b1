//! HTTP-level tests for the syllabus routes, driven through the router
//! without a running server, database, or model endpoint.

use std::sync::Arc;

use api_lib::config::Config;
use api_lib::web::{api_router, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use syllabus_core::domain::{Assignment, Course, Event, MAX_UPLOAD_BYTES};
use syllabus_core::ports::{GatewayError, PortResult};
use syllabus_core::{ScheduleStore, SyllabusIngestor, SyllabusModel};
use tower::ServiceExt;
use uuid::Uuid;

/// A model with no key configured; any call fails before I/O.
struct UnconfiguredModel;

#[async_trait]
impl SyllabusModel for UnconfiguredModel {
    async fn generate(&self, _prompt: &str) -> Result<String, GatewayError> {
        Err(GatewayError::Configuration(
            "GEMINI_API_KEY is not set".to_string(),
        ))
    }
}

struct DiscardStore;

#[async_trait]
impl ScheduleStore for DiscardStore {
    async fn persist_ingestion(
        &self,
        _course: &Course,
        _assignments: &[Assignment],
        _events: &[Event],
    ) -> PortResult<()> {
        Ok(())
    }

    async fn delete_course(&self, _course_id: Uuid) -> PortResult<()> {
        Ok(())
    }

    async fn delete_schedule(&self, _schedule_id: Uuid) -> PortResult<()> {
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        gemini_api_key: None,
        gemini_model: "gemini-2.5-flash".to_string(),
        gemini_base_url: "http://127.0.0.1:9".to_string(),
        gemini_timeout_secs: 1,
    }
}

fn app() -> axum::Router {
    let ingestor = Arc::new(SyllabusIngestor::new(
        Arc::new(UnconfiguredModel),
        Arc::new(DiscardStore),
    ));
    let state = Arc::new(AppState {
        ingestor,
        config: Arc::new(test_config()),
    });
    api_router(state)
}

fn multipart_upload(file_bytes: &[u8]) -> Request<Body> {
    let boundary = "test-boundary-7MA4YWxk";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"scheduleId\"\r\n\r\n{}\r\n",
            Uuid::new_v4()
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"syllabus.txt\"\r\nContent-Type: text/plain\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file_bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/syllabus/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header("x-user-id", Uuid::new_v4().to_string())
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn oversized_upload_reaches_the_pipeline_size_check() {
    // The framework body limit leaves headroom over the pipeline limit, so
    // the caller gets the report message rather than a bare 413.
    let oversized = vec![b'a'; MAX_UPLOAD_BYTES + 1];
    let response = app().oneshot(multipart_upload(&oversized)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = response_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "File size exceeds 10MB limit");
}

#[tokio::test]
async fn small_upload_flows_through_to_the_model_stage() {
    let response = app()
        .oneshot(multipart_upload(b"CS 201 Data Structures syllabus"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = response_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["errors"][0], "ConfigurationError");
}

#[tokio::test]
async fn missing_user_header_is_a_bad_request() {
    let mut request = multipart_upload(b"hello");
    request.headers_mut().remove("x-user-id");

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
