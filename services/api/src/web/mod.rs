pub mod rest;
pub mod state;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use syllabus_core::domain::MAX_UPLOAD_BYTES;

use state::AppState;

// Re-export the handlers to make them easily accessible to the binary
// that builds the web server router.
pub use rest::{complete_course_handler, upload_syllabus_handler};

/// Headroom over the pipeline's upload limit covering multipart framing and
/// the other form fields, so an over-limit file reaches the pipeline's own
/// size check and its report instead of a bare framework 413.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Builds the syllabus API routes. Cross-cutting layers (CORS, Swagger UI)
/// are added by the binary.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/syllabus/upload", post(upload_syllabus_handler))
        .route("/syllabus/complete", post(complete_course_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + BODY_LIMIT_SLACK))
        .with_state(app_state)
}
