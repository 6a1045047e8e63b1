//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use syllabus_core::domain::{AssignmentDraft, CourseDraft, EventDraft, UploadedDocument};
use syllabus_core::ingest::{CourseCompletion, IngestionReport};
use syllabus_core::parse;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_syllabus_handler,
        complete_course_handler,
    ),
    components(
        schemas(
            IngestionResponse,
            CourseDraftPayload,
            AssignmentDraftPayload,
            EventDraftPayload,
            CourseCompletionRequest,
        )
    ),
    tags(
        (name = "Syllabus API", description = "API endpoints for turning uploaded syllabi into scheduled courses.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The outcome of an ingestion or completion call, in wire form.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    requires_user_input: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    course_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    courses_created: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignments_created: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events_created: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
    /// The best-effort course fields, present when user input is required.
    #[serde(skip_serializing_if = "Option::is_none")]
    course: Option<CourseDraftPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_fields: Vec<String>,
    /// Parsed drafts to echo back in the completion request.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    assignments: Vec<AssignmentDraftPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<EventDraftPayload>,
}

impl IngestionResponse {
    fn from_report(report: IngestionReport) -> (StatusCode, Json<Self>) {
        let status = if report.success || report.requires_user_input {
            StatusCode::OK
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        let created = report.success;
        let response = Self {
            success: report.success,
            message: report.message,
            requires_user_input: report.requires_user_input,
            course_id: report.course_id,
            courses_created: created.then_some(report.courses_created),
            assignments_created: created.then_some(report.assignments_created),
            events_created: created.then_some(report.events_created),
            skipped: report.skipped,
            errors: report.errors,
            course: report.draft.map(CourseDraftPayload::from_draft),
            missing_fields: report
                .missing_fields
                .into_iter()
                .map(str::to_string)
                .collect(),
            assignments: report
                .pending_assignments
                .into_iter()
                .map(AssignmentDraftPayload::from_draft)
                .collect(),
            events: report
                .pending_events
                .into_iter()
                .map(EventDraftPayload::from_draft)
                .collect(),
        };
        (status, Json(response))
    }
}

/// Course fields as plain strings, for rendering and resubmitting a
/// completion form. Absent fields are empty strings.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraftPayload {
    course_name: String,
    course_description: String,
    start_date: String,
    end_date: String,
    class_meeting_days: String,
    class_start_time: String,
    class_end_time: String,
    location: String,
    color: String,
}

impl CourseDraftPayload {
    fn from_draft(draft: CourseDraft) -> Self {
        Self {
            course_name: draft.name.unwrap_or_default(),
            course_description: draft.description.unwrap_or_default(),
            start_date: draft
                .start_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            end_date: draft
                .end_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            class_meeting_days: draft.meeting_days.unwrap_or_default(),
            class_start_time: draft
                .class_start_time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            class_end_time: draft
                .class_end_time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            location: draft.location.unwrap_or_default(),
            color: draft.color.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraftPayload {
    #[serde(default)]
    assignment_name: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
}

impl AssignmentDraftPayload {
    fn from_draft(draft: AssignmentDraft) -> Self {
        Self {
            assignment_name: draft.name,
            due_date: draft.due.map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }

    fn into_draft(self) -> AssignmentDraft {
        AssignmentDraft {
            name: self.assignment_name,
            due: self.due_date.as_deref().and_then(parse::parse_datetime),
        }
    }
}

#[derive(Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDraftPayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    event_type: Option<String>,
}

impl EventDraftPayload {
    fn from_draft(draft: EventDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            start_date: draft
                .start
                .map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()),
            end_date: draft.end.map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()),
            event_type: draft.event_type,
        }
    }

    fn into_draft(self) -> EventDraft {
        EventDraft {
            title: self.title,
            description: self.description,
            start: self.start_date.as_deref().and_then(parse::parse_datetime),
            end: self.end_date.as_deref().and_then(parse::parse_datetime),
            event_type: self.event_type,
        }
    }
}

/// The user-edited course resubmitted after a gating pause.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseCompletionRequest {
    schedule_id: Uuid,
    #[serde(default)]
    course_name: String,
    #[serde(default)]
    course_description: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    end_date: String,
    #[serde(default)]
    class_meeting_days: String,
    #[serde(default)]
    class_start_time: String,
    #[serde(default)]
    class_end_time: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    assignments: Vec<AssignmentDraftPayload>,
    #[serde(default)]
    events: Vec<EventDraftPayload>,
}

impl CourseCompletionRequest {
    fn into_submission(self) -> CourseCompletion {
        CourseCompletion {
            schedule_id: self.schedule_id,
            name: self.course_name,
            description: self.course_description,
            start_date: self.start_date,
            end_date: self.end_date,
            meeting_days: self.class_meeting_days,
            class_start_time: self.class_start_time,
            class_end_time: self.class_end_time,
            location: self.location,
            color: self.color,
            assignments: self
                .assignments
                .into_iter()
                .map(AssignmentDraftPayload::into_draft)
                .collect(),
            events: self
                .events
                .into_iter()
                .map(EventDraftPayload::into_draft)
                .collect(),
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid, (StatusCode, String)> {
    let user_id_str = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "x-user-id header is required".to_string(),
            )
        })?;
    Uuid::parse_str(user_id_str).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid x-user-id format".to_string(),
        )
    })
}

/// Upload a syllabus and turn it into a course with assignments and events.
///
/// Accepts a multipart/form-data request with a `file` part and a
/// `scheduleId` text part. A `x-user-id` header is required to associate
/// the created course with a user.
#[utoipa::path(
    post,
    path = "/syllabus/upload",
    request_body(content_type = "multipart/form-data", description = "The syllabus file (`file`) and target schedule (`scheduleId`)."),
    responses(
        (status = 200, description = "Syllabus processed; either created or awaiting user input", body = IngestionResponse),
        (status = 400, description = "Bad request (e.g., missing header, file, or scheduleId)"),
        (status = 422, description = "The syllabus could not be processed", body = IngestionResponse),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn upload_syllabus_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = user_id_from_headers(&headers)?;

    let mut document: Option<UploadedDocument> = None;
    let mut schedule_id: Option<Uuid> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("untitled.txt").to_string();
                let data = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read file bytes: {}", e),
                    )
                })?;
                document = Some(UploadedDocument::new(file_name, data.to_vec()));
            }
            Some("scheduleId") => {
                let text = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read scheduleId field: {}", e),
                    )
                })?;
                let parsed = Uuid::parse_str(text.trim()).map_err(|_| {
                    (
                        StatusCode::BAD_REQUEST,
                        "Invalid scheduleId format".to_string(),
                    )
                })?;
                schedule_id = Some(parsed);
            }
            _ => {}
        }
    }

    let document = document.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file part".to_string(),
        )
    })?;
    let schedule_id = schedule_id.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include a scheduleId field".to_string(),
        )
    })?;

    let today = chrono::Utc::now().date_naive();
    let report = app_state
        .ingestor
        .ingest(&document, user_id, schedule_id, today)
        .await;

    if !report.success && !report.requires_user_input {
        error!(errors = ?report.errors, "syllabus upload failed");
    }
    Ok(IngestionResponse::from_report(report))
}

/// Complete a course whose syllabus was missing required details.
///
/// Takes the user-edited course fields plus the assignment and event drafts
/// returned by the upload call, and persists the course if the required
/// fields are now present.
#[utoipa::path(
    post,
    path = "/syllabus/complete",
    request_body = CourseCompletionRequest,
    responses(
        (status = 200, description = "Course completed; either created or still awaiting input", body = IngestionResponse),
        (status = 400, description = "Bad request (e.g., missing header)"),
        (status = 422, description = "The course could not be saved", body = IngestionResponse),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn complete_course_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CourseCompletionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = user_id_from_headers(&headers)?;

    let report = app_state
        .ingestor
        .complete(request.into_submission(), user_id)
        .await;

    if !report.success && !report.requires_user_input {
        error!(errors = ?report.errors, "course completion failed");
    }
    Ok(IngestionResponse::from_report(report))
}
