//! crates/syllabus_core/src/ingest.rs
//!
//! Sequences the ingestion pipeline end to end: extract text, query the
//! model, sanitize and parse the response, gate the course draft, then
//! persist the course with its assignments and events as one transaction.
//! Every outcome is reported through [`IngestionReport`]; end users see the
//! aggregated message and counts, never raw model output.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    color_for_event_type, truncate, Assignment, AssignmentDraft, Course, CourseDraft, Event,
    EventDraft, UploadedDocument, MAX_ASSIGNMENT_NAME_LEN, MAX_EVENT_DESCRIPTION_LEN,
    MAX_EVENT_NAME_LEN, MAX_UPLOAD_BYTES,
};
use crate::gate::{self, Gated};
use crate::parse::{self, ParseError};
use crate::ports::{ScheduleStore, SyllabusModel};
use crate::{extract, prompt, recurrence, sanitize};

/// The outcome of one ingestion (or completion) call.
#[derive(Debug, Default)]
pub struct IngestionReport {
    pub success: bool,
    pub message: String,
    /// Set when the course draft lacked required fields. Not an error: the
    /// caller should render a completion form and re-submit.
    pub requires_user_input: bool,
    pub course_id: Option<Uuid>,
    pub courses_created: u32,
    pub assignments_created: u32,
    pub events_created: u32,
    /// Per-item diagnostics for assignments/events dropped during
    /// materialization. Never fatal to the ingestion.
    pub skipped: Vec<String>,
    /// Machine-readable error kinds. Detailed causes go to the log only.
    pub errors: Vec<String>,
    /// The best-effort draft, present when `requires_user_input` is set.
    pub draft: Option<CourseDraft>,
    /// Names of the required fields that were absent.
    pub missing_fields: Vec<&'static str>,
    /// Parsed drafts handed back alongside an incomplete course so the
    /// completion call can resume with them.
    pub pending_assignments: Vec<AssignmentDraft>,
    pub pending_events: Vec<EventDraft>,
}

impl IngestionReport {
    fn failed(message: impl Into<String>, kind: &str) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: vec![kind.to_string()],
            ..Self::default()
        }
    }
}

/// A user-edited course payload resubmitted after a gating pause. Required
/// fields arrive as plain strings: ISO dates, `HH:MM` times, comma-separated
/// weekday names, hex color.
#[derive(Debug, Clone, Default)]
pub struct CourseCompletion {
    pub schedule_id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub meeting_days: String,
    pub class_start_time: String,
    pub class_end_time: String,
    pub location: String,
    pub color: String,
    /// Drafts carried over from the paused ingestion, if any.
    pub assignments: Vec<AssignmentDraft>,
    pub events: Vec<EventDraft>,
}

impl CourseCompletion {
    /// Re-reads the submitted strings into a draft so the completion path
    /// passes through the same gate as the automatic path.
    fn to_draft(&self) -> CourseDraft {
        let present = |s: &str| {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        CourseDraft {
            name: present(&self.name),
            description: present(&self.description),
            start_date: parse::parse_date(&self.start_date),
            end_date: parse::parse_date(&self.end_date),
            meeting_days: present(&self.meeting_days),
            class_start_time: parse::parse_time(&self.class_start_time),
            class_end_time: parse::parse_time(&self.class_end_time),
            location: present(&self.location),
            color: present(&self.color),
        }
    }
}

/// Owns the pipeline control flow. One instance serves all callers; each
/// ingestion is independent and strictly sequential internally.
pub struct SyllabusIngestor {
    model: Arc<dyn SyllabusModel>,
    store: Arc<dyn ScheduleStore>,
}

impl SyllabusIngestor {
    pub fn new(model: Arc<dyn SyllabusModel>, store: Arc<dyn ScheduleStore>) -> Self {
        Self { model, store }
    }

    /// Processes one uploaded syllabus for the given user and schedule.
    ///
    /// `today` anchors the prompt's future-dates rule; passing it in keeps
    /// the pipeline deterministic for testing.
    pub async fn ingest(
        &self,
        document: &UploadedDocument,
        user_id: Uuid,
        schedule_id: Uuid,
        today: NaiveDate,
    ) -> IngestionReport {
        info!(user_id = %user_id, file = %document.file_name, "starting syllabus ingestion");

        if document.bytes.is_empty() {
            return IngestionReport::failed("No file provided", "EmptyUpload");
        }
        if document.bytes.len() > MAX_UPLOAD_BYTES {
            return IngestionReport::failed("File size exceeds 10MB limit", "UploadTooLarge");
        }

        // Extracting
        let text = match extract::extract(document) {
            Ok(text) => text,
            Err(e @ extract::ExtractionError::UnsupportedFormat(_)) => {
                return IngestionReport::failed(e.to_string(), "UnsupportedFormat");
            }
            Err(e) => {
                error!(cause = %e, "text extraction failed");
                let kind = match e {
                    extract::ExtractionError::EmptyContent => "EmptyContent",
                    _ => "CorruptDocument",
                };
                return IngestionReport::failed("Could not extract text from file", kind);
            }
        };
        info!(chars = text.len(), "extracted syllabus text");

        // Querying
        let prompt = prompt::build_prompt(&text, today);
        let raw = match self.model.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(cause = %e, "model gateway call failed");
                return IngestionReport::failed(
                    "The syllabus analysis service is unavailable. Please try again later.",
                    gateway_kind(&e),
                );
            }
        };
        info!(chars = raw.len(), "received model response");

        // Sanitizing + Parsing, with one repair-then-reparse attempt. The
        // repair works on the unsliced text so a truncated tail is kept.
        let parsed = match self.parse_response(&raw) {
            Ok(parsed) => parsed,
            Err((message, kind)) => {
                return IngestionReport::failed(message, kind);
            }
        };

        // Gating
        match gate::evaluate(parsed.course) {
            Gated::Incomplete { draft, missing } => {
                info!(missing = ?missing, "course draft incomplete, awaiting user input");
                IngestionReport {
                    success: false,
                    requires_user_input: true,
                    message:
                        "Some course details are missing. Please fill in the missing information."
                            .to_string(),
                    draft: Some(draft),
                    missing_fields: missing,
                    pending_assignments: parsed.assignments,
                    pending_events: parsed.events,
                    ..IngestionReport::default()
                }
            }
            Gated::Complete(complete) => {
                let course = complete.into_course(user_id, schedule_id);
                self.persist(course, parsed.assignments, parsed.events)
                    .await
            }
        }
    }

    /// Resumes a paused ingestion with user-supplied course fields. Re-enters
    /// at the gating step; the previously parsed assignment and event drafts
    /// ride along in the submission.
    pub async fn complete(&self, submission: CourseCompletion, user_id: Uuid) -> IngestionReport {
        info!(user_id = %user_id, schedule_id = %submission.schedule_id, "completing course details");

        match gate::evaluate(submission.to_draft()) {
            Gated::Incomplete { draft, missing } => IngestionReport {
                success: false,
                requires_user_input: true,
                message: "Missing required course information".to_string(),
                draft: Some(draft),
                missing_fields: missing,
                ..IngestionReport::default()
            },
            Gated::Complete(complete) => {
                let course = complete.into_course(user_id, submission.schedule_id);
                self.persist(course, submission.assignments, submission.events)
                    .await
            }
        }
    }

    fn parse_response(
        &self,
        raw: &str,
    ) -> Result<crate::domain::ParsedSyllabus, (&'static str, &'static str)> {
        const PARSE_MESSAGE: &str = "Could not extract course information from syllabus.";

        let candidate = match sanitize::sanitize(raw) {
            Ok(candidate) => candidate,
            Err(e) => {
                error!(cause = %e, "no JSON payload in model response");
                return Err((PARSE_MESSAGE, "NoJsonFound"));
            }
        };

        match parse::parse(&candidate) {
            Ok(parsed) => Ok(parsed),
            Err(ParseError::InvalidJson(first_cause)) => {
                warn!(cause = %first_cause, "initial parse failed, attempting truncation repair");
                let stripped = sanitize::strip_wrapping(raw)
                    .map_err(|_| (PARSE_MESSAGE, "NoJsonFound"))?;
                let repaired = match sanitize::repair_truncation(stripped) {
                    Ok(repaired) => repaired,
                    Err(e) => {
                        error!(cause = %e, offending = %candidate, "truncation repair failed");
                        return Err((PARSE_MESSAGE, "UnrecoverableTruncation"));
                    }
                };
                parse::parse(&repaired).map_err(|e| {
                    error!(cause = %e, offending = %repaired, "reparse after repair failed");
                    (PARSE_MESSAGE, "ParseError")
                })
            }
            Err(e @ ParseError::MissingCourse) => {
                error!(cause = %e, "model response had no course object");
                Err((PARSE_MESSAGE, "ParseError"))
            }
        }
    }

    /// Materializes and persists one gated course: the course row first (its
    /// identifier is required by children), then assignments, then events —
    /// recurring class meetings plus model-suggested blocks — in a single
    /// store transaction. Items that cannot be constructed are skipped and
    /// counted, never fatal.
    async fn persist(
        &self,
        course: Course,
        assignment_drafts: Vec<AssignmentDraft>,
        event_drafts: Vec<EventDraft>,
    ) -> IngestionReport {
        let mut skipped = Vec::new();

        let assignments: Vec<Assignment> = assignment_drafts
            .into_iter()
            .filter_map(|draft| match (draft.name, draft.due) {
                (Some(name), Some(due)) => Some(Assignment {
                    id: Uuid::new_v4(),
                    name: truncate(&name, MAX_ASSIGNMENT_NAME_LEN),
                    due,
                    completed: false,
                    course_id: course.id,
                }),
                (name, _) => {
                    skipped.push(format!(
                        "assignment '{}' skipped: missing name or due date",
                        name.as_deref().unwrap_or("<unnamed>")
                    ));
                    None
                }
            })
            .collect();

        let mut events = recurrence::generate(&course);
        for draft in event_drafts {
            let (Some(start), Some(end)) = (draft.start, draft.end) else {
                skipped.push(format!(
                    "event '{}' skipped: missing start or end time",
                    draft.title.as_deref().unwrap_or("<untitled>")
                ));
                continue;
            };
            let color = color_for_event_type(draft.event_type.as_deref()).to_string();
            let description = draft.description.unwrap_or_else(|| {
                format!("{} event", draft.event_type.as_deref().unwrap_or("study"))
            });
            events.push(Event {
                id: Uuid::new_v4(),
                name: truncate(
                    draft.title.as_deref().unwrap_or("Study Session"),
                    MAX_EVENT_NAME_LEN,
                ),
                description: truncate(&description, MAX_EVENT_DESCRIPTION_LEN),
                start,
                end,
                location: course.location.clone(),
                color,
                all_day: false,
                cancelled: false,
                attached_to_course: true,
                user_id: course.user_id,
                schedule_id: course.schedule_id,
                course_id: Some(course.id),
            });
        }

        if let Err(e) = self
            .store
            .persist_ingestion(&course, &assignments, &events)
            .await
        {
            error!(cause = %e, course = %course.name, "persistence failed, nothing committed");
            return IngestionReport::failed(
                "An error occurred while saving the course.",
                "PersistenceFault",
            );
        }

        let message = format!(
            "Successfully created 1 course, {} assignments, and {} events.",
            assignments.len(),
            events.len()
        );
        info!(
            course = %course.name,
            assignments = assignments.len(),
            events = events.len(),
            skipped = skipped.len(),
            "syllabus ingestion complete"
        );

        IngestionReport {
            success: true,
            message,
            course_id: Some(course.id),
            courses_created: 1,
            assignments_created: assignments.len() as u32,
            events_created: events.len() as u32,
            skipped,
            ..IngestionReport::default()
        }
    }
}

fn gateway_kind(error: &crate::ports::GatewayError) -> &'static str {
    use crate::ports::GatewayError::*;
    match error {
        Configuration(_) => "ConfigurationError",
        Credential(_) => "CredentialError",
        Service { .. } => "ServiceError",
        Timeout => "Timeout",
        Transport(_) => "TransportError",
        MalformedEnvelope(_) => "MalformedEnvelope",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_strings_reparse_into_a_draft() {
        let submission = CourseCompletion {
            schedule_id: Uuid::new_v4(),
            name: "CS 201".to_string(),
            description: "Data structures".to_string(),
            start_date: "2025-01-13".to_string(),
            end_date: "2025-05-02".to_string(),
            meeting_days: "Monday, Wednesday".to_string(),
            class_start_time: "10:00".to_string(),
            class_end_time: "11:15".to_string(),
            location: String::new(),
            color: String::new(),
            assignments: Vec::new(),
            events: Vec::new(),
        };
        let draft = submission.to_draft();
        assert_eq!(draft.name.as_deref(), Some("CS 201"));
        assert!(draft.start_date.is_some());
        assert!(draft.class_end_time.is_some());
        assert_eq!(draft.location, None);
        assert_eq!(draft.color, None);
    }

    #[test]
    fn unparsable_completion_dates_stay_absent() {
        let submission = CourseCompletion {
            start_date: "next spring".to_string(),
            ..CourseCompletion::default()
        };
        assert_eq!(submission.to_draft().start_date, None);
    }
}
