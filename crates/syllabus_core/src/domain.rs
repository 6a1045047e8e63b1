//! crates/syllabus_core/src/domain.rs
//!
//! Defines the pure, core data structures for the syllabus-ingestion pipeline.
//! These structs are independent of any database or transport format.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

/// Maximum upload size accepted by the pipeline (10 MB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Bounded lengths for persisted records.
pub const MAX_EVENT_NAME_LEN: usize = 30;
pub const MAX_EVENT_DESCRIPTION_LEN: usize = 200;
pub const MAX_ASSIGNMENT_NAME_LEN: usize = 100;
pub const MAX_LOCATION_LEN: usize = 50;

/// Defaults applied when the model leaves optional course fields blank.
pub const DEFAULT_COURSE_COLOR: &str = "#007bff";
pub const DEFAULT_LOCATION: &str = "TBD";

/// An uploaded syllabus file. Transient; exists only for one ingestion call.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// The lowercased filename extension, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        if ext.is_empty() {
            None
        } else {
            Some(ext.to_ascii_lowercase())
        }
    }
}

/// Truncates a string to at most `max` characters, respecting char boundaries.
pub fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

//=========================================================================================
// Intermediate (parsed) representation
//=========================================================================================

/// Course fields as extracted from the model response. Every field may be
/// absent; absence is `None`, never a sentinel string, so downstream code can
/// distinguish "the model said nothing" from "the model said empty string".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Comma-separated weekday names, as returned by the model.
    pub meeting_days: Option<String>,
    pub class_start_time: Option<NaiveTime>,
    pub class_end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub color: Option<String>,
}

impl CourseDraft {
    /// Derives the difficulty tier from the course-number magnitude in the
    /// course name (100-level -> 1 ... 400-level -> 4). Never supplied by the
    /// model; unknown numbering yields tier 0.
    pub fn difficulty_tier(&self) -> u8 {
        let Some(name) = &self.name else { return 0 };
        let mut digits = String::new();
        for ch in name.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
            } else if !digits.is_empty() {
                break;
            }
        }
        match digits.parse::<u32>() {
            Ok(n) if (100..=199).contains(&n) => 1,
            Ok(n) if (200..=299).contains(&n) => 2,
            Ok(n) if (300..=399).contains(&n) => 3,
            Ok(n) if (400..=499).contains(&n) => 4,
            _ => 0,
        }
    }
}

/// A single assignment as extracted from the model response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentDraft {
    pub name: Option<String>,
    pub due: Option<NaiveDateTime>,
}

/// A study/exam/project block suggested by the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub event_type: Option<String>,
}

/// Maps a model event type to its calendar color.
pub fn color_for_event_type(event_type: Option<&str>) -> &'static str {
    match event_type.map(|t| t.to_ascii_lowercase()).as_deref() {
        Some("exam") => "#dc3545",       // Red
        Some("assignment") => "#ffc107", // Yellow
        Some("study") => "#28a745",      // Green
        Some("project") => "#17a2b8",    // Cyan
        _ => DEFAULT_COURSE_COLOR,       // Blue
    }
}

/// The structured intermediate value produced by parsing a model response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSyllabus {
    pub course: CourseDraft,
    pub assignments: Vec<AssignmentDraft>,
    pub events: Vec<EventDraft>,
}

//=========================================================================================
// Persisted entities
//=========================================================================================

/// A validated course, owned by a user and a schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub meeting_days: String,
    pub class_start_time: NaiveTime,
    pub class_end_time: NaiveTime,
    pub location: String,
    pub color: String,
    pub difficulty_tier: u8,
    pub user_id: Uuid,
    pub schedule_id: Uuid,
}

/// An assignment belonging to a course. Created only after its course exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: Uuid,
    pub name: String,
    pub due: NaiveDateTime,
    pub completed: bool,
    pub course_id: Uuid,
}

/// A calendar event. Either a generated class meeting or a model-suggested
/// study/exam/project block.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub location: String,
    pub color: String,
    pub all_day: bool,
    pub cancelled: bool,
    pub attached_to_course: bool,
    pub user_id: Uuid,
    pub schedule_id: Uuid,
    pub course_id: Option<Uuid>,
}
