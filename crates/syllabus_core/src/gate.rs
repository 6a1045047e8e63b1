//! crates/syllabus_core/src/gate.rs
//!
//! Decides whether a parsed course has enough required fields to proceed
//! automatically, or must pause and go back to the user for completion.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::domain::{
    truncate, Course, CourseDraft, DEFAULT_COURSE_COLOR, DEFAULT_LOCATION, MAX_LOCATION_LEN,
};

/// A course draft that passed the gate: every required field is present and
/// the optional ones are filled with their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteCourse {
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
}

impl CompleteCourse {
    /// Promotes the gated draft to a persistable course owned by the given
    /// user and schedule, assigning its identifier.
    pub fn into_course(self, user_id: Uuid, schedule_id: Uuid) -> Course {
        Course {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            meeting_days: self.meeting_days,
            class_start_time: self.class_start_time,
            class_end_time: self.class_end_time,
            location: self.location,
            color: self.color,
            difficulty_tier: self.difficulty_tier,
            user_id,
            schedule_id,
        }
    }
}

/// The gate's verdict on a course draft.
#[derive(Debug, Clone, PartialEq)]
pub enum Gated {
    Complete(CompleteCourse),
    /// The draft is handed back untouched so the caller can render a
    /// completion form; `missing` names the absent required fields.
    Incomplete {
        draft: CourseDraft,
        missing: Vec<&'static str>,
    },
}

/// Evaluates a course draft against the required-for-completion set:
/// name, description, start date, end date, meeting days, start time, end
/// time. Location, color, and difficulty always have safe defaults and never
/// block completion.
pub fn evaluate(draft: CourseDraft) -> Gated {
    let mut missing = Vec::new();
    if draft.name.is_none() {
        missing.push("courseName");
    }
    if draft.description.is_none() {
        missing.push("courseDescription");
    }
    if draft.start_date.is_none() {
        missing.push("startDate");
    }
    if draft.end_date.is_none() {
        missing.push("endDate");
    }
    if draft.meeting_days.is_none() {
        missing.push("classMeetingDays");
    }
    if draft.class_start_time.is_none() {
        missing.push("classStartTime");
    }
    if draft.class_end_time.is_none() {
        missing.push("classEndTime");
    }

    if !missing.is_empty() {
        return Gated::Incomplete { draft, missing };
    }

    let difficulty_tier = draft.difficulty_tier();
    Gated::Complete(CompleteCourse {
        name: draft.name.unwrap_or_default(),
        description: draft.description.unwrap_or_default(),
        start_date: draft.start_date.unwrap_or_default(),
        end_date: draft.end_date.unwrap_or_default(),
        meeting_days: draft.meeting_days.unwrap_or_default(),
        class_start_time: draft.class_start_time.unwrap_or_default(),
        class_end_time: draft.class_end_time.unwrap_or_default(),
        location: draft
            .location
            .map(|l| truncate(&l, MAX_LOCATION_LEN))
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        color: draft.color.unwrap_or_else(|| DEFAULT_COURSE_COLOR.to_string()),
        difficulty_tier,
    })
}
