//! crates/syllabus_core/src/parse.rs
//!
//! Deserializes sanitized model JSON into the structured intermediate
//! representation. Field matching is case-insensitive and field-level
//! failures are tolerated: a scalar that is missing, empty, or the literal
//! token "null" becomes an explicit-absent value, and an unparsable date does
//! not void the rest of the response. Only structural invalidity or a wholly
//! missing course object is a hard error.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};

use crate::domain::{AssignmentDraft, CourseDraft, EventDraft, ParsedSyllabus};

/// Errors raised while parsing a sanitized model response.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("model response was not valid JSON: {0}")]
    InvalidJson(String),
    #[error("model response did not contain a course object")]
    MissingCourse,
}

/// Parses a candidate JSON string into a [`ParsedSyllabus`].
pub fn parse(candidate: &str) -> Result<ParsedSyllabus, ParseError> {
    let value: Value =
        serde_json::from_str(candidate).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let root = value.as_object().ok_or(ParseError::MissingCourse)?;

    let course = get_ci(root, "course")
        .and_then(Value::as_object)
        .ok_or(ParseError::MissingCourse)?;

    let course = CourseDraft {
        name: string_field(course, &["courseName", "name"]),
        description: string_field(course, &["courseDescription", "description"]),
        start_date: string_field(course, &["startDate"]).and_then(|s| parse_date(&s)),
        end_date: string_field(course, &["endDate"]).and_then(|s| parse_date(&s)),
        meeting_days: string_field(course, &["classMeetingDays", "meetingDays"]),
        class_start_time: string_field(course, &["classStartTime", "startTime"])
            .and_then(|s| parse_time(&s)),
        class_end_time: string_field(course, &["classEndTime", "endTime"])
            .and_then(|s| parse_time(&s)),
        location: string_field(course, &["location"]),
        color: string_field(course, &["courseColor", "color"]),
    };

    let assignments = array_field(root, "assignments")
        .into_iter()
        .filter_map(|item| item.as_object().cloned())
        .map(|item| AssignmentDraft {
            name: string_field(&item, &["assignmentName", "name"]),
            due: string_field(&item, &["dueDate"]).and_then(|s| parse_datetime(&s)),
        })
        .collect();

    let events = array_field(root, "events")
        .into_iter()
        .filter_map(|item| item.as_object().cloned())
        .map(|item| EventDraft {
            title: string_field(&item, &["title", "eventName"]),
            description: string_field(&item, &["description"]),
            start: string_field(&item, &["startDate"]).and_then(|s| parse_datetime(&s)),
            end: string_field(&item, &["endDate"]).and_then(|s| parse_datetime(&s)),
            event_type: string_field(&item, &["eventType"]),
        })
        .collect();

    Ok(ParsedSyllabus {
        course,
        assignments,
        events,
    })
}

/// Case-insensitive key lookup, matching the source system's tolerance for
/// whatever casing the model chooses.
fn get_ci<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

/// Looks up the first matching key and normalizes missing / empty / literal
/// "null" values to `None`.
fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let value = keys.iter().find_map(|key| get_ci(object, key))?;
    let text = value.as_str()?.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(text.to_string())
    }
}

fn array_field(object: &Map<String, Value>, key: &str) -> Vec<Value> {
    get_ci(object, key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

//=========================================================================================
// Tolerant date/time parsing
//=========================================================================================

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p"];

/// Parses a calendar date, trying several common layouts. `None` on failure.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

/// Parses a timestamp; a bare date is accepted and lands at midnight.
pub fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| parse_date(input).map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default()))
}

/// Parses a time of day. `None` on failure.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(input, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_response() -> &'static str {
        r##"{
          "course": {
            "courseName": "CS 201",
            "courseDescription": "Data structures",
            "startDate": "2025-01-13",
            "endDate": "2025-05-02",
            "classMeetingDays": "Monday, Wednesday",
            "classStartTime": "10:00",
            "classEndTime": "11:15",
            "location": "Room 210",
            "courseColor": "#007bff"
          },
          "assignments": [
            {"assignmentName": "Essay 1", "dueDate": "2025-02-10T23:59:00"}
          ],
          "events": [
            {"title": "Study for Midterm", "startDate": "2025-03-10T14:00:00",
             "endDate": "2025-03-10T16:00:00", "eventType": "study",
             "description": "Review chapters 1-5"}
          ]
        }"##
    }

    #[test]
    fn parses_complete_response() {
        let parsed = parse(full_response()).unwrap();
        assert_eq!(parsed.course.name.as_deref(), Some("CS 201"));
        assert_eq!(
            parsed.course.start_date,
            NaiveDate::from_ymd_opt(2025, 1, 13)
        );
        assert_eq!(
            parsed.course.class_end_time,
            NaiveTime::from_hms_opt(11, 15, 0)
        );
        assert_eq!(parsed.assignments.len(), 1);
        assert_eq!(parsed.assignments[0].name.as_deref(), Some("Essay 1"));
        assert_eq!(parsed.events.len(), 1);
        assert_eq!(parsed.events[0].event_type.as_deref(), Some("study"));
    }

    #[test]
    fn field_matching_is_case_insensitive() {
        let parsed = parse(
            r#"{"Course": {"CourseName": "BIO 110", "STARTDATE": "2025-09-01"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.course.name.as_deref(), Some("BIO 110"));
        assert_eq!(
            parsed.course.start_date,
            NaiveDate::from_ymd_opt(2025, 9, 1)
        );
    }

    #[test]
    fn null_token_and_empty_string_become_absent() {
        let parsed = parse(
            r#"{"course": {"courseName": "null", "location": "", "courseDescription": "NULL"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.course.name, None);
        assert_eq!(parsed.course.location, None);
        assert_eq!(parsed.course.description, None);
    }

    #[test]
    fn json_null_becomes_absent() {
        let parsed = parse(r#"{"course": {"courseName": null, "endDate": null}}"#).unwrap();
        assert_eq!(parsed.course.name, None);
        assert_eq!(parsed.course.end_date, None);
    }

    #[test]
    fn unparsable_date_becomes_absent_not_error() {
        let parsed = parse(
            r#"{"course": {"courseName": "CS 201", "startDate": "sometime in spring"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.course.name.as_deref(), Some("CS 201"));
        assert_eq!(parsed.course.start_date, None);
    }

    #[test]
    fn earlier_revision_field_names_are_accepted() {
        let parsed = parse(
            r#"{"course": {"name": "CS 201", "meetingDays": "Friday",
                "startTime": "09:00", "endTime": "09:50"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.course.name.as_deref(), Some("CS 201"));
        assert_eq!(parsed.course.meeting_days.as_deref(), Some("Friday"));
        assert_eq!(
            parsed.course.class_start_time,
            NaiveTime::from_hms_opt(9, 0, 0)
        );
    }

    #[test]
    fn missing_course_object_is_hard_error() {
        assert!(matches!(
            parse(r#"{"assignments": []}"#),
            Err(ParseError::MissingCourse)
        ));
        assert!(matches!(
            parse(r#"{"course": null}"#),
            Err(ParseError::MissingCourse)
        ));
    }

    #[test]
    fn structural_invalidity_is_hard_error() {
        assert!(matches!(
            parse(r#"{"course": {"#),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn malformed_assignment_entries_become_partial_drafts() {
        let parsed = parse(
            r#"{"course": {"courseName": "CS 201"},
                "assignments": [
                  {"assignmentName": "Essay 1", "dueDate": "not a date"},
                  {"dueDate": "2025-04-01"}
                ]}"#,
        )
        .unwrap();
        assert_eq!(parsed.assignments.len(), 2);
        assert_eq!(parsed.assignments[0].name.as_deref(), Some("Essay 1"));
        assert_eq!(parsed.assignments[0].due, None);
        assert_eq!(parsed.assignments[1].name, None);
        assert!(parsed.assignments[1].due.is_some());
    }

    #[test]
    fn bare_date_due_dates_land_at_midnight() {
        assert_eq!(
            parse_datetime("2025-02-10"),
            NaiveDate::from_ymd_opt(2025, 2, 10).map(|d| d.and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn twelve_hour_times_are_accepted() {
        assert_eq!(parse_time("3:05 PM"), NaiveTime::from_hms_opt(15, 5, 0));
        assert_eq!(parse_time("10:00"), NaiveTime::from_hms_opt(10, 0, 0));
        assert_eq!(parse_time("noonish"), None);
    }
}
