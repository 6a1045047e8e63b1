//! crates/syllabus_core/src/recurrence.rs
//!
//! Enumerates every class-meeting occurrence for a course as discrete
//! calendar events. Pure function of the course fields: two calls with the
//! same course yield the same events in the same date-ascending order.

use chrono::{Datelike, Weekday};
use uuid::Uuid;

use crate::domain::{
    truncate, Course, Event, MAX_EVENT_DESCRIPTION_LEN, MAX_EVENT_NAME_LEN,
};

/// Maps a meeting-day token to a weekday. Full names and common three-letter
/// abbreviations are accepted, case-insensitively; anything else is `None`.
fn weekday_from_token(token: &str) -> Option<Weekday> {
    match token.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Generates one event per calendar date in `[start_date, end_date]` whose
/// weekday appears in the course's meeting days.
///
/// Unrecognized day tokens are discarded without failing the course; if no
/// token is recognized the result is empty, not an error.
pub fn generate(course: &Course) -> Vec<Event> {
    let meeting_days: Vec<Weekday> = course
        .meeting_days
        .split(',')
        .filter_map(weekday_from_token)
        .collect();

    if meeting_days.is_empty() {
        return Vec::new();
    }

    let name = truncate(&format!("{} Class", course.name), MAX_EVENT_NAME_LEN);
    let description = truncate(
        &format!("Class meeting for {}", course.name),
        MAX_EVENT_DESCRIPTION_LEN,
    );

    let mut events = Vec::new();
    let mut date = course.start_date;
    while date <= course.end_date {
        if meeting_days.contains(&date.weekday()) {
            events.push(Event {
                id: Uuid::new_v4(),
                name: name.clone(),
                description: description.clone(),
                start: date.and_time(course.class_start_time),
                end: date.and_time(course.class_end_time),
                location: course.location.clone(),
                color: course.color.clone(),
                all_day: false,
                cancelled: false,
                attached_to_course: true,
                user_id: course.user_id,
                schedule_id: course.schedule_id,
                course_id: Some(course.id),
            });
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    events
}
