//! crates/syllabus_core/src/prompt.rs
//!
//! Builds the natural-language instruction sent to the external model. The
//! prompt is a pure function of the extracted text and the current date; the
//! date anchors the rule that generated study blocks must lie in the future.

use chrono::NaiveDate;

/// Builds the extraction prompt for one syllabus.
pub fn build_prompt(syllabus_text: &str, today: NaiveDate) -> String {
    let today = today.format("%Y-%m-%d");
    format!(
        r##"Analyze this college syllabus and extract the following structured data as JSON only.

Rules:
- There is only ONE course per syllabus.
- Include all key details like course name, meeting days/times, start/end dates, and location.
- Extract all assignments with due dates.
- Generate study events for exams and assignments leading up to deadlines:
  1. For exams: create 3-5 study blocks in the week leading up to the exam (1-2 hours each).
  2. For major assignments/projects: create study blocks starting 1-2 weeks before the due date.
  3. For regular assignments: create 1-2 study blocks 2-3 days before the due date.
  4. Each study block should be 1-2 hours long.
  5. Spread study blocks across different days (avoid cramming); blocks must never overlap.
  6. Only create events for future dates (after {today}).
  7. If no specific times are mentioned, use reasonable study times (e.g., 14:00-16:00, 18:00-20:00).
  8. Event titles must be 30 characters or less.
  9. Descriptions must be 200 characters or less.
- Course difficulty follows the course numbering convention: 100-level courses are tier 1, 200-level tier 2, 300-level tier 3, 400-level tier 4.
- Omit any past dates (before {today}).
- Use 'null' for unknown fields.

Return only JSON in this exact structure:
{{
  "course": {{
    "courseName": "Example 101",
    "courseDescription": "Intro to Example Concepts",
    "startDate": "2025-01-20",
    "endDate": "2025-05-10",
    "classMeetingDays": "Monday, Wednesday",
    "classStartTime": "15:00",
    "classEndTime": "16:15",
    "location": "Room 210",
    "courseColor": "#007bff"
  }},
  "assignments": [
    {{
      "assignmentName": "Essay 1",
      "dueDate": "2025-02-10T23:59:00"
    }}
  ],
  "events": [
    {{
      "title": "Study for Midterm",
      "startDate": "2025-03-10T14:00:00",
      "endDate": "2025-03-10T16:00:00",
      "eventType": "study",
      "description": "Review chapters 1-5"
    }}
  ]
}}

Syllabus Text:
{syllabus_text}"##
    )
}
