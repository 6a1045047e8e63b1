pub mod domain;
pub mod extract;
pub mod gate;
pub mod ingest;
pub mod parse;
pub mod ports;
pub mod prompt;
pub mod recurrence;
pub mod sanitize;

pub use domain::{
    Assignment, AssignmentDraft, Course, CourseDraft, Event, EventDraft, ParsedSyllabus,
    UploadedDocument,
};
pub use ingest::{CourseCompletion, IngestionReport, SyllabusIngestor};
pub use ports::{GatewayError, PortError, PortResult, ScheduleStore, SyllabusModel};
