//! crates/syllabus_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! pipeline to be independent of the concrete model endpoint and database.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Assignment, Course, Event};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for persistence port operations.
/// This abstracts away the specific errors of the underlying store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Errors surfaced by the external model gateway. The orchestrator branches
/// on these kinds rather than catching broad failures.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No API key configured; raised before any network call.
    #[error("model service is not configured: {0}")]
    Configuration(String),
    /// The service rejected our credential (403-class response).
    #[error("model service rejected the API key: {0}")]
    Credential(String),
    /// Any other non-2xx response.
    #[error("model service error (HTTP {status}): {body}")]
    Service { status: u16, body: String },
    /// The request exceeded the gateway's own timeout.
    #[error("model service did not respond in time")]
    Timeout,
    /// The request could not be sent or the connection dropped.
    #[error("could not reach model service: {0}")]
    Transport(String),
    /// A 2xx response whose envelope lacks candidates[0].content.parts[0].text.
    #[error("model response envelope was malformed: {0}")]
    MalformedEnvelope(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The external text-generation service. One prompt in, raw model text out.
/// The response is untrusted input: it may be truncated, wrapped in prose, or
/// syntactically invalid JSON.
#[async_trait]
pub trait SyllabusModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// The persistence boundary for ingestion results. The store is a plain
/// record keeper: ownership cascades are spelled out here, not delegated to
/// foreign-key semantics.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Persists one ingestion outcome as a single transaction: the course,
    /// then its assignments, then its events. On any fault nothing commits.
    async fn persist_ingestion(
        &self,
        course: &Course,
        assignments: &[Assignment],
        events: &[Event],
    ) -> PortResult<()>;

    /// Deletes a course together with its assignments and attached events,
    /// atomically.
    async fn delete_course(&self, course_id: Uuid) -> PortResult<()>;

    /// Deletes a schedule together with its courses (cascading as
    /// `delete_course`) and standalone events, atomically.
    async fn delete_schedule(&self, schedule_id: Uuid) -> PortResult<()>;
}
