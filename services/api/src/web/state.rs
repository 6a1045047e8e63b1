//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use syllabus_core::SyllabusIngestor;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<SyllabusIngestor>,
    pub config: Arc<Config>,
}
