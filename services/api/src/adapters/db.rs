//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ScheduleStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Queries are bound at runtime (not through the compile-time macros) so the
//! workspace builds without a live database.

use async_trait::async_trait;
use sqlx::PgPool;
use syllabus_core::domain::{Assignment, Course, Event};
use syllabus_core::ports::{PortError, PortResult, ScheduleStore};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ScheduleStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn to_port_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound("row not found".to_string()),
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// `ScheduleStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ScheduleStore for PgStore {
    /// Inserts a course with all of its assignments and events in one
    /// transaction. Any failure rolls the whole ingestion back.
    async fn persist_ingestion(
        &self,
        course: &Course,
        assignments: &[Assignment],
        events: &[Event],
    ) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(to_port_error)?;

        sqlx::query(
            "INSERT INTO courses \
             (id, name, description, start_date, end_date, meeting_days, \
              class_start_time, class_end_time, location, color, difficulty_tier, \
              user_id, schedule_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.start_date)
        .bind(course.end_date)
        .bind(&course.meeting_days)
        .bind(course.class_start_time)
        .bind(course.class_end_time)
        .bind(&course.location)
        .bind(&course.color)
        .bind(course.difficulty_tier as i16)
        .bind(course.user_id)
        .bind(course.schedule_id)
        .execute(&mut *tx)
        .await
        .map_err(to_port_error)?;

        for assignment in assignments {
            sqlx::query(
                "INSERT INTO assignments (id, name, due, completed, course_id) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(assignment.id)
            .bind(&assignment.name)
            .bind(assignment.due)
            .bind(assignment.completed)
            .bind(assignment.course_id)
            .execute(&mut *tx)
            .await
            .map_err(to_port_error)?;
        }

        for event in events {
            sqlx::query(
                "INSERT INTO events \
                 (id, name, description, start_at, end_at, location, color, \
                  all_day, cancelled, attached_to_course, user_id, schedule_id, course_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            )
            .bind(event.id)
            .bind(&event.name)
            .bind(&event.description)
            .bind(event.start)
            .bind(event.end)
            .bind(&event.location)
            .bind(&event.color)
            .bind(event.all_day)
            .bind(event.cancelled)
            .bind(event.attached_to_course)
            .bind(event.user_id)
            .bind(event.schedule_id)
            .bind(event.course_id)
            .execute(&mut *tx)
            .await
            .map_err(to_port_error)?;
        }

        tx.commit().await.map_err(to_port_error)?;
        Ok(())
    }

    /// Deletes a course with its assignments and attached events. The
    /// children go first so the delete stays consistent without relying on
    /// referential actions.
    async fn delete_course(&self, course_id: Uuid) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(to_port_error)?;

        sqlx::query("DELETE FROM assignments WHERE course_id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(to_port_error)?;
        sqlx::query("DELETE FROM events WHERE course_id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(to_port_error)?;
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(to_port_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Course {} not found",
                course_id
            )));
        }

        tx.commit().await.map_err(to_port_error)?;
        Ok(())
    }

    /// Deletes every course under a schedule together with its assignments,
    /// plus all events on the schedule whether or not they belong to a course.
    async fn delete_schedule(&self, schedule_id: Uuid) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(to_port_error)?;

        sqlx::query(
            "DELETE FROM assignments WHERE course_id IN \
             (SELECT id FROM courses WHERE schedule_id = $1)",
        )
        .bind(schedule_id)
        .execute(&mut *tx)
        .await
        .map_err(to_port_error)?;
        sqlx::query("DELETE FROM events WHERE schedule_id = $1")
            .bind(schedule_id)
            .execute(&mut *tx)
            .await
            .map_err(to_port_error)?;
        sqlx::query("DELETE FROM courses WHERE schedule_id = $1")
            .bind(schedule_id)
            .execute(&mut *tx)
            .await
            .map_err(to_port_error)?;

        tx.commit().await.map_err(to_port_error)?;
        Ok(())
    }
}
