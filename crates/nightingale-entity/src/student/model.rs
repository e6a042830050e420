//! Student entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::AcademicStatus;

/// A student record in the directory.
///
/// `user_id` is nullable: a student record without a linked identity is a
/// data-quality issue, tolerated by the audience resolver (skipped
/// silently, never an error).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    /// Unique student record identifier.
    pub id: Uuid,
    /// Linked portal identity, if any.
    pub user_id: Option<Uuid>,
    /// Enrolled course reference.
    pub course_id: String,
    /// Admission batch year.
    pub batch_year: i32,
    /// Academic standing.
    pub status: AcademicStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Check whether the student is academically active.
    pub fn is_active(&self) -> bool {
        self.status == AcademicStatus::Active
    }
}
