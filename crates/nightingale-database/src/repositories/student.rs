//! Student directory repository.

use sqlx::PgPool;
use uuid::Uuid;

use nightingale_core::error::{AppError, ErrorKind};
use nightingale_core::result::AppResult;
use nightingale_entity::student::Student;

/// Filter for batch reads of the student directory.
///
/// `None` means "no restriction"; an empty vector matches nothing.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Restrict to these enrolled courses.
    pub courses: Option<Vec<String>>,
    /// Restrict to these admission batch years.
    pub batch_years: Option<Vec<i32>>,
}

/// Read access to the student directory.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    /// Create a new student repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Academically active students matching the filter, in one batch read.
    pub async fn find_active(&self, filter: &StudentFilter) -> AppResult<Vec<Student>> {
        sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE status = 'active' \
             AND ($1::text[] IS NULL OR course_id = ANY($1)) \
             AND ($2::int4[] IS NULL OR batch_year = ANY($2))",
        )
        .bind(filter.courses.as_deref())
        .bind(filter.batch_years.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active students", e)
        })
    }

    /// The student record linked to an identity, if one exists.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Student>> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find student by user", e)
            })
    }
}
