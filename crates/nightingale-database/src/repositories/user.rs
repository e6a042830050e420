//! User (identity directory) repository.

use sqlx::PgPool;
use uuid::Uuid;

use nightingale_core::error::{AppError, ErrorKind};
use nightingale_core::result::AppResult;
use nightingale_entity::user::User;

/// Read access to the identity directory.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every identity currently flagged active, in one batch read.
    pub async fn find_active_ids(&self) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE is_active = TRUE")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list active users", e)
            })
    }

    /// Look up a single identity.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }
}
