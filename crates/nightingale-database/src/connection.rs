//! Connection pool for the notification store.
//!
//! Everything that touches PostgreSQL goes through [`DatabasePool`]:
//! repositories borrow the inner pool, startup applies the embedded
//! schema migrations, and the health endpoint pings it.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use nightingale_core::config::DatabaseConfig;
use nightingale_core::error::{AppError, ErrorKind};
use nightingale_core::result::AppResult;

/// Shared PostgreSQL pool. Cloning shares the underlying connections.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool sized and timed per `config`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Could not open pool to {}", redact_url(&config.url)),
                    e,
                )
            })?;

        info!(
            url = %redact_url(&config.url),
            pool_min = config.min_connections,
            pool_max = config.max_connections,
            "database pool ready"
        );
        Ok(Self { pool })
    }

    /// Borrow the inner pool for repository construction.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply any pending schema migrations embedded in the binary.
    pub async fn run_migrations(&self) -> AppResult<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Schema migration failed", e)
            })?;
        info!("database schema up to date");
        Ok(())
    }

    /// Round-trip a trivial query; used by the health endpoint.
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Database ping failed", e))?;
        Ok(())
    }

    /// Close every connection; called once on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}

/// Strip the credential section out of a connection URL so the URL can
/// be logged.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.find('@')) {
        (Some(scheme), Some(at)) if scheme + 3 < at => {
            format!("{}://***@{}", &url[..scheme], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_never_reach_the_log() {
        assert_eq!(
            redact_url("postgres://portal:secret@db:5432/nightingale"),
            "postgres://***@db:5432/nightingale"
        );
    }

    #[test]
    fn urls_without_credentials_pass_through() {
        assert_eq!(
            redact_url("postgres://db:5432/nightingale"),
            "postgres://db:5432/nightingale"
        );
    }
}
