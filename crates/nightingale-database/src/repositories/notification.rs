//! Notification repository.
//!
//! Owns the notification record, its receiver rosters, and the
//! denormalized engagement counters. Counter updates and roster writes
//! happen in the same statement or transaction as the row they derive
//! from, so the counters never drift from the roster.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use nightingale_core::error::{AppError, ErrorKind};
use nightingale_core::result::AppResult;
use nightingale_core::types::pagination::{PageRequest, PageResponse};
use nightingale_entity::notification::{
    AckReceiver, NewNotification, Notification, NotificationUpdate, Priority, Receiver,
};

/// Lifecycle states a notification list can be narrowed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Active, past its schedule time (if any), not yet expired.
    Active,
    /// Past its expiry date.
    Expired,
    /// Scheduled for a future send time.
    Scheduled,
}

/// Filter for the notification list endpoint.
#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<StatusFilter>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Data access for notifications and their receiver rosters.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a notification together with its resolved rosters.
    ///
    /// The notification row, the receiver roster, and the optional
    /// acknowledgment roster are written in one transaction.
    /// `sent_count` is fixed at creation to the roster size.
    pub async fn create(
        &self,
        id: Uuid,
        new: &NewNotification,
        receivers: &[Uuid],
        ack_receivers: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<Notification> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (
                id, title, message, kind, category, priority, sender_id,
                target_type, target_ids, send_methods, action_url, action_text,
                schedule_at, expiry_date, sent_count, created_at, updated_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
             RETURNING *",
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.message)
        .bind(new.kind)
        .bind(&new.category)
        .bind(new.priority)
        .bind(new.sender_id)
        .bind(new.target_type)
        .bind(&new.target_ids)
        .bind(&new.send_methods)
        .bind(&new.action_url)
        .bind(&new.action_text)
        .bind(new.schedule_at)
        .bind(new.expiry_date)
        .bind(receivers.len() as i64)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert notification", e)
        })?;

        if !receivers.is_empty() {
            sqlx::query(
                "INSERT INTO notification_receivers (notification_id, user_id)
                 SELECT $1, u FROM UNNEST($2::uuid[]) AS u",
            )
            .bind(id)
            .bind(receivers)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert receivers", e)
            })?;
        }

        if !ack_receivers.is_empty() {
            sqlx::query(
                "INSERT INTO notification_ack_receivers (notification_id, user_id)
                 SELECT $1, u FROM UNNEST($2::uuid[]) AS u",
            )
            .bind(id)
            .bind(ack_receivers)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert ack receivers", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit notification", e)
        })?;

        Ok(notification)
    }

    /// Look up a notification by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find notification", e)
            })
    }

    /// Filtered, paginated list of notifications, newest first.
    pub async fn list(
        &self,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notifications WHERE TRUE");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
            })?;

        if total == 0 {
            return Ok(PageResponse::empty(page));
        }

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM notifications WHERE TRUE");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit() as i64);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset() as i64);

        let items = qb
            .build_query_as::<Notification>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list notifications", e)
            })?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    /// All notifications created at or after `since` (all of them when
    /// `since` is `None`). Feeds the statistics aggregator.
    pub async fn find_since(&self, since: Option<DateTime<Utc>>) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications
             WHERE ($1::timestamptz IS NULL OR created_at >= $1)
             ORDER BY created_at ASC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load notifications", e)
        })
    }

    /// Apply a partial update. Returns `None` when the id is unknown.
    pub async fn update(
        &self,
        id: Uuid,
        update: &NotificationUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET
                title       = COALESCE($2, title),
                message     = COALESCE($3, message),
                kind        = COALESCE($4, kind),
                category    = COALESCE($5, category),
                priority    = COALESCE($6, priority),
                action_url  = COALESCE($7, action_url),
                action_text = COALESCE($8, action_text),
                expiry_date = COALESCE($9, expiry_date),
                is_active   = COALESCE($10, is_active),
                updated_at  = $11
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.message)
        .bind(update.kind)
        .bind(&update.category)
        .bind(update.priority)
        .bind(&update.action_url)
        .bind(&update.action_text)
        .bind(update.expiry_date)
        .bind(update.is_active)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update notification", e)
        })
    }

    /// Hard-delete a notification; receiver rows go with it via cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete notification", e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamp the dispatch time once delivery fan-out has run.
    pub async fn mark_sent(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE notifications SET sent_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark notification sent", e)
            })?;

        Ok(())
    }

    /// The receiver roster for a notification.
    pub async fn receivers(&self, id: Uuid) -> AppResult<Vec<Receiver>> {
        sqlx::query_as::<_, Receiver>(
            "SELECT * FROM notification_receivers WHERE notification_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load receivers", e))
    }

    /// The acknowledgment roster for a notification.
    pub async fn ack_receivers(&self, id: Uuid) -> AppResult<Vec<AckReceiver>> {
        sqlx::query_as::<_, AckReceiver>(
            "SELECT * FROM notification_ack_receivers WHERE notification_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load ack receivers", e))
    }

    /// Mark a notification read for one receiver.
    ///
    /// Only flips rows still unread, so repeats are no-ops and the
    /// `read_count` counter is incremented exactly once per receiver.
    /// Returns whether this call performed the flip.
    pub async fn mark_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(MARK_READ_SQL)
            .bind(notification_id)
            .bind(user_id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark notification read", e)
            })?;

        let delta = read_count_delta(result.rows_affected());
        if delta > 0 {
            sqlx::query(
                "UPDATE notifications SET read_count = read_count + $3, updated_at = $2
                 WHERE id = $1",
            )
            .bind(notification_id)
            .bind(now)
            .bind(delta)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to bump read count", e)
            })?;
        }

        Ok(delta > 0)
    }

    /// Record an acknowledgment for one receiver. Idempotent; a caller
    /// without a roster row flips nothing and gets `false`.
    pub async fn acknowledge(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(ACKNOWLEDGE_SQL)
            .bind(notification_id)
            .bind(user_id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to record acknowledgment", e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether an acknowledgment roster exists for the notification.
    pub async fn requires_acknowledgment(&self, notification_id: Uuid) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notification_ack_receivers WHERE notification_id = $1",
        )
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to inspect ack roster", e)
        })?;

        Ok(count > 0)
    }

    /// How many receivers have acknowledged a notification.
    pub async fn ack_count(&self, notification_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notification_ack_receivers
             WHERE notification_id = $1 AND acknowledged = TRUE",
        )
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count acknowledgments", e)
        })
    }
}

/// Flips one receiver row to read. The `read = FALSE` guard makes a
/// repeat call for the same identity match zero rows.
const MARK_READ_SQL: &str = "UPDATE notification_receivers SET read = TRUE, read_at = $3
     WHERE notification_id = $1 AND user_id = $2 AND read = FALSE";

/// Same transition for the acknowledgment roster.
const ACKNOWLEDGE_SQL: &str =
    "UPDATE notification_ack_receivers SET acknowledged = TRUE, acknowledged_at = $3
     WHERE notification_id = $1 AND user_id = $2 AND acknowledged = FALSE";

/// Counter increment implied by a receiver-row flip. A row can flip at
/// most once, so a repeat call affects zero rows and must leave the
/// denormalized counter untouched.
fn read_count_delta(rows_flipped: u64) -> i64 {
    if rows_flipped > 0 {
        1
    } else {
        0
    }
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a NotificationFilter) {
    if let Some(category) = &filter.category {
        qb.push(" AND category = ");
        qb.push_bind(category);
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND priority = ");
        qb.push_bind(priority);
    }
    match filter.status {
        Some(StatusFilter::Active) => {
            qb.push(
                " AND is_active = TRUE \
                 AND (schedule_at IS NULL OR schedule_at <= NOW()) \
                 AND (expiry_date IS NULL OR expiry_date > NOW())",
            );
        }
        Some(StatusFilter::Expired) => {
            qb.push(" AND expiry_date IS NOT NULL AND expiry_date <= NOW()");
        }
        Some(StatusFilter::Scheduled) => {
            qb.push(" AND schedule_at IS NOT NULL AND schedule_at > NOW()");
        }
        None => {}
    }
    if let Some(start) = filter.start_date {
        qb.push(" AND created_at >= ");
        qb.push_bind(start);
    }
    if let Some(end) = filter.end_date {
        qb.push(" AND created_at <= ");
        qb.push_bind(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_parses_from_query_values() {
        let active: StatusFilter = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(active, StatusFilter::Active);
        let scheduled: StatusFilter = serde_json::from_str("\"scheduled\"").unwrap();
        assert_eq!(scheduled, StatusFilter::Scheduled);
        assert!(serde_json::from_str::<StatusFilter>("\"draft\"").is_err());
    }

    #[test]
    fn filters_compose_into_sql() {
        let filter = NotificationFilter {
            category: Some("Exams".to_string()),
            priority: Some(Priority::High),
            status: Some(StatusFilter::Active),
            start_date: None,
            end_date: None,
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM notifications WHERE TRUE");
        push_filters(&mut qb, &filter);
        let sql = qb.sql();
        assert!(sql.contains("category = $1"));
        assert!(sql.contains("priority = $2"));
        assert!(sql.contains("is_active = TRUE"));
    }

    #[test]
    fn engagement_updates_only_flip_pending_rows() {
        // The guards are what make a second mark-read or acknowledge
        // for the same identity match zero rows.
        assert!(MARK_READ_SQL.contains("read = FALSE"));
        assert!(ACKNOWLEDGE_SQL.contains("acknowledged = FALSE"));
        // Both target exactly one roster row.
        assert!(MARK_READ_SQL.contains("notification_id = $1 AND user_id = $2"));
        assert!(ACKNOWLEDGE_SQL.contains("notification_id = $1 AND user_id = $2"));
    }

    #[test]
    fn repeat_read_receipt_leaves_the_counter_unchanged() {
        // First call flips the row and bumps the counter by one.
        assert_eq!(read_count_delta(1), 1);
        // Second call flips nothing, so no bump runs.
        assert_eq!(read_count_delta(0), 0);
    }
}
