//! Notification service.
//!
//! Orchestrates audience resolution, persistence, delivery fan-out,
//! engagement tracking, and statistics. Authorization happens here
//! against the [`RequestContext`], never against request payloads.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use nightingale_core::error::AppError;
use nightingale_core::result::AppResult;
use nightingale_core::types::pagination::{PageRequest, PageResponse};
use nightingale_database::repositories::notification::{NotificationFilter, NotificationRepository};
use nightingale_database::repositories::student::{StudentFilter, StudentRepository};
use nightingale_database::repositories::user::UserRepository;
use nightingale_entity::notification::{
    NewNotification, Notification, NotificationKind, NotificationUpdate, Priority, Receiver,
    SendMethod, TargetType,
};

use crate::context::RequestContext;
use crate::notification::audience::{resolve_audience, DirectorySnapshot};
use crate::notification::dispatcher::DeliveryDispatcher;
use crate::notification::stats::{aggregate, StatisticsReport};

/// Input for creating a notification. The sender comes from the request
/// context, never from this struct.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub category: String,
    pub priority: Priority,
    pub target_type: TargetType,
    pub target_ids: Vec<String>,
    pub send_methods: Vec<SendMethod>,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
    pub schedule_at: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    /// When set, every receiver also gets an acknowledgment row.
    pub requires_acknowledgment: bool,
}

/// Acknowledgment progress for one notification.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AckStatus {
    /// Whether an acknowledgment roster exists at all.
    pub requires_acknowledgment: bool,
    /// Receivers that have acknowledged.
    pub acknowledged_count: i64,
}

/// Notification business logic.
#[derive(Debug, Clone)]
pub struct NotificationService {
    notifications: NotificationRepository,
    users: UserRepository,
    students: StudentRepository,
    dispatcher: DeliveryDispatcher,
}

impl NotificationService {
    /// Wire the service to its repositories and dispatcher.
    pub fn new(
        notifications: NotificationRepository,
        users: UserRepository,
        students: StudentRepository,
        dispatcher: DeliveryDispatcher,
    ) -> Self {
        Self {
            notifications,
            users,
            students,
            dispatcher,
        }
    }

    /// Create a notification: resolve the audience, persist the record
    /// with its rosters, then fan out to live sessions unless the
    /// record is scheduled for later.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateNotification,
    ) -> AppResult<Notification> {
        let input = validate_create(input)?;
        let now = Utc::now();

        let snapshot = self.load_snapshot(input.target_type, &input.target_ids).await?;
        let receivers = resolve_audience(input.target_type, &input.target_ids, &snapshot);
        if receivers.is_empty() {
            warn!(
                target_type = %input.target_type,
                "notification audience resolved to nobody"
            );
        }

        let ack_receivers: Vec<Uuid> = if input.requires_acknowledgment {
            receivers.clone()
        } else {
            Vec::new()
        };

        let new = NewNotification {
            title: input.title,
            message: input.message,
            kind: input.kind,
            category: input.category,
            priority: input.priority,
            sender_id: ctx.user_id,
            target_type: input.target_type,
            target_ids: input.target_ids,
            send_methods: input.send_methods,
            action_url: input.action_url,
            action_text: input.action_text,
            schedule_at: input.schedule_at,
            expiry_date: input.expiry_date,
        };

        let mut notification = self
            .notifications
            .create(Uuid::new_v4(), &new, &receivers, &ack_receivers, now)
            .await?;

        if notification.is_scheduled(now) {
            info!(
                notification_id = %notification.id,
                schedule_at = ?notification.schedule_at,
                receivers = receivers.len(),
                "notification created, held for schedule"
            );
        } else {
            self.dispatcher.dispatch(&notification, &receivers).await;
            self.notifications.mark_sent(notification.id, now).await?;
            notification.sent_at = Some(now);
            info!(
                notification_id = %notification.id,
                receivers = receivers.len(),
                "notification created and dispatched"
            );
        }

        Ok(notification)
    }

    /// Fetch one notification.
    pub async fn get(&self, id: Uuid) -> AppResult<Notification> {
        self.notifications
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    /// Filtered, paginated listing, newest first.
    pub async fn list(
        &self,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.notifications.list(filter, page).await
    }

    /// Apply a partial update. Only the sender or an admin may edit.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        update: &NotificationUpdate,
    ) -> AppResult<Notification> {
        let existing = self.get(id).await?;
        self.authorize_owner(ctx, &existing)?;

        // Unlisted payload fields are dropped before they reach this
        // layer; a payload carrying nothing else applies nothing and
        // succeeds.
        if update.is_empty() {
            return Ok(existing);
        }

        self.notifications
            .update(id, update, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    /// Delete a notification and its rosters. Only the sender or an
    /// admin may delete.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let existing = self.get(id).await?;
        self.authorize_owner(ctx, &existing)?;

        if self.notifications.delete(id).await? {
            info!(notification_id = %id, "notification deleted");
            Ok(())
        } else {
            Err(AppError::not_found("Notification not found"))
        }
    }

    /// Immediately dispatch a held (scheduled) notification to its
    /// persisted roster. Only the sender or an admin may trigger this.
    pub async fn send_now(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Notification> {
        let mut notification = self.get(id).await?;
        self.authorize_owner(ctx, &notification)?;

        if notification.sent_at.is_some() {
            return Err(AppError::conflict("Notification was already dispatched"));
        }

        let receivers: Vec<Uuid> = self
            .notifications
            .receivers(id)
            .await?
            .into_iter()
            .map(|r| r.user_id)
            .collect();

        let now = Utc::now();
        self.dispatcher.dispatch(&notification, &receivers).await;
        self.notifications.mark_sent(id, now).await?;
        notification.sent_at = Some(now);

        info!(notification_id = %id, receivers = receivers.len(), "notification dispatched on demand");
        Ok(notification)
    }

    /// The receiver roster with read flags.
    pub async fn receivers(&self, id: Uuid) -> AppResult<Vec<Receiver>> {
        self.get(id).await?;
        self.notifications.receivers(id).await
    }

    /// Acknowledgment progress for a notification.
    pub async fn ack_status(&self, id: Uuid) -> AppResult<AckStatus> {
        self.get(id).await?;
        let requires = self.notifications.requires_acknowledgment(id).await?;
        let acknowledged_count = if requires {
            self.notifications.ack_count(id).await?
        } else {
            0
        };
        Ok(AckStatus {
            requires_acknowledgment: requires,
            acknowledged_count,
        })
    }

    /// Mark a notification read for the caller. Idempotent; returns
    /// whether this call flipped the flag. Callers outside the roster
    /// get `false`, not an error.
    pub async fn mark_read(&self, ctx: &RequestContext, id: Uuid) -> AppResult<bool> {
        self.get(id).await?;
        self.notifications
            .mark_read(id, ctx.user_id, Utc::now())
            .await
    }

    /// Record the caller's acknowledgment. Idempotent; returns whether
    /// this call flipped the flag. Callers outside the acknowledgment
    /// roster, including records that track none at all, get `false`,
    /// not an error.
    pub async fn acknowledge(&self, ctx: &RequestContext, id: Uuid) -> AppResult<bool> {
        self.get(id).await?;
        self.notifications
            .acknowledge(id, ctx.user_id, Utc::now())
            .await
    }

    /// Aggregate statistics over records created since `since` (all
    /// records when `None`).
    pub async fn statistics(&self, since: Option<DateTime<Utc>>) -> AppResult<StatisticsReport> {
        let records = self.notifications.find_since(since).await?;
        Ok(aggregate(&records, Utc::now()))
    }

    /// Load only the directory slice the targeting rule needs.
    async fn load_snapshot(
        &self,
        target_type: TargetType,
        target_ids: &[String],
    ) -> AppResult<DirectorySnapshot> {
        let snapshot = match target_type {
            TargetType::All => DirectorySnapshot {
                active_users: self.users.find_active_ids().await?,
                students: Vec::new(),
            },
            TargetType::Students => self.student_slice(StudentFilter::default()).await?,
            TargetType::Course => {
                self.student_slice(StudentFilter {
                    courses: Some(target_ids.to_vec()),
                    batch_years: None,
                })
                .await?
            }
            TargetType::Batch => {
                let years: Vec<i32> = target_ids
                    .iter()
                    .filter_map(|id| id.trim().parse().ok())
                    .collect();
                self.student_slice(StudentFilter {
                    courses: None,
                    batch_years: Some(years),
                })
                .await?
            }
            // Individual targeting needs no directory; unknown rules
            // resolve to nobody.
            TargetType::Individual | TargetType::Unknown => DirectorySnapshot::default(),
        };
        Ok(snapshot)
    }

    async fn student_slice(&self, filter: StudentFilter) -> AppResult<DirectorySnapshot> {
        let students = self.students.find_active(&filter).await?;
        Ok(DirectorySnapshot {
            active_users: Vec::new(),
            students: students.into_iter().map(Into::into).collect(),
        })
    }

    fn authorize_owner(&self, ctx: &RequestContext, notification: &Notification) -> AppResult<()> {
        if ctx.is_admin() || notification.sender_id == ctx.user_id {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Only the sender or an admin may modify this notification",
            ))
        }
    }
}

/// Reject blank content and normalize channels before anything is
/// resolved or persisted.
fn validate_create(mut input: CreateNotification) -> AppResult<CreateNotification> {
    if input.title.trim().is_empty() {
        return Err(AppError::validation("Title must not be empty"));
    }
    if input.message.trim().is_empty() {
        return Err(AppError::validation("Message must not be empty"));
    }
    if input.target_type == TargetType::Individual && input.target_ids.is_empty() {
        return Err(AppError::validation(
            "Individual targeting requires at least one target id",
        ));
    }
    if !input.send_methods.contains(&SendMethod::Dashboard) {
        input.send_methods.insert(0, SendMethod::Dashboard);
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateNotification {
        CreateNotification {
            title: "Exam hall allocation".into(),
            message: "Check the portal".into(),
            kind: NotificationKind::Info,
            category: "Exams".into(),
            priority: Priority::High,
            target_type: TargetType::Students,
            target_ids: vec![],
            send_methods: vec![SendMethod::Dashboard],
            action_url: None,
            action_text: None,
            schedule_at: None,
            expiry_date: None,
            requires_acknowledgment: false,
        }
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut bad = input();
        bad.title = "   ".into();
        assert!(validate_create(bad).is_err());
    }

    #[test]
    fn test_blank_message_rejected() {
        let mut bad = input();
        bad.message = String::new();
        assert!(validate_create(bad).is_err());
    }

    #[test]
    fn test_individual_without_targets_rejected() {
        let mut bad = input();
        bad.target_type = TargetType::Individual;
        bad.target_ids = vec![];
        assert!(validate_create(bad).is_err());
    }

    #[test]
    fn test_dashboard_channel_always_present() {
        let mut no_dashboard = input();
        no_dashboard.send_methods = vec![SendMethod::Email];
        let normalized = validate_create(no_dashboard).unwrap();
        assert_eq!(normalized.send_methods[0], SendMethod::Dashboard);
        assert!(normalized.send_methods.contains(&SendMethod::Email));
    }
}
