//! Notification endpoints.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use nightingale_core::types::pagination::PageRequest;
use nightingale_database::repositories::notification::NotificationFilter;

use crate::dto::request::{
    CreateNotificationRequest, ListNotificationsQuery, StatsQuery, UpdateNotificationRequest,
};
use crate::dto::response::{created, ok, ok_message};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::SharedState;

/// POST /api/notifications — create and dispatch (admin).
pub async fn create(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(body): Json<CreateNotificationRequest>,
) -> Result<Response, ApiError> {
    auth.require_admin()?;
    body.validate()?;

    let notification = state
        .notifications
        .create(&auth.context(), body.into_input())
        .await?;

    Ok(created(notification))
}

/// GET /api/notifications — filtered, paginated list plus an aggregate
/// snapshot.
pub async fn list(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Response, ApiError> {
    let filter = NotificationFilter {
        category: query.category,
        priority: query.priority,
        status: query.status,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let page = PageRequest::new(query.page, query.page_size);

    let listing = state.notifications.list(&filter, &page).await?;
    let stats = state.notifications.statistics(None).await?;

    Ok(ok(json!({
        "notifications": listing,
        "stats": stats.overview,
    })))
}

/// GET /api/notifications/stats — full aggregator output (admin).
pub async fn stats(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<StatsQuery>,
) -> Result<Response, ApiError> {
    auth.require_admin()?;
    let report = state.notifications.statistics(query.since).await?;
    Ok(ok(report))
}

/// GET /api/notifications/{id} — single record with engagement stats.
pub async fn detail(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let notification = state.notifications.get(id).await?;
    let ack = state.notifications.ack_status(id).await?;
    let read_percentage = notification.read_rate() * 100.0;

    Ok(ok(json!({
        "notification": notification,
        "read_count": notification.read_count,
        "ack_count": ack.acknowledged_count,
        "requires_acknowledgment": ack.requires_acknowledgment,
        "read_percentage": read_percentage,
    })))
}

/// PUT /api/notifications/{id} — update allow-listed fields (admin).
pub async fn update(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNotificationRequest>,
) -> Result<Response, ApiError> {
    auth.require_admin()?;
    body.validate()?;

    let notification = state
        .notifications
        .update(&auth.context(), id, &body.into_update())
        .await?;

    Ok(ok(notification))
}

/// DELETE /api/notifications/{id} — hard delete (admin).
pub async fn remove(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    auth.require_admin()?;
    state.notifications.delete(&auth.context(), id).await?;
    Ok(ok_message("Notification deleted"))
}

/// POST /api/notifications/{id}/send — dispatch a held record now
/// (admin).
pub async fn send(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    auth.require_admin()?;
    let notification = state.notifications.send_now(&auth.context(), id).await?;
    Ok(ok(notification))
}

/// GET /api/notifications/{id}/receivers — roster with read flags
/// (admin).
pub async fn receivers(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    auth.require_admin()?;
    let roster = state.notifications.receivers(id).await?;
    Ok(ok(roster))
}

/// PUT /api/notifications/{id}/read — caller marks the record read.
pub async fn mark_read(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let updated = state
        .notifications
        .mark_read(&auth.context(), id)
        .await?;
    Ok(ok(json!({"updated": updated})))
}

/// PUT /api/notifications/{id}/acknowledge — caller acknowledges.
pub async fn acknowledge(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let updated = state
        .notifications
        .acknowledge(&auth.context(), id)
        .await?;
    Ok(ok(json!({"updated": updated})))
}
