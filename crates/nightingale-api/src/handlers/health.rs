//! Health endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::state::SharedState;

/// GET /api/health — liveness plus database and live-session snapshot.
pub async fn health(State(state): State<SharedState>) -> Response {
    let database_up = state.db.ping().await.is_ok();
    let status = if database_up { "ok" } else { "degraded" };
    let code = if database_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(json!({
            "status": status,
            "database": if database_up { "up" } else { "down" },
            "live_connections": state.realtime.connection_count(),
        })),
    )
        .into_response()
}
