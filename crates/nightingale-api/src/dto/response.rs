//! Response envelope helpers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// `200 {"success": true, "data": ...}`
pub fn ok<T: Serialize>(data: T) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

/// `201 {"success": true, "data": ...}`
pub fn created<T: Serialize>(data: T) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "data": data})),
    )
        .into_response()
}

/// `200 {"success": true, "message": ...}`
pub fn ok_message(message: &str) -> Response {
    Json(json!({"success": true, "message": message})).into_response()
}
