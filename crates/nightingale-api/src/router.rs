//! Router assembly.

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{middleware as axum_middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use nightingale_core::config::CorsConfig;

use crate::handlers::{health, notification, ws};
use crate::middleware::logging;
use crate::state::SharedState;

/// Build the full application router.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.server.cors);

    Router::new()
        .route("/api/health", get(health::health))
        .merge(notification_routes())
        .route("/ws", get(ws::ws_handler))
        .layer(axum_middleware::from_fn(logging::request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn notification_routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/notifications",
            post(notification::create).get(notification::list),
        )
        // Must precede the `{id}` routes so "stats" is not parsed as an id.
        .route("/api/notifications/stats", get(notification::stats))
        .route(
            "/api/notifications/{id}",
            get(notification::detail)
                .put(notification::update)
                .delete(notification::remove),
        )
        .route("/api/notifications/{id}/send", post(notification::send))
        .route(
            "/api/notifications/{id}/receivers",
            get(notification::receivers),
        )
        .route("/api/notifications/{id}/read", put(notification::mark_read))
        .route(
            "/api/notifications/{id}/acknowledge",
            put(notification::acknowledge),
        )
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new().max_age(std::time::Duration::from_secs(
        config.max_age_seconds,
    ));

    if config.allowed_origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    if config.allowed_headers.iter().any(|h| h == "*") {
        layer = layer.allow_headers(Any);
    } else {
        layer = layer.allow_headers(
            config
                .allowed_headers
                .iter()
                .filter_map(|h| h.parse().ok())
                .collect::<Vec<_>>(),
        );
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    layer.allow_methods(methods)
}
