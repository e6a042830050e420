//! Shared application state.

use std::sync::Arc;

use nightingale_core::config::AppConfig;
use nightingale_database::connection::DatabasePool;
use nightingale_database::repositories::student::StudentRepository;
use nightingale_realtime::RealtimeEngine;
use nightingale_service::notification::NotificationService;

/// Everything the handlers need, wired once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: AppConfig,
    /// Notification business logic.
    pub notifications: NotificationService,
    /// Student directory, for room joins on WebSocket connect.
    pub students: StudentRepository,
    /// Database pool, for health checks.
    pub db: DatabasePool,
    /// Live-session engine.
    pub realtime: RealtimeEngine,
}

/// State handle shared across the router.
pub type SharedState = Arc<AppState>;
