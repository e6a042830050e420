//! Nightingale server — notification backend for the institute portal.
//!
//! Entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use nightingale_core::config::AppConfig;
use nightingale_core::error::AppError;
use nightingale_core::traits::Broadcaster;
use nightingale_database::connection::DatabasePool;
use nightingale_database::repositories::notification::NotificationRepository;
use nightingale_database::repositories::student::StudentRepository;
use nightingale_database::repositories::user::UserRepository;
use nightingale_realtime::RealtimeEngine;
use nightingale_service::notification::{DeliveryDispatcher, NotificationService};

#[tokio::main]
async fn main() {
    let env = std::env::var("NIGHTINGALE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Nightingale v{}", env!("CARGO_PKG_VERSION"));

    // Database connection + migrations
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;
    db.run_migrations().await?;

    // Repositories
    let notification_repo = NotificationRepository::new(db.pool().clone());
    let user_repo = UserRepository::new(db.pool().clone());
    let student_repo = StudentRepository::new(db.pool().clone());

    // Real-time engine + delivery fan-out
    let realtime = RealtimeEngine::new(config.realtime.clone());
    let broadcaster: Arc<dyn Broadcaster> = Arc::new(realtime.clone());
    let dispatcher = DeliveryDispatcher::new(broadcaster);

    let notifications = NotificationService::new(
        notification_repo,
        user_repo,
        student_repo.clone(),
        dispatcher,
    );

    let state = Arc::new(nightingale_api::AppState {
        config: config.clone(),
        notifications,
        students: student_repo,
        db: db.clone(),
        realtime: realtime.clone(),
    });

    let app = nightingale_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Nightingale server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            realtime.shutdown();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    tracing::info!("Nightingale server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
