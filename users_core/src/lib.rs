//! Users and user-files API: persistence, orchestration and HTTP routes.

pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod files;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::AppConfig;
pub use database::{get_database_pool, run_migrations, DatabaseManager};
pub use error::{AppError, Result};
pub use files::{ContentValidator, FileSource, HttpFileSource};
pub use handlers::create_routes;
pub use metrics::MetricsCollector;
pub use users::{UserFileRepository, UserRepository, UserService, UserServiceConfig};

use std::{net::SocketAddr, sync::Arc};

use axum::{middleware as axum_middleware, Router};
use sqlx::SqlitePool;
use tokio::signal;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub db_manager: DatabaseManager,
    pub user_service: UserService,
    pub metrics: MetricsCollector,
}

impl AppState {
    pub fn new(db_manager: DatabaseManager, user_service: UserService) -> Self {
        Self {
            app_name: "Users API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            db_manager,
            user_service,
            metrics: MetricsCollector::new(),
        }
    }

    /// Wires the SQLite repositories and the given file source into a service.
    pub fn from_parts(
        pool: SqlitePool,
        file_source: Arc<dyn FileSource>,
        config: &AppConfig,
    ) -> Self {
        let user_service = UserService::new(
            Arc::new(UserRepository::new(pool.clone())),
            Arc::new(UserFileRepository::new(pool.clone())),
            file_source,
            ContentValidator::new(),
            UserServiceConfig::from(config),
        );

        Self::new(DatabaseManager::new(pool), user_service)
    }
}

pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    create_routes()
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics::metrics_middleware,
        ))
        .layer(middleware::logging::logging_layer())
        .layer(middleware::cors::cors_layer_from_config(&config.cors))
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
