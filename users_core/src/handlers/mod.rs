//! HTTP route handlers

pub mod health;
pub mod metrics;
pub mod users;

use axum::{routing::get, Router};

use crate::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::handle_health))
        .route("/metrics", get(metrics::handle_metrics))
        .nest("/v1/users", users::user_routes())
}
