use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::{models::ApiResponse, AppState};

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    match state.db_manager.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(json!({
                "status": "healthy",
                "database": "healthy",
                "version": state.version,
            }))),
        ),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    success: false,
                    data: Some(json!({
                        "status": "unhealthy",
                        "database": "unhealthy",
                        "version": state.version,
                    })),
                    message: Some("database unavailable".to_string()),
                }),
            )
        }
    }
}
