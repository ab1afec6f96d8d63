use axum::{extract::State, Json};

use crate::{metrics::MetricsSnapshot, models::ApiResponse, AppState};

pub async fn handle_metrics(State(state): State<AppState>) -> Json<ApiResponse<MetricsSnapshot>> {
    Json(ApiResponse::success(state.metrics.snapshot()))
}
