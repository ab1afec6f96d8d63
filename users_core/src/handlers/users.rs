//! `/v1/users` routes

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::info;

use crate::{
    error::{AppError, Result},
    extractors::{QueryParams, ValidatedJson},
    files::DEFAULT_MEDIA_TYPE,
    models::{ApiResponse, PaginationQuery},
    users::CreateUserRequest,
    AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user).put(create_user))
        .route("/:user_id", get(get_user).delete(delete_user))
        .route("/:user_id/files", get(list_user_files).post(create_user_file))
        .route(
            "/:user_id/files/:file_id",
            get(get_user_file).delete(delete_user_file),
        )
        .route("/:user_id/files/:file_id/download", get(download_user_file))
}

async fn list_users(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PaginationQuery>,
) -> Result<impl IntoResponse> {
    info!(limit = ?query.limit, page = ?query.page, "Listing users");

    let users = state.user_service.list_users(query.into()).await?;
    Ok(Json(ApiResponse::with_message(users, "users retrieved")))
}

async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.create_user(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, "new user created")),
    ))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_user(&user_id).await?;
    Ok(Json(ApiResponse::with_message(user, "user retrieved")))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    state.user_service.delete_user(&user_id).await?;
    Ok(Json(ApiResponse::message("user deleted")))
}

async fn list_user_files(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    QueryParams(query): QueryParams<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let files = state
        .user_service
        .list_user_files(&user_id, query.into())
        .await?;
    Ok(Json(ApiResponse::with_message(files, "user files retrieved")))
}

async fn create_user_file(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    let file = state.user_service.create_user_file(&user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(file, "new user file created")),
    ))
}

async fn get_user_file(
    State(state): State<AppState>,
    Path((user_id, file_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let file = state.user_service.get_user_file(&user_id, &file_id).await?;
    Ok(Json(ApiResponse::with_message(file, "user file retrieved")))
}

async fn delete_user_file(
    State(state): State<AppState>,
    Path((user_id, file_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    state
        .user_service
        .delete_user_file(&user_id, &file_id)
        .await?;
    Ok(Json(ApiResponse::message("user file deleted")))
}

async fn download_user_file(
    State(state): State<AppState>,
    Path((user_id, file_id)): Path<(String, String)>,
) -> Result<Response> {
    let file = state
        .user_service
        .download_user_file(&user_id, &file_id)
        .await?;

    let content_type = HeaderValue::from_str(&file.media_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MEDIA_TYPE));
    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.filename()))
            .map_err(|e| AppError::internal("unexpected error preparing download", e))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    )
        .into_response())
}
