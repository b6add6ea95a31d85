// src/handlers/lessons.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::lesson::ReadTimeRequest,
    state::AppState,
    utils::jwt::Claims,
};

/// Lists lesson categories with their lesson counts.
pub async fn categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.lesson_categories().await?))
}

/// Lists the lessons of one category, ordered by position.
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.lessons_by_category(&category).await?))
}

/// Fetches a single lesson and marks it opened for the user.
pub async fn detail(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = state
        .store
        .lesson_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;

    state
        .store
        .mark_lesson_completed(claims.user_id()?, id)
        .await?;

    Ok(Json(lesson))
}

/// Read-time heartbeat. The accumulated total feeds the minimum-read-time
/// gate at quiz start.
pub async fn read_time(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<ReadTimeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if state.store.lesson_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("Lesson not found".to_string()));
    }

    let total = state
        .store
        .add_read_seconds(claims.user_id()?, id, payload.seconds)
        .await?;

    Ok(Json(json!({ "read_seconds": total })))
}
