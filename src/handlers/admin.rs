// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        cheat_flag::{FlagListParams, ReviewFlagRequest},
        lesson::CreateLessonRequest,
        question::QuizUploadRequest,
        quiz::UpdateQuizConfigRequest,
        user::PromoteUserRequest,
    },
    quiz::attempt,
    state::AppState,
    store::{NewLesson, NewQuestion, StoreError},
    utils::jwt::Claims,
};

// --- users ---

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_users().await?))
}

/// Grants or revokes admin on a user.
pub async fn promote_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PromoteUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.set_user_admin(id, payload.is_admin).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({ "id": id, "is_admin": payload.is_admin })))
}

// --- lessons ---

/// Creates a lesson. The body is sanitized before storage so the reader
/// view can render it as trusted HTML.
pub async fn create_lesson(
    State(state): State<AppState>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let lesson = state
        .store
        .create_lesson(NewLesson {
            category: payload.category,
            title: payload.title,
            content: ammonia::clean(&payload.content),
            video_url: payload.video_url,
            order_index: payload.order_index.unwrap_or(0),
        })
        .await?;

    tracing::info!("lesson {} created in '{}'", lesson.id, lesson.category);

    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn list_lessons(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_lessons().await?))
}

/// Deletes a lesson and its dependent records (questions, progress,
/// attempts, config).
pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_lesson(id).await? {
        return Err(AppError::NotFound("Lesson not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// --- question pool ---

/// Replaces the lesson's question pool wholesale.
pub async fn upload_questions(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
    Json(payload): Json<QuizUploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if state.store.lesson_by_id(lesson_id).await?.is_none() {
        return Err(AppError::NotFound("Lesson not found".to_string()));
    }

    let questions: Vec<NewQuestion> = payload
        .questions
        .into_iter()
        .map(|q| NewQuestion {
            question: q.question,
            options: q.options,
            correct_option: q.correct_option,
        })
        .collect();

    let count = state.store.replace_questions(lesson_id, questions).await?;

    Ok((StatusCode::CREATED, Json(json!({ "count": count }))))
}

pub async fn delete_questions(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if state.store.lesson_by_id(lesson_id).await?.is_none() {
        return Err(AppError::NotFound("Lesson not found".to_string()));
    }

    state.store.delete_questions(lesson_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// --- quiz config ---

/// The effective config for a lesson, defaults included.
pub async fn get_quiz_config(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if state.store.lesson_by_id(lesson_id).await?.is_none() {
        return Err(AppError::NotFound("Lesson not found".to_string()));
    }

    Ok(Json(attempt::resolved_config(state.store.as_ref(), lesson_id).await?))
}

/// Merges the request over the effective config and persists the result.
pub async fn update_quiz_config(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
    Json(payload): Json<UpdateQuizConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if state.store.lesson_by_id(lesson_id).await?.is_none() {
        return Err(AppError::NotFound("Lesson not found".to_string()));
    }

    let current = attempt::resolved_config(state.store.as_ref(), lesson_id).await?;
    let updated = state
        .store
        .upsert_quiz_config(&payload.apply_to(current))
        .await?;

    Ok(Json(updated))
}

// --- anti-cheat review ---

/// Completed attempts flagged by the timing validator, newest first.
pub async fn suspicious_attempts(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_suspicious_attempts().await?))
}

/// The cheat-flag review queue.
pub async fn list_flags(
    State(state): State<AppState>,
    Query(params): Query<FlagListParams>,
) -> Result<impl IntoResponse, AppError> {
    let flags = state
        .store
        .list_cheat_flags(params.unreviewed_only.unwrap_or(false))
        .await?;

    Ok(Json(flags))
}

/// Resolves a flag. 'tokens_revoked' reverses the latest reward for the
/// flagged (user, lesson) and debits the wallet, floored at zero.
pub async fn review_flag(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(flag_id): Path<i64>,
    Json(payload): Json<ReviewFlagRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let outcome = state
        .store
        .review_cheat_flag(
            flag_id,
            claims.user_id()?,
            &payload.action,
            state.clock.now(),
        )
        .await
        .map_err(|e| match e {
            StoreError::NotFound => AppError::NotFound("Cheat flag not found".to_string()),
            other => other.into(),
        })?;

    tracing::info!(
        "cheat flag {} reviewed: action={} tokens_revoked={}",
        flag_id,
        payload.action,
        outcome.tokens_revoked
    );

    Ok(Json(outcome))
}
