// src/handlers/auth.rs

use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::SIGNUP_TOKEN_BONUS,
    error::AppError,
    models::user::{LoginRequest, SignupRequest, UserStats},
    state::AppState,
    store::{NewUser, StoreError},
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
    },
};

fn role_of(is_admin: bool) -> &'static str {
    if is_admin { "admin" } else { "user" }
}

/// Registers a new user and seeds their wallet with the signup bonus.
/// The very first account becomes the admin.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let is_admin = state.store.user_count().await? == 0;

    let user = state
        .store
        .create_user(NewUser {
            name: payload.name,
            email: payload.email.clone(),
            password_hash,
            is_admin,
            starting_balance: SIGNUP_TOKEN_BONUS,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => {
                AppError::Conflict(format!("Email '{}' is already registered", payload.email))
            }
            other => other.into(),
        })?;

    // Fire-and-forget; signup never waits on delivery.
    let notifier = state.notifier.clone();
    let (email, name) = (user.email.clone(), user.name.clone());
    tokio::spawn(async move {
        notifier.send_welcome(&email, &name).await;
    });

    let token = sign_jwt(
        user.id,
        role_of(user.is_admin),
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    tracing::info!("user {} registered (admin: {})", user.id, user.is_admin);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": token,
            "type": "Bearer",
            "user": user,
        })),
    ))
}

/// Authenticates by email and password, returns a signed JWT.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = state
        .store
        .user_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    let token = sign_jwt(
        user.id,
        role_of(user.is_admin),
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user": user,
    })))
}

/// Returns the authenticated user's profile.
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store
        .user_by_id(claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Aggregated learning stats for the authenticated user.
pub async fn stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let lessons_completed = state.store.completed_lesson_count(user_id).await?;
    let quizzes_taken = state.store.result_count(user_id).await?;

    Ok(Json(UserStats {
        lessons_completed,
        quizzes_taken,
    }))
}
