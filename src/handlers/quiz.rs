// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    response::IntoResponse,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::{
    error::AppError,
    models::quiz::{QuizStatusResponse, StartQuizRequest, SubmitQuizRequest},
    quiz::{attempt, cooldown, rate_limit},
    state::AppState,
    utils::jwt::Claims,
};

/// Reports whether the user may attempt this lesson's quiz right now,
/// without consuming any budget.
pub async fn status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let store = state.store.as_ref();
    let clock = state.clock.as_ref();

    if state.store.quiz_result(user_id, lesson_id).await?.is_some() {
        return Ok(Json(QuizStatusResponse {
            can_attempt: false,
            reason: Some("Quiz already completed for this lesson".to_string()),
            cooldown_remaining: None,
            hourly_attempts_remaining: 0,
            daily_attempts_remaining: 0,
        }));
    }

    let rl = rate_limit::check_and_maybe_init(store, clock, user_id).await?;

    let cfg = attempt::resolved_config(store, lesson_id).await?;
    let cd = cooldown::check(store, clock, user_id, lesson_id, cfg.cooldown_seconds).await?;

    let (can_attempt, reason, cooldown_remaining) = if !rl.can_attempt {
        (false, rl.reason.clone(), None)
    } else if !cd.can_attempt {
        (
            false,
            Some("Cooldown active".to_string()),
            Some(cd.remaining_seconds),
        )
    } else {
        (true, None, None)
    };

    Ok(Json(QuizStatusResponse {
        can_attempt,
        reason,
        cooldown_remaining,
        hourly_attempts_remaining: rl.hourly_remaining,
        daily_attempts_remaining: rl.daily_remaining,
    }))
}

/// Starts a quiz attempt: runs the gate checks and serves a fresh draw of
/// questions with the answers stripped.
pub async fn start(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut rng = StdRng::from_entropy();

    let response = attempt::start(
        state.store.as_ref(),
        state.clock.as_ref(),
        &mut rng,
        claims.user_id()?,
        payload.lesson_id,
    )
    .await?;

    Ok(Json(response))
}

/// Submits a quiz attempt for grading.
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = attempt::submit(
        state.store.as_ref(),
        state.clock.as_ref(),
        claims.user_id()?,
        payload,
    )
    .await?;

    Ok(Json(response))
}
