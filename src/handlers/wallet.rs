// src/handlers/wallet.rs

use axum::{
    Json,
    extract::{Extension, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::wallet::{RewardSummary, TokenBalance},
    state::AppState,
    utils::jwt::Claims,
};

const HISTORY_LIMIT: i64 = 50;

/// Current token balance of the authenticated user.
pub async fn balance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let token_balance = state
        .store
        .wallet_balance(claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::NotFound("Wallet not found".to_string()))?;

    Ok(Json(TokenBalance { token_balance }))
}

/// Recent reward ledger entries, newest first. Reversed rewards stay
/// visible and are marked as such.
pub async fn history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state
        .store
        .reward_history(claims.user_id()?, HISTORY_LIMIT)
        .await?;

    Ok(Json(rows))
}

/// Lifetime earning totals, reversed rewards excluded.
pub async fn summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let (total_tokens_earned, total_quizzes_passed) =
        state.store.reward_summary(claims.user_id()?).await?;

    Ok(Json(RewardSummary {
        total_tokens_earned,
        total_quizzes_passed,
    }))
}
