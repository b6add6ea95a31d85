// src/models/wallet.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'wallets' table. The single mutable balance of record,
/// touched by reward issuance and by admin flag-review reversal.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: i64,
    pub token_balance: i64,
}

/// Represents the 'rewards' table. Append-only ledger; revocation marks the
/// row `reversed` instead of deleting it, so ledger and balance stay
/// reconcilable.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Reward {
    pub id: i64,
    pub user_id: i64,
    pub lesson_id: i64,
    pub tokens_earned: i64,
    pub reversed: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct TokenBalance {
    pub token_balance: i64,
}

/// Joined row for the wallet history view.
#[derive(Debug, Serialize, FromRow)]
pub struct RewardHistoryRow {
    pub id: i64,
    pub lesson_title: String,
    pub tokens_earned: i64,
    pub reversed: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct RewardSummary {
    pub total_tokens_earned: i64,
    pub total_quizzes_passed: i64,
}
