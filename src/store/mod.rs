// src/store/mod.rs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::models::{
    cheat_flag::{CheatFlag, CheatFlagRow, NewCheatFlag},
    lesson::{CategoryCount, Lesson},
    question::QuizQuestion,
    quiz::{QuizAttempt, QuizConfig, QuizRateLimit, QuizResult, SuspiciousAttemptRow},
    user::User,
    wallet::RewardHistoryRow,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage-layer error, mapped to `AppError` at the handler boundary.
#[derive(Debug)]
pub enum StoreError {
    NotFound,
    /// Uniqueness violation (duplicate email, duplicate quiz result, ...).
    Duplicate(String),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::Duplicate(msg) => write!(f, "duplicate: {}", msg),
            StoreError::Backend(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Insert payload for signup. The wallet row is created in the same
/// transaction as the user.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub starting_balance: i64,
}

#[derive(Debug)]
pub struct NewLesson {
    pub category: String,
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub order_index: i64,
}

#[derive(Debug)]
pub struct NewQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: String,
}

#[derive(Debug)]
pub struct NewAttempt {
    pub user_id: i64,
    pub lesson_id: i64,
    pub question_ids: Vec<i64>,
    pub started_at: DateTime<Utc>,
}

/// Everything `submit()` persists atomically: attempt completion, the
/// quiz-result row and, when `tokens_awarded > 0`, the wallet credit plus
/// reward ledger row. Partial failure must not award tokens without a
/// matching ledger entry or vice versa.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub attempt_id: i64,
    pub user_id: i64,
    pub lesson_id: i64,
    pub completed_at: DateTime<Utc>,
    pub total_time_seconds: i64,
    pub score: i64,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub passed: bool,
    pub flagged_suspicious: bool,
    pub tokens_awarded: i64,
}

/// Result of an admin flag review.
#[derive(Debug, serde::Serialize)]
pub struct ReviewOutcome {
    pub flag: CheatFlag,
    /// Tokens actually debited when the action was `tokens_revoked`.
    pub tokens_revoked: i64,
}

/// Repository interface over the relational store.
///
/// All lookups are explicit; the quiz core never traverses implicit
/// relationships. Multi-step mutations are trait methods so each
/// implementation can wrap them in its own transaction boundary.
#[async_trait]
pub trait QuizStore: Send + Sync {
    // --- users & wallets ---
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>>;
    async fn user_count(&self) -> StoreResult<i64>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn set_user_admin(&self, id: i64, is_admin: bool) -> StoreResult<bool>;
    async fn wallet_balance(&self, user_id: i64) -> StoreResult<Option<i64>>;
    async fn reward_history(&self, user_id: i64, limit: i64) -> StoreResult<Vec<RewardHistoryRow>>;
    /// Returns (total tokens earned, passing quiz count), reversed rewards excluded.
    async fn reward_summary(&self, user_id: i64) -> StoreResult<(i64, i64)>;

    // --- lessons & progress ---
    async fn create_lesson(&self, new: NewLesson) -> StoreResult<Lesson>;
    async fn lesson_by_id(&self, id: i64) -> StoreResult<Option<Lesson>>;
    async fn list_lessons(&self) -> StoreResult<Vec<Lesson>>;
    async fn lessons_by_category(&self, category: &str) -> StoreResult<Vec<Lesson>>;
    async fn lesson_categories(&self) -> StoreResult<Vec<CategoryCount>>;
    /// Deletes the lesson and all dependent records.
    async fn delete_lesson(&self, id: i64) -> StoreResult<bool>;
    async fn mark_lesson_completed(&self, user_id: i64, lesson_id: i64) -> StoreResult<()>;
    /// Accumulates a read-time heartbeat; returns the new total.
    async fn add_read_seconds(&self, user_id: i64, lesson_id: i64, seconds: i64)
    -> StoreResult<i64>;
    async fn read_seconds(&self, user_id: i64, lesson_id: i64) -> StoreResult<i64>;
    async fn completed_lesson_count(&self, user_id: i64) -> StoreResult<i64>;

    // --- question pool ---
    /// Replaces the lesson's pool wholesale (admin upload semantics).
    async fn replace_questions(
        &self,
        lesson_id: i64,
        questions: Vec<NewQuestion>,
    ) -> StoreResult<usize>;
    async fn delete_questions(&self, lesson_id: i64) -> StoreResult<()>;
    async fn active_questions(&self, lesson_id: i64) -> StoreResult<Vec<QuizQuestion>>;
    async fn questions_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<QuizQuestion>>;

    // --- quiz config ---
    async fn quiz_config(&self, lesson_id: i64) -> StoreResult<Option<QuizConfig>>;
    async fn upsert_quiz_config(&self, cfg: &QuizConfig) -> StoreResult<QuizConfig>;

    // --- rate limits ---
    async fn rate_limit(&self, user_id: i64) -> StoreResult<Option<QuizRateLimit>>;
    async fn save_rate_limit(&self, rl: &QuizRateLimit) -> StoreResult<()>;

    // --- attempts & results ---
    async fn insert_attempt(&self, new: NewAttempt) -> StoreResult<QuizAttempt>;
    async fn attempt_by_id(&self, id: i64) -> StoreResult<Option<QuizAttempt>>;
    /// Most recent attempt by start time for (user, lesson).
    async fn latest_attempt(&self, user_id: i64, lesson_id: i64)
    -> StoreResult<Option<QuizAttempt>>;
    async fn quiz_result(&self, user_id: i64, lesson_id: i64) -> StoreResult<Option<QuizResult>>;
    /// Most recent results for the user, newest first.
    async fn recent_results(&self, user_id: i64, limit: i64) -> StoreResult<Vec<QuizResult>>;
    async fn result_count(&self, user_id: i64) -> StoreResult<i64>;
    /// Transactional submit finalization. Fails with `Duplicate` when a
    /// result already exists for (user, lesson).
    async fn finalize_submission(&self, outcome: SubmissionOutcome) -> StoreResult<QuizResult>;
    async fn list_suspicious_attempts(&self) -> StoreResult<Vec<SuspiciousAttemptRow>>;

    // --- cheat flags ---
    async fn insert_cheat_flag(&self, new: NewCheatFlag) -> StoreResult<CheatFlag>;
    async fn list_cheat_flags(&self, unreviewed_only: bool) -> StoreResult<Vec<CheatFlagRow>>;
    /// Marks the flag reviewed and, for `tokens_revoked`, reverses the most
    /// recent non-reversed reward for (flag.user, flag.lesson) and debits the
    /// wallet, floored at zero, in one transaction.
    async fn review_cheat_flag(
        &self,
        flag_id: i64,
        reviewer_id: i64,
        action: &str,
        reviewed_at: DateTime<Utc>,
    ) -> StoreResult<ReviewOutcome>;
}
