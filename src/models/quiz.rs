// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::config;
use crate::models::question::PublicQuestion;

/// Per-lesson anti-cheat policy. One row per lesson, admin-owned.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizConfig {
    pub lesson_id: i64,

    /// Questions drawn from the pool per attempt.
    pub questions_per_quiz: i64,

    /// Tokens credited on a passing, non-suspicious attempt.
    pub token_reward: i64,

    /// Passing score in percent (0-100).
    pub passing_score: i64,

    /// Minimum spacing between attempt starts on this lesson.
    pub cooldown_seconds: i64,

    /// Minimum recorded lesson read time before an attempt may start.
    pub min_read_time_seconds: i64,

    /// Minimum plausible answer time per question.
    pub min_time_per_question: i64,
}

impl QuizConfig {
    /// Policy applied to lessons without an explicit config row.
    pub fn defaults_for(lesson_id: i64) -> Self {
        Self {
            lesson_id,
            questions_per_quiz: config::DEFAULT_QUESTIONS_PER_QUIZ,
            token_reward: config::DEFAULT_TOKEN_REWARD,
            passing_score: config::DEFAULT_PASSING_SCORE,
            cooldown_seconds: config::DEFAULT_COOLDOWN_SECONDS,
            min_read_time_seconds: config::DEFAULT_MIN_READ_TIME_SECONDS,
            min_time_per_question: config::DEFAULT_MIN_TIME_PER_QUESTION,
        }
    }
}

/// DTO for the admin config upsert. Absent fields keep their current
/// (or default) values.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuizConfigRequest {
    #[validate(range(min = 1, max = 100))]
    pub questions_per_quiz: Option<i64>,
    #[validate(range(min = 0, max = 1000000))]
    pub token_reward: Option<i64>,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i64>,
    #[validate(range(min = 0, max = 86400))]
    pub cooldown_seconds: Option<i64>,
    #[validate(range(min = 0, max = 86400))]
    pub min_read_time_seconds: Option<i64>,
    #[validate(range(min = 0, max = 3600))]
    pub min_time_per_question: Option<i64>,
}

impl UpdateQuizConfigRequest {
    /// Merges the request over an existing config.
    pub fn apply_to(&self, mut cfg: QuizConfig) -> QuizConfig {
        if let Some(v) = self.questions_per_quiz {
            cfg.questions_per_quiz = v;
        }
        if let Some(v) = self.token_reward {
            cfg.token_reward = v;
        }
        if let Some(v) = self.passing_score {
            cfg.passing_score = v;
        }
        if let Some(v) = self.cooldown_seconds {
            cfg.cooldown_seconds = v;
        }
        if let Some(v) = self.min_read_time_seconds {
            cfg.min_read_time_seconds = v;
        }
        if let Some(v) = self.min_time_per_question {
            cfg.min_time_per_question = v;
        }
        cfg
    }
}

/// Represents the 'quiz_attempts' table.
/// An attempt is STARTED until `completed_at` is set, then terminal.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub lesson_id: i64,

    /// The sampled question ids, frozen at attempt start. Grading only
    /// accepts answers whose ids match this set exactly.
    pub question_ids: Json<Vec<i64>>,

    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Client-declared total time, recorded at submit.
    pub total_time_seconds: Option<i64>,

    pub score: Option<i64>,
    pub passed: bool,
    pub flagged_suspicious: bool,
}

/// Represents the 'quiz_results' table. Append-only; unique per
/// (user, lesson) at the storage layer.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: i64,
    pub user_id: i64,
    pub lesson_id: i64,
    pub attempt_id: Option<i64>,
    pub score: i64,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'quiz_rate_limits' table. Window resets are lazy,
/// computed at check time (see quiz::rate_limit).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizRateLimit {
    pub user_id: i64,
    pub hourly_attempts: i64,
    pub daily_attempts: i64,
    pub hourly_reset_at: chrono::DateTime<chrono::Utc>,
    pub daily_reset_at: chrono::DateTime<chrono::Utc>,
    pub last_attempt_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl QuizRateLimit {
    pub fn new(user_id: i64, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            user_id,
            hourly_attempts: 0,
            daily_attempts: 0,
            hourly_reset_at: now,
            daily_reset_at: now,
            last_attempt_at: None,
        }
    }
}

/// Response for GET /quiz/{lesson_id}/status.
#[derive(Debug, Serialize)]
pub struct QuizStatusResponse {
    pub can_attempt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_remaining: Option<i64>,
    pub hourly_attempts_remaining: i64,
    pub daily_attempts_remaining: i64,
}

/// DTO for starting an attempt.
#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    pub lesson_id: i64,
}

/// Response for POST /quiz/start.
#[derive(Debug, Serialize)]
pub struct StartQuizResponse {
    pub attempt_id: i64,
    pub lesson_id: i64,
    pub questions: Vec<PublicQuestion>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub min_time_per_question: i64,
    pub cooldown_seconds: i64,
}

/// One submitted answer with its declared per-question time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected: String,
    pub time_spent_seconds: i64,
}

/// DTO for submitting an attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub attempt_id: i64,
    /// Optional cross-check against the attempt's lesson.
    pub lesson_id: Option<i64>,
    pub answers: Vec<SubmittedAnswer>,
    pub total_time_seconds: i64,
}

/// Response for POST /quiz/submit.
#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub score: i64,
    pub correct: i64,
    pub wrong: i64,
    pub tokens_awarded: i64,
    pub passed: bool,
    pub flagged_suspicious: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Joined row for the admin suspicious-attempts view.
#[derive(Debug, Serialize, FromRow)]
pub struct SuspiciousAttemptRow {
    pub attempt_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub lesson_id: i64,
    pub lesson_title: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub total_time_seconds: Option<i64>,
    pub score: Option<i64>,
    pub passed: bool,
}
