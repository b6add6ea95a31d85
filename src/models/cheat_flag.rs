// src/models/cheat_flag.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const SEVERITY_LOW: &str = "low";
pub const SEVERITY_MEDIUM: &str = "medium";
pub const SEVERITY_HIGH: &str = "high";

pub const ACTION_WARNING: &str = "warning";
pub const ACTION_TOKENS_REVOKED: &str = "tokens_revoked";
pub const ACTION_BANNED: &str = "banned";
pub const ACTION_FALSE_POSITIVE: &str = "false_positive";

pub const REVIEW_ACTIONS: [&str; 4] = [
    ACTION_WARNING,
    ACTION_TOKENS_REVOKED,
    ACTION_BANNED,
    ACTION_FALSE_POSITIVE,
];

/// Represents the 'cheat_flags' table. Created by detection logic, mutated
/// only by admin review, never auto-deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CheatFlag {
    pub id: i64,
    pub user_id: i64,
    pub lesson_id: Option<i64>,
    pub flag_type: String,
    pub severity: String,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
    pub reviewed: bool,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub action_taken: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for a new flag.
#[derive(Debug, Clone)]
pub struct NewCheatFlag {
    pub user_id: i64,
    pub lesson_id: Option<i64>,
    pub flag_type: String,
    pub severity: String,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
}

/// Joined row for the admin review queue, newest-first.
#[derive(Debug, Serialize, FromRow)]
pub struct CheatFlagRow {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub lesson_id: Option<i64>,
    pub lesson_title: Option<String>,
    pub flag_type: String,
    pub severity: String,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
    pub reviewed: bool,
    pub action_taken: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for reviewing a flag.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewFlagRequest {
    #[validate(custom(function = validate_action))]
    pub action: String,
}

fn validate_action(action: &str) -> Result<(), validator::ValidationError> {
    if !REVIEW_ACTIONS.contains(&action) {
        return Err(validator::ValidationError::new("unknown_review_action"));
    }
    Ok(())
}

/// Query parameters for listing flags.
#[derive(Debug, Deserialize)]
pub struct FlagListParams {
    pub unreviewed_only: Option<bool>,
}
