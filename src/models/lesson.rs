// src/models/lesson.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

/// Represents the 'lessons' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,

    /// Lesson category (e.g., "JAMB", "WAEC").
    pub category: String,

    pub title: String,

    /// Lesson body. Sanitized HTML, cleaned on creation.
    pub content: String,

    pub video_url: Option<String>,

    /// Position within the category listing.
    pub order_index: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a new lesson.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100000))]
    pub content: String,
    #[validate(custom(function = validate_optional_url))]
    pub video_url: Option<String>,
    pub order_index: Option<i64>,
}

fn validate_optional_url(url: &str) -> Result<(), validator::ValidationError> {
    if url.len() > 500 || Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// Aggregated row for the category overview.
#[derive(Debug, Serialize, FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Represents the 'lesson_progress' table.
/// `read_seconds` accumulates client heartbeats and feeds the
/// minimum-read-time check at attempt start.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LessonProgress {
    pub id: i64,
    pub user_id: i64,
    pub lesson_id: i64,
    pub completed: bool,
    pub read_seconds: i64,
}

/// DTO for the read-time heartbeat.
#[derive(Debug, Deserialize, Validate)]
pub struct ReadTimeRequest {
    /// Seconds read since the previous heartbeat. Capped to keep a single
    /// request from fabricating hours of reading.
    #[validate(range(min = 1, max = 300))]
    pub seconds: i64,
}
