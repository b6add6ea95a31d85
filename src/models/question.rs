// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'quiz_questions' table in the database.
/// The active questions of a lesson form the pool each attempt samples from.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,

    pub lesson_id: i64,

    /// The text content of the question.
    pub question: String,

    /// List of options (e.g., ["Option A", "Option B"]).
    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// The correct option letter (e.g., "A").
    pub correct_option: String,

    pub active: bool,
}

/// DTO for sending a question to the client.
/// Never carries `correct_option`.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question: String,
    pub options: Json<Vec<String>>,
}

impl From<QuizQuestion> for PublicQuestion {
    fn from(q: QuizQuestion) -> Self {
        PublicQuestion {
            id: q.id,
            question: q.question,
            options: q.options,
        }
    }
}

/// DTO for one uploaded question.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct QuestionUpload {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 10))]
    pub correct_option: String,
}

/// DTO for replacing a lesson's question pool.
#[derive(Debug, Deserialize, Validate)]
pub struct QuizUploadRequest {
    #[validate(nested, length(min = 1, max = 200))]
    pub questions: Vec<QuestionUpload>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("too_few_options"));
    }
    for opt in options {
        if opt.is_empty() || opt.len() > 500 {
            return Err(validator::ValidationError::new("option_length"));
        }
    }
    Ok(())
}
