// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// The fixed category set every question belongs to.
pub const CATEGORIES: [&str; 3] = ["historical", "math", "logical"];

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// The text content of the question.
    pub question: String,

    /// Exactly four options, stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// Zero-based index of the correct option (0-3).
    pub correct: i32,

    /// Category: 'historical', 'math' or 'logical'.
    pub category: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending a question to a quiz taker (excludes the answer key).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question: String,
    pub options: Json<Vec<String>>,
    pub category: String,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            question: q.question,
            options: q.options,
            category: q.category,
        }
    }
}

/// DTO for creating or replacing a question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(range(min = 0, max = 3, message = "Correct answer must be 0, 1, 2 or 3."))]
    pub correct: i32,
    #[validate(custom(function = validate_category))]
    pub category: String,
}

/// One row of a bulk upload. Option fields mirror the upload sheet columns.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkQuestionRow {
    pub question: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub correct: Option<i32>,
    pub category: Option<String>,
}

pub fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() != OPTION_COUNT {
        return Err(validator::ValidationError::new("exactly_four_options_required"));
    }
    for opt in options {
        if opt.is_empty() || opt.len() > 500 {
            return Err(validator::ValidationError::new("option_length_invalid"));
        }
    }
    Ok(())
}

pub fn validate_category(category: &str) -> Result<(), validator::ValidationError> {
    if !CATEGORIES.contains(&category) {
        return Err(validator::ValidationError::new("invalid_category"));
    }
    Ok(())
}
