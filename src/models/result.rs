// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Represents the 'results' table in the database.
/// One immutable row per scored quiz submission.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: i64,
    pub user_id: i64,

    /// The submitted answer sequence, one zero-based option index per
    /// question; -1 marks a question left blank.
    pub answers: Json<Vec<i32>>,

    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,

    /// Elapsed time in seconds, as reported by the client (0 if absent).
    pub time_taken: i32,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Summary row for the caller's result history (answers omitted).
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
    pub time_taken: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Admin view of a result, joined with the owning user.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserResultRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
    pub time_taken: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A question as echoed back by the client on submission.
/// Only the id is trusted; the answer key is re-read from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedQuestion {
    pub id: i64,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    /// One entry per question, index-aligned with `questions`; -1 = blank.
    pub answers: Option<Vec<i32>>,

    /// The question sequence the taker received, in the order it was shown.
    pub questions: Option<Vec<SubmittedQuestion>>,

    /// Elapsed seconds measured client-side.
    pub time_taken: Option<i32>,
}
