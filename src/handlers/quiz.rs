// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use rand::seq::SliceRandom;
use sqlx::{PgPool, Postgres};

use crate::{
    config::{HISTORICAL_QUOTA, LOGICAL_QUOTA, MATH_QUOTA, PASS_THRESHOLD, UNANSWERED},
    error::AppError,
    models::{
        question::{PublicQuestion, Question},
        result::SubmitQuizRequest,
    },
    utils::jwt::Claims,
};

pub const PASS_MESSAGE: &str = "Congratulations! You passed the test!";
pub const FAIL_MESSAGE: &str = "You did not pass the test this time. Keep studying!";

/// Helper struct for fetching answer keys from the database.
#[derive(sqlx::FromRow)]
struct AnswerKey {
    id: i64,
    correct: i32,
}

/// Draws up to `limit` random questions from one category.
/// Undersized pools return what exists rather than erroring.
async fn draw_category(
    pool: &PgPool,
    category: &str,
    limit: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, options, correct, category, created_at
        FROM questions
        WHERE category = $1
        ORDER BY RANDOM()
        LIMIT $2
        "#,
    )
    .bind(category)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Counts correct answers. `answers` is index-aligned with `keys`; a
/// position scores iff it is not the unanswered sentinel and matches the
/// stored correct index for that question.
fn calculate_score(answers: &[i32], keys: &[Option<i32>]) -> i32 {
    answers
        .iter()
        .zip(keys)
        .filter(|(ans, key)| **ans != UNANSWERED && Some(**ans) == **key)
        .count() as i32
}

/// Integer percentage, rounded half away from zero.
/// An empty paper scores 0 rather than dividing by zero.
fn percentage(score: i32, total: i32) -> i32 {
    if total == 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as i32
}

/// Assembles a random quiz paper.
///
/// Draws the fixed category quota (30 historical, 30 math, 40 logical)
/// concurrently, shuffles the combined paper so category order is not
/// observable, and strips the answer key before returning.
pub async fn generate_quiz(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let (historical, math, logical) = tokio::try_join!(
        draw_category(&pool, "historical", HISTORICAL_QUOTA),
        draw_category(&pool, "math", MATH_QUOTA),
        draw_category(&pool, "logical", LOGICAL_QUOTA),
    )
    .map_err(|e| {
        tracing::error!("Failed to load quiz questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let mut paper = Vec::with_capacity(historical.len() + math.len() + logical.len());
    paper.extend(historical);
    paper.extend(math);
    paper.extend(logical);

    paper.shuffle(&mut rand::thread_rng());

    let sanitized: Vec<PublicQuestion> = paper.into_iter().map(PublicQuestion::from).collect();

    Ok(Json(sanitized))
}

/// Scores a submitted quiz attempt and persists the result.
///
/// The answer key is always re-fetched from the database by question ID;
/// any `correct` values echoed back by the client are ignored, so a
/// tampered payload cannot inflate the score.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (answers, questions) = match (req.answers, req.questions) {
        (Some(a), Some(q)) => (a, q),
        _ => {
            return Err(AppError::BadRequest(
                "Missing answers or questions data.".to_string(),
            ));
        }
    };

    if answers.len() != questions.len() {
        return Err(AppError::BadRequest(
            "Answers and questions must be the same length.".to_string(),
        ));
    }

    let total_questions = questions.len() as i32;

    // Fetch the authoritative keys for the submitted question IDs.
    let key_map: HashMap<i64, i32> = if questions.is_empty() {
        HashMap::new()
    } else {
        let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
            "SELECT id, correct FROM questions WHERE id IN (",
        );

        let mut separated = query_builder.separated(",");
        for q in &questions {
            separated.push_bind(q.id);
        }
        separated.push_unseparated(")");

        let db_keys: Vec<AnswerKey> = query_builder
            .build_query_as()
            .fetch_all(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch answer keys: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

        db_keys.into_iter().map(|k| (k.id, k.correct)).collect()
    };

    let keys: Vec<Option<i32>> = questions
        .iter()
        .map(|q| key_map.get(&q.id).copied())
        .collect();

    let score = calculate_score(&answers, &keys);
    let pct = percentage(score, total_questions);
    let passed = pct >= PASS_THRESHOLD;
    let time_taken = req.time_taken.unwrap_or(0);
    let user_id = claims.user_id();

    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO results (user_id, answers, score, total_questions, percentage, passed, time_taken)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(serde_json::to_value(&answers)?)
    .bind(score)
    .bind(total_questions)
    .bind(pct)
    .bind(passed)
    .bind(time_taken)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to save quiz result: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(serde_json::json!({
        "resultId": row.0,
        "score": score,
        "totalQuestions": total_questions,
        "percentage": pct,
        "passed": passed,
        "timeTaken": time_taken,
        "message": if passed { PASS_MESSAGE } else { FAIL_MESSAGE },
        "answers": answers,
        "questions": questions,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_counts_matching_answers() {
        let answers = vec![2, 0, 1];
        let keys = vec![Some(2), Some(1), Some(1)];
        assert_eq!(calculate_score(&answers, &keys), 2);
    }

    #[test]
    fn unanswered_sentinel_never_scores() {
        // -1 must not score even if a question's key were somehow -1.
        let answers = vec![UNANSWERED, UNANSWERED];
        let keys = vec![Some(0), Some(-1)];
        assert_eq!(calculate_score(&answers, &keys), 0);
    }

    #[test]
    fn unknown_question_id_scores_nothing() {
        let answers = vec![0, 1];
        let keys = vec![None, Some(1)];
        assert_eq!(calculate_score(&answers, &keys), 1);
    }

    #[test]
    fn percentage_bounds() {
        assert_eq!(percentage(0, 100), 0);
        assert_eq!(percentage(100, 100), 100);
        assert_eq!(percentage(1, 1), 100);
    }

    #[test]
    fn percentage_rounds_half_away_from_zero() {
        // 1/3 = 33.33 -> 33, 2/3 = 66.67 -> 67, 1/8 = 12.5 -> 13
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
    }

    #[test]
    fn percentage_zero_total_is_zero() {
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn pass_boundary_at_seventy() {
        assert!(percentage(7, 10) >= PASS_THRESHOLD);
        assert!(percentage(69, 100) < PASS_THRESHOLD);
        assert!(percentage(70, 100) >= PASS_THRESHOLD);
    }

    #[test]
    fn single_question_scenarios() {
        // One math question with correct = 2.
        let keys = vec![Some(2)];

        let score = calculate_score(&[2], &keys);
        assert_eq!(score, 1);
        assert_eq!(percentage(score, 1), 100);

        let score = calculate_score(&[1], &keys);
        assert_eq!(score, 0);
        assert_eq!(percentage(score, 1), 0);

        let score = calculate_score(&[UNANSWERED], &keys);
        assert_eq!(score, 0);
        assert_eq!(percentage(score, 1), 0);
    }
}
