// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::quiz::{FAIL_MESSAGE, PASS_MESSAGE},
    models::result::{QuizResult, ResultSummary, UserResultRow},
    utils::jwt::Claims,
};

fn result_payload(result: QuizResult) -> serde_json::Value {
    serde_json::json!({
        "resultId": result.id,
        "score": result.score,
        "totalQuestions": result.total_questions,
        "percentage": result.percentage,
        "passed": result.passed,
        "timeTaken": result.time_taken,
        "answers": result.answers,
        "createdAt": result.created_at,
        "message": if result.passed { PASS_MESSAGE } else { FAIL_MESSAGE },
    })
}

/// Returns the caller's most recent result.
pub async fn latest_result(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query_as::<_, QuizResult>(
        r#"
        SELECT id, user_id, answers, score, total_questions, percentage, passed, time_taken, created_at
        FROM results
        WHERE user_id = $1
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load latest result: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::NotFound("No results found.".to_string()))?;

    Ok(Json(result_payload(result)))
}

/// Returns all of the caller's results, newest first.
pub async fn result_history(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, ResultSummary>(
        r#"
        SELECT id, score, total_questions, percentage, passed, time_taken, created_at
        FROM results
        WHERE user_id = $1
        ORDER BY id DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load result history: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(results))
}

/// Returns one result in detail. Scoped to the caller: requesting another
/// user's result yields 404, not 403, so result IDs are not probeable.
pub async fn result_details(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query_as::<_, QuizResult>(
        r#"
        SELECT id, user_id, answers, score, total_questions, percentage, passed, time_taken, created_at
        FROM results
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load result details: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::NotFound("Result not found.".to_string()))?;

    Ok(Json(result_payload(result)))
}

/// Returns all results for a given user, joined with their name and email.
/// Reached only through the admin middleware.
pub async fn user_results(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, UserResultRow>(
        r#"
        SELECT r.id, r.user_id, u.name, u.email,
               r.score, r.total_questions, r.percentage, r.passed, r.time_taken, r.created_at
        FROM results r
        JOIN users u ON r.user_id = u.id
        WHERE r.user_id = $1
        ORDER BY r.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load user results: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(results))
}
