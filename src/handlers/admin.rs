// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        note::{CreateNoteRequest, Note, UpdateNoteRequest, validate_note_type},
        question::{
            BulkQuestionRow, CATEGORIES, CreateQuestionRequest, Question,
        },
        user::{ROLES, User},
    },
    utils::{hash::hash_password, html::clean_html},
};

// ---- Users ----

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// DTO for Admin creating a user (role is mandatory).
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name length must be between 1 and 100 characters."
    ))]
    pub name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    pub role: String, // 'user' or 'admin'
}

/// Creates a new user with a specific role.
/// Admin only.
pub async fn create_user(
    State(pool): State<PgPool>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if !ROLES.contains(&payload.role.as_str()) {
        return Err(AppError::BadRequest(
            "Invalid role: must be \"admin\" or \"user\"".to_string(),
        ));
    }

    let hashed_password = hash_password(&payload.password)?;

    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, password, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(&payload.role)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict(format!("Email '{}' already exists", payload.email))
        } else {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "User created", "id": row.0 })),
    ))
}

/// Deletes a user by ID.
/// Admin only. Admin accounts are never deletable through this endpoint,
/// which also protects the bootstrap admin.
pub async fn delete_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let target: Option<(String,)> = sqlx::query_as("SELECT role FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let (role,) = target.ok_or(AppError::NotFound("User not found".to_string()))?;

    if role == "admin" {
        return Err(AppError::Forbidden("Cannot delete admin users".to_string()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---- Questions ----

/// Lists all questions grouped by category.
/// Admin only (includes the answer key).
pub async fn list_questions(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, options, correct, category, created_at
        FROM questions
        ORDER BY category, id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

/// Creates a new quiz question.
/// Admin only.
pub async fn create_question(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let options_json = serde_json::to_value(&payload.options).unwrap_or_default();

    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO questions (question, options, correct, category)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&payload.question)
    .bind(options_json)
    .bind(payload.correct)
    .bind(&payload.category)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Question added", "id": row.0 })),
    ))
}

/// Replaces a question by ID. All fields are required, matching the
/// admin panel's edit form.
pub async fn update_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let options_json = serde_json::to_value(&payload.options).unwrap_or_default();

    let result = sqlx::query(
        r#"
        UPDATE questions
        SET question = $1, options = $2, correct = $3, category = $4
        WHERE id = $5
        "#,
    )
    .bind(&payload.question)
    .bind(options_json)
    .bind(payload.correct)
    .bind(&payload.category)
    .bind(id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a quiz question by ID.
/// Admin only.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Payload for bulk question upload.
#[derive(Debug, Deserialize)]
pub struct BulkUploadRequest {
    pub questions: Vec<BulkQuestionRow>,
}

/// Validates one bulk row, returning the insertable tuple or a
/// human-readable reason.
fn validate_bulk_row(row: &BulkQuestionRow) -> Result<(String, Vec<String>, i32, String), String> {
    let (question, a, b, c, d, correct, category) = match (
        &row.question,
        &row.option_a,
        &row.option_b,
        &row.option_c,
        &row.option_d,
        row.correct,
        &row.category,
    ) {
        (Some(q), Some(a), Some(b), Some(c), Some(d), Some(correct), Some(cat))
            if !q.is_empty()
                && !a.is_empty()
                && !b.is_empty()
                && !c.is_empty()
                && !d.is_empty() =>
        {
            (q, a, b, c, d, correct, cat)
        }
        _ => return Err("Missing required fields".to_string()),
    };

    if !CATEGORIES.contains(&category.as_str()) {
        return Err(format!("Invalid category '{}'", category));
    }

    if !(0..=3).contains(&correct) {
        return Err(format!(
            "Invalid correct answer '{}' (must be 0, 1, 2, or 3)",
            correct
        ));
    }

    let options = vec![a.clone(), b.clone(), c.clone(), d.clone()];
    Ok((question.clone(), options, correct, category.clone()))
}

/// Bulk-uploads questions. Rows are validated and inserted independently;
/// a failing row is reported but never aborts the rest of the batch.
pub async fn bulk_upload_questions(
    State(pool): State<PgPool>,
    Json(payload): Json<BulkUploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut success_count = 0;
    let mut error_count = 0;
    let mut errors: Vec<String> = Vec::new();

    for (index, row) in payload.questions.iter().enumerate() {
        let (question, options, correct, category) = match validate_bulk_row(row) {
            Ok(parts) => parts,
            Err(reason) => {
                errors.push(format!("Row {}: {}", index + 1, reason));
                error_count += 1;
                continue;
            }
        };

        let options_json = serde_json::to_value(&options).unwrap_or_default();

        let inserted = sqlx::query(
            r#"
            INSERT INTO questions (question, options, correct, category)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&question)
        .bind(options_json)
        .bind(correct)
        .bind(&category)
        .execute(&pool)
        .await;

        match inserted {
            Ok(_) => success_count += 1,
            Err(e) => {
                tracing::error!("Bulk upload row {} failed: {:?}", index + 1, e);
                errors.push(format!("Row {}: Database error", index + 1));
                error_count += 1;
            }
        }
    }

    Ok(Json(serde_json::json!({
        "message": format!(
            "Bulk upload completed. {} questions added, {} errors.",
            success_count, error_count
        ),
        "successCount": success_count,
        "errorCount": error_count,
        "errors": errors,
    })))
}

// ---- Notes ----

/// Lists all notes, newest first.
/// Admin only (same data as the taker-facing listing).
pub async fn list_notes(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let notes = sqlx::query_as::<_, Note>(
        r#"
        SELECT id, title, content, type, created_at
        FROM notes
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list notes: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(notes))
}

/// Creates a new note. Content is HTML-sanitized before storage since
/// notes are rendered to every authenticated user.
pub async fn create_note(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let content = clean_html(&payload.content);

    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO notes (title, content, type)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&payload.title)
    .bind(&content)
    .bind(&payload.note_type)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create note: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Note added", "id": row.0 })),
    ))
}

/// Updates a note by ID. Fields are optional.
pub async fn update_note(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Check existence
    let _exists: (i64,) = sqlx::query_as("SELECT id FROM notes WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Note not found".to_string()))?;

    if payload.title.is_none() && payload.content.is_none() && payload.note_type.is_none() {
        return Ok(StatusCode::OK);
    }

    if let Some(note_type) = &payload.note_type {
        if validate_note_type(note_type).is_err() {
            return Err(AppError::BadRequest("Invalid note type".to_string()));
        }
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE notes SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
    }

    if let Some(content) = payload.content {
        separated.push("content = ");
        separated.push_bind_unseparated(clean_html(&content));
    }

    if let Some(note_type) = payload.note_type {
        separated.push("type = ");
        separated.push_bind_unseparated(note_type);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update note: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Note not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a note by ID.
/// Admin only.
pub async fn delete_note(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete note: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Note not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---- Stats ----

#[derive(Debug, sqlx::FromRow, serde::Serialize)]
struct CategoryCount {
    category: String,
    count: i64,
}

/// Platform statistics for the admin dashboard: totals plus the question
/// pool size per category.
pub async fn stats(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let (total_users, total_questions, total_attempts) = tokio::try_join!(
        count(&pool, "SELECT COUNT(*) FROM users"),
        count(&pool, "SELECT COUNT(*) FROM questions"),
        count(&pool, "SELECT COUNT(*) FROM results"),
    )
    .map_err(|e| {
        tracing::error!("Failed to collect stats: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let by_category = sqlx::query_as::<_, CategoryCount>(
        "SELECT category, COUNT(*) as count FROM questions GROUP BY category",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to collect category stats: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(serde_json::json!({
        "totalUsers": total_users,
        "totalQuestions": total_questions,
        "totalAttempts": total_attempts,
        "questionsByCategory": by_category,
    })))
}

async fn count(pool: &PgPool, sql: &str) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(sql).fetch_one(pool).await?;
    Ok(row.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> BulkQuestionRow {
        BulkQuestionRow {
            question: Some("What is 2 + 2?".to_string()),
            option_a: Some("2".to_string()),
            option_b: Some("3".to_string()),
            option_c: Some("4".to_string()),
            option_d: Some("5".to_string()),
            correct: Some(2),
            category: Some("math".to_string()),
        }
    }

    #[test]
    fn bulk_row_valid() {
        let (question, options, correct, category) = validate_bulk_row(&full_row()).unwrap();
        assert_eq!(question, "What is 2 + 2?");
        assert_eq!(options.len(), 4);
        assert_eq!(correct, 2);
        assert_eq!(category, "math");
    }

    #[test]
    fn bulk_row_missing_option() {
        let mut row = full_row();
        row.option_c = None;
        assert_eq!(validate_bulk_row(&row).unwrap_err(), "Missing required fields");
    }

    #[test]
    fn bulk_row_bad_category() {
        let mut row = full_row();
        row.category = Some("geography".to_string());
        assert!(validate_bulk_row(&row).unwrap_err().contains("Invalid category"));
    }

    #[test]
    fn bulk_row_bad_correct_index() {
        let mut row = full_row();
        row.correct = Some(7);
        assert!(validate_bulk_row(&row).unwrap_err().contains("Invalid correct answer"));
    }
}
