// src/handlers/notes.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{error::AppError, models::note::Note};

/// Lists all notes, newest first. Read-only for quiz takers.
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
        tracing::error!("Failed to load notes: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(notes))
}

/// Retrieves a single note by ID.
pub async fn get_note(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let note = sqlx::query_as::<_, Note>(
        r#"
        SELECT id, title, content, type, created_at
        FROM notes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Note not found.".to_string()))?;

    Ok(Json(note))
}
