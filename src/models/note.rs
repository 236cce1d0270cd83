// src/models/note.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const NOTE_TYPES: [&str; 2] = ["text", "pdf"];

/// Represents the 'notes' table in the database.
/// Study material published by administrators, read-only for takers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,

    /// Note type: 'text' (inline body) or 'pdf' (stored document reference).
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub note_type: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a note.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(rename = "type")]
    #[validate(custom(function = validate_note_type))]
    pub note_type: String,
}

/// DTO for updating a note. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
}

pub fn validate_note_type(note_type: &str) -> Result<(), validator::ValidationError> {
    if !NOTE_TYPES.contains(&note_type) {
        return Err(validator::ValidationError::new("invalid_note_type"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_note_type() {
        let req = CreateNoteRequest {
            title: "Algebra basics".to_string(),
            content: "Some content".to_string(),
            note_type: "video".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn accepts_text_and_pdf() {
        for t in NOTE_TYPES {
            let req = CreateNoteRequest {
                title: "Algebra basics".to_string(),
                content: "Some content".to_string(),
                note_type: t.to_string(),
            };
            assert!(req.validate().is_ok());
        }
    }
}
