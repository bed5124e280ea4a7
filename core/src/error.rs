use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by [`crate::store::RecipeStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller-supplied data violates a field constraint.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The import payload is not an array of well-formed records.
    #[error("Invalid import data: {0}")]
    Format(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`StoreError`], used in import reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Format,
    Storage,
}

impl StoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Format(_) => ErrorKind::Format,
            StoreError::Database(_) | StoreError::Json(_) => ErrorKind::Storage,
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
