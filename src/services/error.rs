use thiserror::Error;

use crate::database::DatabaseError;
use crate::filter::FilterError;

/// Outcomes of note, tag and account operations
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Storage(DatabaseError),
}

impl NoteError {
    pub fn invalid(message: impl Into<String>) -> Self {
        NoteError::InvalidArgument(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        NoteError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        NoteError::NotFound(message.into())
    }
}

impl From<FilterError> for NoteError {
    fn from(err: FilterError) -> Self {
        NoteError::InvalidArgument(err.to_string())
    }
}

impl From<DatabaseError> for NoteError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(msg) => NoteError::Conflict(msg),
            other => NoteError::Storage(other),
        }
    }
}
