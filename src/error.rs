//! Core error type shared by the data accessor, auth, and action engine.
//!
//! One enum rather than one per module, because every operation in this
//! service ultimately bubbles up through the same dispatch path.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Unified "does not exist" / "exists but foreign to caller" error.
    /// The two are deliberately indistinguishable.
    #[error("object not found{}{}", object_type.as_ref().map(|t| format!(": {t}")).unwrap_or_default(), object_id.as_ref().map(|i| format!(" ({i})")).unwrap_or_default())]
    ObjectNotFound {
        object_type: Option<String>,
        object_id: Option<String>,
        message: Option<String>,
    },

    #[error("a user with email {0} already exists")]
    DuplicateUserEmail(String),

    #[error("action {action_id} is already in thread {thread_id}")]
    ActionAlreadyInThread { thread_id: i64, action_id: i64 },

    #[error("no registered handler accepts this request")]
    NoHandler,

    #[error("token failed signature or claim verification")]
    InvalidToken,

    #[error("password does not match")]
    WrongPassword,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    pub fn not_found(object_type: impl Into<String>) -> Self {
        CoreError::ObjectNotFound {
            object_type: Some(object_type.into()),
            object_id: None,
            message: None,
        }
    }

    pub fn not_found_id(object_type: impl Into<String>, object_id: impl std::fmt::Display) -> Self {
        CoreError::ObjectNotFound {
            object_type: Some(object_type.into()),
            object_id: Some(object_id.to_string()),
            message: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::ObjectNotFound { .. })
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
