//! Error types for RecipeBox.

use thiserror::Error;

/// Common error type for RecipeBox.
#[derive(Error, Debug)]
pub enum RecipeBoxError {
    /// Missing, malformed, forged or expired session, or bad credentials.
    ///
    /// Deliberately carries no detail: callers must not learn which part
    /// of the credential was wrong.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated identity lacks the role or ownership for the action.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Originating address exceeded the failed-login threshold.
    #[error("address blocked due to too many failed login attempts")]
    Blocked,

    /// Unique value already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Password hashing failure (not a verification mismatch).
    #[error("password hashing error: {0}")]
    Password(String),

    /// Session token could not be produced.
    #[error("token error: {0}")]
    Token(String),

    /// Image storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for RecipeBoxError {
    fn from(e: sqlx::Error) -> Self {
        RecipeBoxError::Database(e.to_string())
    }
}

/// Result type alias for RecipeBox operations.
pub type Result<T> = std::result::Result<T, RecipeBoxError>;
