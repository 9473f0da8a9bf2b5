//! Centralized error types for Parley.

use parley_db::DbError;
use thiserror::Error;

use crate::generation::GenerationError;

/// Main error type for Parley operations.
#[derive(Error, Debug)]
pub enum ParleyError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Discussion already in progress in room {0}")]
    AlreadyRunning(String),

    #[error("Invalid status transition: cannot move from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for Parley operations.
pub type ParleyResult<T> = Result<T, ParleyError>;

impl ParleyError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AgentNotFound(_) | Self::RoomNotFound(_) | Self::Database(DbError::NotFound(_))
        )
    }

    /// Turn a store lookup miss into the entity-specific not-found error.
    pub(crate) fn lookup(err: DbError, not_found: impl FnOnce() -> Self) -> Self {
        match err {
            DbError::NotFound(_) => not_found(),
            other => Self::Database(other),
        }
    }
}
