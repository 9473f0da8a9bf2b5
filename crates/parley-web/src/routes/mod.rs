//! Route handlers.

pub mod agents;
pub mod internal;
pub mod rooms;

use axum::http::StatusCode;
use parley_core::ParleyError;

/// Map a domain error onto an HTTP status and message.
pub fn api_error(err: ParleyError) -> (StatusCode, String) {
    let status = match &err {
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        ParleyError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ParleyError::AlreadyRunning(_) | ParleyError::InvalidStatusTransition { .. } => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "Request failed");
    }
    (status, err.to_string())
}
