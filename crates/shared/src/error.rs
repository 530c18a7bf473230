use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when a soft failure arrives without one from the server.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request went through but the envelope said `success: false`.
    Rejected,
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Validation,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::Internal,
            _ => Self::Rejected,
        }
    }
}

/// A logical failure reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Builds the error for a non-success envelope, falling back to the generic
    /// message when the server did not send a usable one.
    pub fn soft_failure(status: Option<u16>, message: Option<&str>) -> Self {
        let code = status.map(ErrorCode::from_status).unwrap_or(ErrorCode::Rejected);
        let message = message
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE);
        Self::new(code, message)
    }
}
