//! Failures a wizard step can end with. Answers the donor got wrong are not
//! errors here: they come back as a `ValidationList` on the rendered page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong, in terms the HTTP layer maps onto a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No session, or the session has expired.
    Unauthorized,
    /// The LPA belongs to another session.
    Forbidden,
    NotFound,
    /// The request itself is malformed, such as a tampered warning link.
    Validation,
    /// Someone else saved the LPA since it was loaded.
    Conflict,
    Internal,
}

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

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }
}
