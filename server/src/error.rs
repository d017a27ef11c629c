//! Structured error bodies for the HTTP API.
//!
//! DESIGN
//! ======
//! Service errors implement [`ErrorCode`]: a grepable code plus a retryable
//! flag. Handlers pick the HTTP status and call [`error_response`], so every
//! failing endpoint answers with the same `{code, message, retryable}` shape.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Body key for error messages.
pub const ERROR_MESSAGE: &str = "message";

/// Body key for grepable error codes.
pub const ERROR_CODE: &str = "code";

/// Body key for the retryable flag.
pub const ERROR_RETRYABLE: &str = "retryable";

/// Grepable error code and retryable flag for structured error bodies.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl ErrorBody {
    #[must_use]
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code().to_owned(), message: err.to_string(), retryable: err.retryable() }
    }
}

/// JSON error response with `status` and a body built from `err`.
pub fn error_response(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Response {
    (status, Json(ErrorBody::from_error(err))).into_response()
}
