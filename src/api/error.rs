//! API error responses
//!
//! Maps workspace errors onto HTTP status codes with a JSON body:
//! `{"success": false, "error": "...", "code": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;

/// Error body returned by every API handler
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}

/// Handler error carrying its HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            code,
        }
    }
}

impl From<studio_tools::Error> for ApiError {
    fn from(err: studio_tools::Error) -> Self {
        use studio_tools::Error;

        match err {
            Error::PathEscape(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Path escapes workspace root", "PATH_ESCAPE")
            }
            Error::InvalidInput(msg) => Self::new(StatusCode::BAD_REQUEST, msg, "INVALID_INPUT"),
            Error::EmptyCommand => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string(), "EMPTY_COMMAND")
            }
            Error::CommandNotAllowed(_) => {
                Self::new(StatusCode::FORBIDDEN, err.to_string(), "COMMAND_NOT_ALLOWED")
            }
            Error::NotFound(path) => Self::new(
                StatusCode::NOT_FOUND,
                format!("Path not found: {}", path),
                "NOT_FOUND",
            ),
            Error::Conflict(path) => Self::new(
                StatusCode::CONFLICT,
                format!("Path already exists: {}", path),
                "CONFLICT",
            ),
            Error::TooLarge { .. } => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string(), "TOO_LARGE")
            }
            Error::NotText(_) => Self::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Not a text file",
                "NOT_TEXT",
            ),
            Error::AdapterUnavailable(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string(), "ADAPTER_UNAVAILABLE")
            }
            Error::Io(e) => {
                error!(error = %e, "Filesystem error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error", "IO_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}
