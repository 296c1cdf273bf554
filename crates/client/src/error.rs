//! API error taxonomy.

use serde::Deserialize;
use thiserror::Error;

use shopno_core::FieldErrors;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message shown when the server gives none.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// 422: the server rejected one or more fields.
    #[error("validation failed: {message}")]
    Validation { message: String, errors: FieldErrors },

    /// 401: the session token was rejected and has been dropped.
    #[error("unauthenticated; sign in again at {login_route}")]
    Unauthorized { login_route: String },

    /// 403.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// A request body could not be built.
    #[error("encode error: {0}")]
    Encode(String),
}

impl ApiError {
    /// Message suitable for a toast notification.
    pub fn user_message(&self) -> String {
        let server_message = match self {
            ApiError::Validation { message, .. }
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Server { message, .. } => message.as_str(),
            ApiError::Unauthorized { .. } => "Your session has expired. Please sign in again.",
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::Encode(_) => "",
        };

        if server_message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            server_message.to_string()
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Build an error from a non-success status and its (possibly empty) body.
    pub(crate) fn from_status(status: u16, body: &str, login_route: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed.message.or(parsed.error).unwrap_or_default();

        match status {
            401 => ApiError::Unauthorized {
                login_route: login_route.to_string(),
            },
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            422 => ApiError::Validation {
                message,
                errors: parsed.errors.unwrap_or_default(),
            },
            _ => ApiError::Server { status, message },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::Encode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Error body shape: `{ "message": "...", "errors": { "field": ["..."] } }`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    errors: Option<FieldErrors>,
}
