//! Transient toast notifications raised by the controllers.

use serde::Serialize;

use shopno_client::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Toast for a failed remote call: server message or a fallback.
    ///
    /// Validation failures are warnings since the form shows the details.
    pub fn from_api_error(err: &ApiError) -> Self {
        match err {
            ApiError::Validation { .. } => Self::warning(err.user_message()),
            _ => Self::error(err.user_message()),
        }
    }
}
