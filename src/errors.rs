use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors produced while talking to the newsletter backend.
///
/// Transport failures, non-success statuses and malformed bodies all end up
/// here so views can turn them into a displayable message. `Validation`
/// never involves the network.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Detail text supplied by the backend in a JSON error body, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { body: Some(body), .. } => body_detail(body),
            _ => None,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// Backend-provided detail wins, validation text is shown as-is and
    /// everything else collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            other => other
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

/// First string among the `detail`, `error` and `message` keys of a JSON
/// error body.
pub(crate) fn body_detail(body: &Value) -> Option<&str> {
    ["detail", "error", "message"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Failed to open browser: {0}")]
    Browser(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
