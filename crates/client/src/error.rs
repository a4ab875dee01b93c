//! Errors returned by the receiving API client.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the receiving API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A successful response did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The bearer token was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The order or package does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected the request.
    #[error("{message} (HTTP {status})")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error payload.
        message: String,
    },

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Build the error for a non-success response.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = extract_message(status, body);
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized(message)
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Remote {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Text suitable for showing to the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote { message, .. } | Self::NotFound(message) => message.clone(),
            Self::Unauthorized(message) => format!("Not authorised: {message}"),
            Self::Http(e) if e.is_timeout() => "The server did not respond in time".to_string(),
            Self::Http(_) => "Could not reach the server".to_string(),
            Self::Parse(_) => "The server sent an unexpected response".to_string(),
            Self::InvalidUrl(message) => format!("Invalid server address: {message}"),
        }
    }
}

/// Pull a human-readable message out of an error payload.
///
/// Looks at `message`, `error`, `detail`, then the first entry of `errors`
/// (string or object with `message`). Falls back to the raw body, then to
/// the status line.
#[must_use]
pub fn extract_message(status: reqwest::StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| message_from_value(&value));

    from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status.canonical_reason().map_or_else(
                || format!("HTTP {}", status.as_u16()),
                |reason| format!("HTTP {} {reason}", status.as_u16()),
            )
        })
}

fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Object(map) => ["message", "error", "detail"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(message_from_value)
            .or_else(|| {
                map.get("errors")
                    .and_then(Value::as_array)
                    .and_then(|errors| errors.first())
                    .and_then(message_from_value)
            }),
        _ => None,
    }
}
