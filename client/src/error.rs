//! Client error taxonomy.
//!
//! DESIGN
//! ======
//! Every fallible operation in the crate returns [`ClientError`]. Front ends
//! never inspect transport details; they call [`ClientError::user_message`]
//! with a context-specific fallback and show the result as a notice.
//!
//! Unauthorized responses get their own variant because the session layer
//! treats them as a silent logout rather than a displayable failure.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

/// Errors produced by client operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Input rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    /// The remote API rejected the bearer token or the credentials (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote API returned a non-success status.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// A response body did not match the expected record.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A configuration value could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// The persisted token slot could not be read or written.
    #[error("token storage error: {0}")]
    Storage(String),
}

/// Grepable error code and retryable flag.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

impl ErrorCode for ClientError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Unauthorized(_) => "E_UNAUTHORIZED",
            Self::Server { .. } => "E_SERVER",
            Self::Network(_) => "E_NETWORK",
            Self::Malformed(_) => "E_MALFORMED",
            Self::Config(_) => "E_CONFIG",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server { status: 429 | 500..=599, .. })
    }
}

impl ClientError {
    /// `true` for HTTP 401 responses.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Text to show the user, falling back to `fallback` when the error carries
    /// nothing displayable (network failures, malformed bodies, empty details).
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        let message = match self {
            Self::Validation(m) | Self::Unauthorized(m) | Self::Config(m) => m.as_str(),
            Self::Server { message, .. } => message.as_str(),
            Self::Network(_) | Self::Malformed(_) | Self::Storage(_) => "",
        };
        if message.trim().is_empty() { fallback.to_owned() } else { message.to_owned() }
    }
}

/// Build the error for a non-success HTTP response.
#[must_use]
pub fn from_status(status: u16, body: &str) -> ClientError {
    let message = extract_detail(body).unwrap_or_default();
    if status == 401 {
        ClientError::Unauthorized(message)
    } else {
        ClientError::Server { status, message }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts the API's `{"detail": "..."}` and field-error list
/// `{"detail": [{"loc": [..., "pin"], "msg": "..."}]}` shapes, plus the
/// storage/auth service's `error_description`, `msg`, `message` and `error` keys.
#[must_use]
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    if let Some(detail) = object.get("detail") {
        match detail {
            Value::String(s) if !s.is_empty() => return Some(s.clone()),
            Value::Array(items) => {
                let joined = items.iter().filter_map(field_error).collect::<Vec<_>>().join(", ");
                if !joined.is_empty() {
                    return Some(joined);
                }
            }
            _ => {}
        }
    }

    ["error_description", "msg", "message", "error"]
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

fn field_error(item: &Value) -> Option<String> {
    let msg = item.get("msg").and_then(Value::as_str)?;
    let field = item
        .get("loc")
        .and_then(Value::as_array)
        .and_then(|loc| loc.last())
        .map(|last| match last {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    Some(match field {
        Some(field) => format!("{field}: {msg}"),
        None => msg.to_owned(),
    })
}
