//! Transient user-facing notices (the toast line a front end shows after an
//! action).

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

use std::fmt;

use crate::error::ClientError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    /// Error notice carrying the server's message, or `fallback`.
    #[must_use]
    pub fn from_error(err: &ClientError, fallback: &str) -> Self {
        Self::Error(err.user_message(fallback))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Error(m) => m,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
