//! Classification of HTTP failures into the admin error taxonomy.
//!
//! Transport failures (connect, timeout, body read) become
//! [`AdminError::Network`]; non-2xx responses become [`AdminError::Server`]
//! carrying the server's own `message` when the body provides one.

use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::AdminError;

/// Error produced by one failed API call.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if a response was received
    pub status: Option<StatusCode>,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build from a non-success response body.
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        });
        Self::with_status(status, message)
    }

    pub fn to_admin_error(&self) -> AdminError {
        match self.status {
            Some(status) if status == StatusCode::UNAUTHORIZED => AdminError::Server {
                status: status.as_u16(),
                message: format!("{} (session may have expired, log in again)", self.message),
            },
            Some(status) => AdminError::Server {
                status: status.as_u16(),
                message: self.message.clone(),
            },
            None => AdminError::Network(self.message.clone()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for AdminError {
    fn from(err: ApiError) -> Self {
        err.to_admin_error()
    }
}

/// Extract `message` (or `error`) from a JSON error body.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
