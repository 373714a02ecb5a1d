//! API Error Types
//!
//! Errors surfaced by the study planner API client. Nothing here is retried
//! or masked; callers decide what the user sees.

use thiserror::Error;

/// Errors that can occur when talking to the study planner backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-2xx response
    #[error("{}", status_text(*status, message.as_deref()))]
    Status {
        status: u16,
        /// The server's `error` text, when it sent one
        message: Option<String>,
    },

    /// Connection, TLS or timeout failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 2xx response whose body didn't match the expected shape
    #[error("Failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },

    /// 2xx response that parsed but breaks a data invariant
    #[error("Malformed response from {path}: {message}")]
    Malformed { path: String, message: String },

    /// Configured base address is not a usable URL
    #[error("Invalid API address {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

fn status_text(status: u16, message: Option<&str>) -> String {
    match message {
        Some(message) => message.to_string(),
        None => format!("Request failed with status {}", status),
    }
}

impl ApiError {
    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The error text provided by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Missing, expired or invalid token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
