//! Error types for eventdeck.

use thiserror::Error;

/// A failed request against the event API.
///
/// Cached alongside query entries and mutation state, so it is `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Server responded with status {status}{}", message_suffix(.message))]
    Status { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl ApiError {
    /// The message the server put in its `{ "message": ... }` error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Errors that can occur in eventdeck operations.
#[derive(Error, Debug)]
pub enum EventsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid route: {0}")]
    Route(String),
}

/// Result type alias for eventdeck operations.
pub type EventsResult<T> = Result<T, EventsError>;
