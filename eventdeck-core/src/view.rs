//! View states derived from cached query state.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::query::{QueryState, QueryStatus};

/// Title and message of an inline error block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBlock {
    pub title: String,
    pub message: String,
}

impl ErrorBlock {
    /// Use the server's message when it sent one, otherwise `fallback`.
    pub fn from_error(title: &str, error: Option<&ApiError>, fallback: &str) -> Self {
        let message = error
            .and_then(ApiError::server_message)
            .unwrap_or(fallback);
        ErrorBlock {
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

/// Texts shown when a read fails.
#[derive(Debug, Clone, Copy)]
pub struct FailureText {
    pub title: &'static str,
    pub fallback: &'static str,
}

/// What a read-driven screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryView<T> {
    Loading,
    Failed(ErrorBlock),
    Loaded(T),
}

/// Map a query state to the view to render.
///
/// Pending wins over error, error wins over data. A re-fetch after an
/// error keeps the error status until it resolves, so the error block
/// stays visible during the retry.
pub fn resolve<T: DeserializeOwned>(state: &QueryState, failure: FailureText) -> QueryView<T> {
    match state.status {
        QueryStatus::Pending => QueryView::Loading,
        QueryStatus::Error => QueryView::Failed(ErrorBlock::from_error(
            failure.title,
            state.error.as_ref(),
            failure.fallback,
        )),
        QueryStatus::Success => match state.data_as::<T>() {
            Some(data) => QueryView::Loaded(data),
            None => QueryView::Failed(ErrorBlock::from_error(failure.title, None, failure.fallback)),
        },
    }
}
