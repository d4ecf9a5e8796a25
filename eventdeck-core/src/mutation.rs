//! Lifecycle tracking for write operations.

use std::future::Future;

use tokio::sync::watch;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState<T> {
    Idle,
    Pending,
    Success(T),
    Error(ApiError),
}

impl<T> MutationState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationState::Pending)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            MutationState::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// A write operation's pending/success/error state.
///
/// `run` hands the result back to the caller, which decides what follows
/// (cache invalidation, navigation). Subscribers see every transition.
pub struct Mutation<T> {
    tx: watch::Sender<MutationState<T>>,
}

impl<T: Clone> Default for Mutation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Mutation<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(MutationState::Idle);
        Mutation { tx }
    }

    pub fn state(&self) -> MutationState<T> {
        self.tx.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.tx.borrow().is_pending()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<T>> {
        self.tx.subscribe()
    }

    /// Run the write, recording pending and then the outcome.
    ///
    /// Not cancellable once started: the caller should await it to completion.
    pub async fn run<F>(&self, write: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.tx.send_replace(MutationState::Pending);

        let result = write.await;
        let next = match &result {
            Ok(value) => MutationState::Success(value.clone()),
            Err(err) => MutationState::Error(err.clone()),
        };
        self.tx.send_replace(next);

        result
    }
}
