use std::future::Future;

use serde::Serialize;
use tokio::sync::watch;

use super::cache::{QueryClient, QueryState};
use super::key::QueryKey;
use crate::error::ApiError;

/// A live reader of one query key.
///
/// Dropping the observer unregisters it; if it was the last one, any
/// in-flight request for the key is cancelled and its result discarded.
pub struct QueryObserver {
    client: QueryClient,
    key: QueryKey,
    rx: watch::Receiver<QueryState>,
}

impl QueryObserver {
    pub(crate) fn new(client: QueryClient, key: QueryKey, rx: watch::Receiver<QueryState>) -> Self {
        QueryObserver { client, key, rx }
    }

    pub fn state(&self) -> QueryState {
        self.rx.borrow().clone()
    }

    /// Fetch if the entry has no result yet or was invalidated.
    ///
    /// Returns whether a request was started. If another observer already
    /// has one in flight, this observer shares its result.
    pub fn ensure<T, F>(&self, fetch: F) -> bool
    where
        T: Serialize + Send + 'static,
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        self.client.fetch(&self.key, false, fetch)
    }

    /// Fetch regardless of the cached state, unless a request is already in flight.
    pub fn refetch<T, F>(&self, fetch: F) -> bool
    where
        T: Serialize + Send + 'static,
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        self.client.fetch(&self.key, true, fetch)
    }

    /// Wait until no request is in flight for this key.
    pub async fn settled(&mut self) -> QueryState {
        let settled = self
            .rx
            .wait_for(|state| !state.is_fetching)
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }
}

impl Drop for QueryObserver {
    fn drop(&mut self) {
        self.client.release(&self.key);
    }
}
