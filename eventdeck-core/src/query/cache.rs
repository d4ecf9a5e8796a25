//! Process-wide query cache.
//!
//! Every cached request lives in an [`Entry`] keyed by [`QueryKey`]. Readers
//! register as observers and are notified of state changes through a
//! `watch` channel owned by the entry, so all observers of a key share one
//! in-flight request and one result. The cache owns the spawned fetch task
//! and aborts it once nobody observes the key anymore.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use super::key::QueryKey;
use super::observer::QueryObserver;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No result yet
    Pending,
    Success,
    Error,
}

/// Snapshot of one cache entry as seen by its observers.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub status: QueryStatus,
    /// Last successful payload. Kept when a later fetch fails.
    pub data: Option<Value>,
    pub error: Option<ApiError>,
    pub data_updated_at: Option<DateTime<Utc>>,
    pub error_updated_at: Option<DateTime<Utc>>,
    /// A request for this key is in flight.
    pub is_fetching: bool,
    /// Invalidated since the last result; the next read re-fetches.
    pub is_stale: bool,
}

impl Default for QueryState {
    fn default() -> Self {
        QueryState {
            status: QueryStatus::Pending,
            data: None,
            error: None,
            data_updated_at: None,
            error_updated_at: None,
            is_fetching: false,
            is_stale: false,
        }
    }
}

impl QueryState {
    pub fn is_pending(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Deserialize the cached payload.
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        let data = self.data.clone()?;
        serde_json::from_value(data).ok()
    }

    /// Errored entries stay as they are while observed; see [`QueryClient::observe`].
    fn needs_fetch(&self) -> bool {
        !self.is_fetching && (self.is_stale || self.is_pending())
    }
}

struct Entry {
    tx: watch::Sender<QueryState>,
    observers: usize,
    fetch: Option<AbortHandle>,
    /// Generation of the fetch that owns this entry. Results from any other generation are dropped.
    generation: u64,
    invalidated_during_fetch: bool,
    unobserved_since: Option<Instant>,
}

impl Entry {
    fn new() -> Self {
        let (tx, _) = watch::channel(QueryState::default());
        Entry {
            tx,
            observers: 0,
            fetch: None,
            generation: 0,
            invalidated_during_fetch: false,
            unobserved_since: None,
        }
    }
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    gc_time: Duration,
    /// Shared by all entries so a removed and re-created entry never reuses a generation.
    generations: AtomicU64,
}

impl Inner {
    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Shared handle to the query cache. Clones refer to the same store.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryClient {
    /// Cache that drops an entry as soon as its last observer goes away.
    pub fn new() -> Self {
        Self::with_gc_time(Duration::ZERO)
    }

    /// Cache that keeps unobserved entries for `gc_time` before collecting them.
    pub fn with_gc_time(gc_time: Duration) -> Self {
        QueryClient {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                gc_time,
                generations: AtomicU64::new(0),
            }),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a reader of `key`, creating the entry if needed.
    ///
    /// A retained entry that last failed is marked stale when it gains its
    /// first observer again, so the new reader re-fetches it.
    pub fn observe(&self, key: QueryKey) -> QueryObserver {
        let mut entries = self.entries();
        collect_garbage(&mut entries, self.inner.gc_time);

        let entry = entries.entry(key.clone()).or_insert_with(|| {
            tracing::debug!(%key, "creating cache entry");
            Entry::new()
        });
        if entry.observers == 0 && entry.tx.borrow().is_error() {
            tracing::debug!(%key, "remounting errored entry");
            entry.tx.send_modify(|state| state.is_stale = true);
        }
        entry.observers += 1;
        entry.unobserved_since = None;
        let rx = entry.tx.subscribe();
        drop(entries);

        QueryObserver::new(self.clone(), key, rx)
    }

    /// Current state of `key`, or `None` if the cache holds no entry for it.
    pub fn get_state(&self, key: &QueryKey) -> Option<QueryState> {
        let mut entries = self.entries();
        collect_garbage(&mut entries, self.inner.gc_time);
        entries.get(key).map(|entry| entry.tx.borrow().clone())
    }

    /// Mark every entry whose key starts with `prefix` as stale.
    ///
    /// Nothing is re-fetched here; the next read of each entry does that.
    /// Returns the number of entries marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries();
        collect_garbage(&mut entries, self.inner.gc_time);

        let mut count = 0;
        for (_, entry) in entries.iter_mut().filter(|(key, _)| key.starts_with(prefix)) {
            if entry.fetch.is_some() {
                entry.invalidated_during_fetch = true;
            }
            entry.tx.send_modify(|state| state.is_stale = true);
            count += 1;
        }

        tracing::info!(%prefix, count, "invalidated queries");
        count
    }

    /// Start `fetch` for `key` unless a request is already in flight.
    ///
    /// Without `force`, only absent-data or stale entries are fetched.
    /// The future is dropped unpolled when no fetch is started.
    pub(crate) fn fetch<T, F>(&self, key: &QueryKey, force: bool, fetch: F) -> bool
    where
        T: Serialize + Send + 'static,
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };

        let should_fetch = {
            let state = entry.tx.borrow();
            !state.is_fetching && (force || state.needs_fetch())
        };
        if !should_fetch {
            tracing::trace!(%key, "cache hit");
            return false;
        }

        let generation = self.inner.next_generation();
        entry.generation = generation;
        entry.invalidated_during_fetch = false;
        entry.tx.send_modify(|state| state.is_fetching = true);

        let cache = Arc::downgrade(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = fetch.await.and_then(|data| {
                serde_json::to_value(data).map_err(|e| ApiError::Decode(e.to_string()))
            });
            resolve(cache, &task_key, generation, result);
        });
        entry.fetch = Some(handle.abort_handle());

        tracing::debug!(%key, generation, "fetch started");
        true
    }

    /// Drop one observer of `key`. The last one out cancels any in-flight fetch.
    pub(crate) fn release(&self, key: &QueryKey) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };

        entry.observers = entry.observers.saturating_sub(1);
        if entry.observers > 0 {
            return;
        }

        if let Some(handle) = entry.fetch.take() {
            handle.abort();
            entry.generation = self.inner.next_generation();
            entry.tx.send_modify(|state| state.is_fetching = false);
            tracing::debug!(%key, "cancelled in-flight fetch");
        }

        if self.inner.gc_time.is_zero() {
            entries.remove(key);
            tracing::debug!(%key, "removed unobserved entry");
        } else {
            entry.unobserved_since = Some(Instant::now());
        }
    }
}

/// Store a fetch result, unless the entry is gone or a newer fetch owns it.
fn resolve(cache: Weak<Inner>, key: &QueryKey, generation: u64, result: Result<Value, ApiError>) {
    let Some(inner) = cache.upgrade() else {
        return;
    };
    let mut entries = inner
        .entries
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let Some(entry) = entries.get_mut(key) else {
        tracing::debug!(%key, "discarding result for removed entry");
        return;
    };
    if entry.generation != generation {
        tracing::debug!(%key, generation, "discarding superseded result");
        return;
    }

    entry.fetch = None;
    let stale = std::mem::take(&mut entry.invalidated_during_fetch);
    let now = Utc::now();

    match &result {
        Ok(_) => tracing::debug!(%key, "fetch succeeded"),
        Err(e) => tracing::warn!(%key, error = %e, "fetch failed"),
    }

    entry.tx.send_modify(move |state| {
        state.is_fetching = false;
        state.is_stale = stale;
        match result {
            Ok(data) => {
                state.status = QueryStatus::Success;
                state.data = Some(data);
                state.error = None;
                state.data_updated_at = Some(now);
            }
            Err(err) => {
                state.status = QueryStatus::Error;
                state.error = Some(err);
                state.error_updated_at = Some(now);
            }
        }
    });
}

fn collect_garbage(entries: &mut HashMap<QueryKey, Entry>, gc_time: Duration) {
    entries.retain(|key, entry| {
        let expired = entry.observers == 0
            && entry
                .unobserved_since
                .is_some_and(|since| since.elapsed() >= gc_time);
        if expired {
            tracing::debug!(%key, "collected unobserved entry");
        }
        !expired
    });
}
