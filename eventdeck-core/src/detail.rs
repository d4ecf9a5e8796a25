//! Event detail screen controller.
//!
//! Owns one read (the event behind `/events/{id}`) and one write (deleting
//! it). The read goes through the shared [`QueryClient`]; the write is a
//! [`Mutation`] whose result this controller sequences into cache
//! invalidation and navigation.

use std::future::Future;

use tokio::sync::watch;

use crate::api::EventsApi;
use crate::dialog::{DeleteDialog, DialogChoice};
use crate::error::ApiError;
use crate::event::Event;
use crate::mutation::{Mutation, MutationState};
use crate::query::{QueryClient, QueryKey, QueryObserver, QueryState};
use crate::route::{Navigator, Route};
use crate::view::{self, FailureText, QueryView};

pub const LOAD_ERROR: FailureText = FailureText {
    title: "Failed to load event details",
    fallback: "Failed to fetch event detail, please try again later!!",
};

pub type DetailView = QueryView<Event>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The dialog is closed or a delete is already running.
    Ignored,
    Cancelled,
    /// `invalidated` is the number of cache entries marked stale.
    Deleted { invalidated: usize },
    Failed(ApiError),
}

pub struct EventDetail<A: EventsApi> {
    id: String,
    api: A,
    client: QueryClient,
    query: QueryObserver,
    deleting: bool,
    deletion: Mutation<()>,
}

impl<A: EventsApi> EventDetail<A> {
    /// Start observing the event and fetch it unless the cache already has it.
    pub fn mount(client: &QueryClient, api: A, id: impl Into<String>) -> Self {
        let id = id.into();
        let query = client.observe(QueryKey::event(&id));

        let detail = EventDetail {
            id,
            api,
            client: client.clone(),
            query,
            deleting: false,
            deletion: Mutation::new(),
        };
        let fetching = detail.load();
        tracing::debug!(id = %detail.id, fetching, "mounted event detail");
        detail
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn fetcher(&self) -> impl Future<Output = Result<Event, ApiError>> + Send + 'static {
        let api = self.api.clone();
        let id = self.id.clone();
        async move { api.fetch_event(&id).await }
    }

    /// Fetch if the cached entry is missing or stale.
    pub fn load(&self) -> bool {
        self.query.ensure(self.fetcher())
    }

    /// User-triggered re-fetch, e.g. after an error.
    pub fn retry(&self) -> bool {
        self.query.refetch(self.fetcher())
    }

    pub fn query_state(&self) -> QueryState {
        self.query.state()
    }

    pub fn view(&self) -> DetailView {
        view::resolve(&self.query.state(), LOAD_ERROR)
    }

    /// Wait for the read to finish and return the resulting view.
    pub async fn settled(&mut self) -> DetailView {
        let state = self.query.settled().await;
        view::resolve(&state, LOAD_ERROR)
    }

    pub fn start_delete(&mut self) {
        self.deleting = true;
    }

    pub fn stop_delete(&mut self) {
        self.deleting = false;
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// The confirmation dialog, present while the user intends to delete.
    pub fn dialog(&self) -> Option<DeleteDialog> {
        self.deleting
            .then(|| DeleteDialog::new(&self.deletion.state()))
    }

    /// Receiver of delete state transitions, for redrawing the dialog while a delete runs.
    pub fn deletion_updates(&self) -> watch::Receiver<MutationState<()>> {
        self.deletion.subscribe()
    }

    /// Header link back to the list.
    pub fn show_all_events<N: Navigator>(&self, navigator: &mut N) {
        navigator.navigate(Route::Events);
    }

    /// Act on a dialog button.
    pub async fn choose<N: Navigator>(&mut self, choice: DialogChoice, navigator: &mut N) -> DeleteOutcome {
        match choice {
            DialogChoice::Cancel => {
                self.stop_delete();
                DeleteOutcome::Cancelled
            }
            DialogChoice::Delete => self.confirm_delete(navigator).await,
        }
    }

    /// DELETE the event.
    ///
    /// On success every `events` cache entry is marked stale (nothing is
    /// re-fetched) and the navigator is sent to `/events`. On failure the
    /// dialog stays open with the error and the delete can be retried.
    pub async fn confirm_delete<N: Navigator>(&mut self, navigator: &mut N) -> DeleteOutcome {
        if !self.deleting || self.deletion.is_pending() {
            return DeleteOutcome::Ignored;
        }

        let result = self.deletion.run(self.api.delete_event(&self.id)).await;

        match result {
            Ok(()) => {
                let invalidated = self.client.invalidate(&QueryKey::events());
                self.deleting = false;
                tracing::info!(id = %self.id, invalidated, "event deleted");
                navigator.navigate(Route::Events);
                DeleteOutcome::Deleted { invalidated }
            }
            Err(err) => {
                tracing::warn!(id = %self.id, error = %err, "delete failed");
                DeleteOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::DialogActions;
    use crate::route::History;
    use crate::testing::{FakeApi, event};
    use std::time::Duration;

    fn setup() -> (QueryClient, FakeApi, History) {
        let api = FakeApi::with_events(vec![event("e1", "City Walk"), event("e2", "Concert")]);
        (QueryClient::new(), api, History::new(Route::EventDetail("e1".into())))
    }

    #[tokio::test]
    async fn loaded_view_matches_response() {
        let (client, api, _) = setup();
        let mut detail = EventDetail::mount(&client, api.clone(), "e1");

        let QueryView::Loaded(loaded) = detail.settled().await else {
            panic!("expected loaded view");
        };
        assert_eq!(loaded.title, "City Walk");
        assert_eq!(loaded.location, "Main Square");
        assert_eq!(loaded.description, "About City Walk");
        assert_eq!(api.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn pending_read_shows_loading() {
        let (client, api, _) = setup();
        let release = api.gate_fetch();
        let mut detail = EventDetail::mount(&client, api.clone(), "e1");

        assert_eq!(detail.view(), QueryView::Loading);
        assert!(detail.query_state().is_fetching);

        release.send(()).unwrap();
        assert!(matches!(detail.settled().await, QueryView::Loaded(_)));
    }

    #[tokio::test]
    async fn missing_event_shows_server_message() {
        let (client, api, _) = setup();
        let mut detail = EventDetail::mount(&client, api, "nope");

        let QueryView::Failed(block) = detail.settled().await else {
            panic!("expected failure");
        };
        assert_eq!(block.title, "Failed to load event details");
        assert_eq!(block.message, "Could not find event");
    }

    #[tokio::test]
    async fn retry_after_error_issues_new_request() {
        let (client, api, _) = setup();
        let mut detail = EventDetail::mount(&client, api.clone(), "nope");
        detail.settled().await;

        assert!(!detail.load());
        assert!(detail.retry());
        detail.settled().await;
        assert_eq!(api.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn second_view_of_same_event_uses_cache() {
        let (client, api, _) = setup();
        let mut first = EventDetail::mount(&client, api.clone(), "e1");
        first.settled().await;

        let second = EventDetail::mount(&client, api.clone(), "e1");
        assert!(matches!(second.view(), QueryView::Loaded(_)));
        assert_eq!(api.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn delete_intent_opens_one_dialog_and_cancel_issues_no_request() {
        let (client, api, mut history) = setup();
        let mut detail = EventDetail::mount(&client, api.clone(), "e1");
        detail.settled().await;
        assert_eq!(detail.dialog(), None);

        detail.start_delete();
        detail.start_delete();
        let dialog = detail.dialog().expect("dialog open");
        assert_eq!(dialog.choices(), &[DialogChoice::Cancel, DialogChoice::Delete]);

        let outcome = detail.choose(DialogChoice::Cancel, &mut history).await;
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(detail.dialog(), None);
        assert_eq!(api.delete_calls(), 0);
        assert_eq!(history.routes().len(), 1);
    }

    #[tokio::test]
    async fn confirm_without_open_dialog_is_ignored() {
        let (client, api, mut history) = setup();
        let mut detail = EventDetail::mount(&client, api.clone(), "e1");

        assert_eq!(detail.confirm_delete(&mut history).await, DeleteOutcome::Ignored);
        assert_eq!(api.delete_calls(), 0);
    }

    #[tokio::test]
    async fn successful_delete_invalidates_and_navigates() {
        let (client, api, mut history) = setup();
        let mut detail = EventDetail::mount(&client, api.clone(), "e1");
        detail.settled().await;

        // a list entry lives in the cache alongside the detail entry
        let mut list = client.observe(QueryKey::events());
        let list_api = api.clone();
        list.ensure(async move { list_api.fetch_events().await });
        list.settled().await;

        detail.start_delete();
        let outcome = detail.choose(DialogChoice::Delete, &mut history).await;

        assert_eq!(outcome, DeleteOutcome::Deleted { invalidated: 2 });
        assert_eq!(history.current(), Some(&Route::Events));
        assert_eq!(history.routes().len(), 2);
        assert!(!detail.is_deleting());

        // stale, not absent, and not re-fetched
        let state = client.get_state(&QueryKey::event("e1")).expect("entry kept");
        assert!(state.is_stale);
        assert!(client.get_state(&QueryKey::events()).unwrap().is_stale);
        tokio::task::yield_now().await;
        assert_eq!(api.fetch_calls(), 1);
        assert_eq!(api.list_calls(), 1);
        assert_eq!(api.delete_calls(), 1);
    }

    #[tokio::test]
    async fn failed_delete_keeps_dialog_open_and_allows_retry() {
        let (client, api, mut history) = setup();
        let mut detail = EventDetail::mount(&client, api.clone(), "e1");
        detail.settled().await;

        api.fail_next_delete(ApiError::Status {
            status: 500,
            message: Some("Database is locked".into()),
        });
        detail.start_delete();
        let outcome = detail.confirm_delete(&mut history).await;
        assert!(matches!(outcome, DeleteOutcome::Failed(_)));

        let dialog = detail.dialog().expect("dialog still open");
        assert_eq!(
            dialog.error.as_ref().map(|e| e.message.as_str()),
            Some("Database is locked")
        );
        assert!(dialog.choices().contains(&DialogChoice::Delete));
        assert_eq!(history.routes().len(), 1);

        let outcome = detail.confirm_delete(&mut history).await;
        assert_eq!(outcome, DeleteOutcome::Deleted { invalidated: 1 });
        assert_eq!(api.delete_calls(), 2);
        assert_eq!(history.current(), Some(&Route::Events));
    }

    #[tokio::test]
    async fn failed_delete_without_message_uses_fallback() {
        let (client, api, mut history) = setup();
        let mut detail = EventDetail::mount(&client, api.clone(), "e1");
        api.fail_next_delete(ApiError::Network("connection reset".into()));

        detail.start_delete();
        detail.confirm_delete(&mut history).await;

        let dialog = detail.dialog().unwrap();
        assert_eq!(
            dialog.error.map(|e| e.message),
            Some("Failed to delete the event, please try again later".to_string())
        );
    }

    #[tokio::test]
    async fn pending_delete_shows_waiting_message() {
        let (client, api, mut history) = setup();
        let mut detail = EventDetail::mount(&client, api.clone(), "e1");
        detail.settled().await;
        detail.start_delete();

        let release = api.gate_delete();
        let mut updates = detail.deletion_updates();
        let outcome = {
            let delete = detail.confirm_delete(&mut history);
            tokio::pin!(delete);

            tokio::select! {
                _ = &mut delete => panic!("delete finished before release"),
                _ = updates.changed() => {}
            }
            let dialog = DeleteDialog::new(&updates.borrow().clone());
            assert_eq!(dialog.actions, DialogActions::Waiting("Deleting, please wait!..."));

            release.send(()).unwrap();
            delete.await
        };
        assert_eq!(outcome, DeleteOutcome::Deleted { invalidated: 1 });
    }

    #[tokio::test]
    async fn unmount_during_fetch_cancels_request() {
        let (client, api, _) = setup();
        let mut release = api.gate_fetch();
        let detail = EventDetail::mount(&client, api.clone(), "e1");
        assert_eq!(detail.view(), QueryView::Loading);

        // let the request start and park on the gate
        while api.fetch_calls() == 0 {
            tokio::task::yield_now().await;
        }
        drop(detail);
        assert!(client.get_state(&QueryKey::event("e1")).is_none());

        tokio::time::timeout(Duration::from_secs(1), release.closed())
            .await
            .expect("fetch should be cancelled");
        assert!(release.send(()).is_err());
        assert!(client.get_state(&QueryKey::event("e1")).is_none());
    }
}
