//! Event list screen controller (`/events`).

use crate::api::EventsApi;
use crate::event::Event;
use crate::query::{QueryClient, QueryKey, QueryObserver};
use crate::route::{Navigator, Route};
use crate::view::{self, FailureText, QueryView};

pub const LIST_ERROR: FailureText = FailureText {
    title: "An error occurred",
    fallback: "Failed to fetch events.",
};

pub type ListView = QueryView<Vec<Event>>;

pub struct EventList<A: EventsApi> {
    api: A,
    query: QueryObserver,
}

impl<A: EventsApi> EventList<A> {
    pub fn mount(client: &QueryClient, api: A) -> Self {
        let query = client.observe(QueryKey::events());
        let list = EventList { api, query };
        let fetching = list.load();
        tracing::debug!(fetching, "mounted event list");
        list
    }

    /// Fetch if the list is missing or was invalidated.
    pub fn load(&self) -> bool {
        let api = self.api.clone();
        self.query.ensure(async move { api.fetch_events().await })
    }

    pub fn retry(&self) -> bool {
        let api = self.api.clone();
        self.query.refetch(async move { api.fetch_events().await })
    }

    pub fn view(&self) -> ListView {
        view::resolve(&self.query.state(), LIST_ERROR)
    }

    pub async fn settled(&mut self) -> ListView {
        let state = self.query.settled().await;
        view::resolve(&state, LIST_ERROR)
    }

    pub fn open<N: Navigator>(&self, event: &Event, navigator: &mut N) {
        navigator.navigate(Route::EventDetail(event.id.clone()));
    }
}
