//! In-memory event API for controller tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;

use crate::api::EventsApi;
use crate::error::ApiError;
use crate::event::Event;

#[derive(Default)]
struct FakeState {
    events: Vec<Event>,
    fetch_calls: usize,
    list_calls: usize,
    delete_calls: usize,
    fetch_gate: Option<oneshot::Receiver<()>>,
    delete_gate: Option<oneshot::Receiver<()>>,
    delete_failures: VecDeque<ApiError>,
}

#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

pub fn event(id: &str, title: &str) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("About {title}"),
        date: "2024-05-01".into(),
        time: "18:30".into(),
        location: "Main Square".into(),
        image: format!("images/{id}.jpg"),
    }
}

impl FakeApi {
    pub fn with_events(events: Vec<Event>) -> Self {
        let api = FakeApi::default();
        api.lock().events = events;
        api
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Hold the next GET until the returned sender fires or is dropped.
    pub fn gate_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().fetch_gate = Some(rx);
        tx
    }

    /// Hold the next DELETE until the returned sender fires or is dropped.
    pub fn gate_delete(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().delete_gate = Some(rx);
        tx
    }

    pub fn fail_next_delete(&self, err: ApiError) {
        self.lock().delete_failures.push_back(err);
    }

    pub fn fetch_calls(&self) -> usize {
        self.lock().fetch_calls
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.lock().delete_calls
    }
}

impl EventsApi for FakeApi {
    async fn fetch_event(&self, id: &str) -> Result<Event, ApiError> {
        let gate = {
            let mut state = self.lock();
            state.fetch_calls += 1;
            state.fetch_gate.take()
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let found = self.lock().events.iter().find(|e| e.id == id).cloned();
        found.ok_or_else(|| ApiError::Status {
            status: 404,
            message: Some("Could not find event".into()),
        })
    }

    async fn fetch_events(&self) -> Result<Vec<Event>, ApiError> {
        let mut state = self.lock();
        state.list_calls += 1;
        Ok(state.events.clone())
    }

    async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
        let gate = {
            let mut state = self.lock();
            state.delete_calls += 1;
            state.delete_gate.take()
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut state = self.lock();
        if let Some(err) = state.delete_failures.pop_front() {
            return Err(err);
        }
        state.events.retain(|e| e.id != id);
        Ok(())
    }
}
