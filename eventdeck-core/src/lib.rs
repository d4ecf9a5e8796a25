//! Core of eventdeck.
//!
//! This crate holds everything that is not terminal specific:
//! - `Event` and the `EventsApi` HTTP client
//! - `query`, the process-wide cache shared by all screens
//! - `EventDetail` / `EventList`, the screen controllers, and the view
//!   states they resolve to
//! - `DeleteDialog`, the confirmation dialog model

pub mod api;
pub mod config;
pub mod detail;
pub mod dialog;
pub mod error;
pub mod event;
pub mod list;
pub mod mutation;
pub mod query;
pub mod route;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{EventsApi, HttpEventsApi};
pub use error::{ApiError, EventsError, EventsResult};
pub use event::Event;
