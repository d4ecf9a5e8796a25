//! Screens and navigation between them.

use std::fmt;
use std::str::FromStr;

use crate::error::EventsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/events`
    Events,
    /// `/events/{id}`
    EventDetail(String),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Events => write!(f, "/events"),
            Route::EventDetail(id) => write!(f, "/events/{id}"),
        }
    }
}

impl FromStr for Route {
    type Err = EventsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            ["events"] => Ok(Route::Events),
            ["events", id] if !id.is_empty() => Ok(Route::EventDetail(id.to_string())),
            _ => Err(EventsError::Route(s.to_string())),
        }
    }
}

/// Receives navigation requests from controllers.
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

/// Navigator that records every route it was sent to.
#[derive(Debug, Default)]
pub struct History {
    routes: Vec<Route>,
}

impl History {
    pub fn new(start: Route) -> Self {
        History {
            routes: vec![start],
        }
    }

    pub fn current(&self) -> Option<&Route> {
        self.routes.last()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Navigator for History {
    fn navigate(&mut self, route: Route) {
        tracing::debug!(%route, "navigate");
        self.routes.push(route);
    }
}
