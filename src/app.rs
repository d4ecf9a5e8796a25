//! Screen loop: runs the screen for the current route until a screen stops navigating.

use anyhow::Result;
use eventdeck_core::EventsApi;
use eventdeck_core::query::QueryClient;
use eventdeck_core::route::{History, Route};

use crate::commands;

/// What every screen needs: the shared cache and the API client.
pub struct Context<A: EventsApi> {
    pub client: QueryClient,
    pub api: A,
}

impl<A: EventsApi> Context<A> {
    pub fn new(client: QueryClient, api: A) -> Self {
        Context { client, api }
    }
}

/// Run screens starting at `start`. Returns when a screen exits without navigating.
pub async fn run<A: EventsApi>(ctx: &Context<A>, start: Route) -> Result<()> {
    let mut history = History::new(start);

    loop {
        let Some(route) = history.current().cloned() else {
            return Ok(());
        };
        let visited = history.routes().len();

        tracing::debug!(%route, "showing screen");
        match &route {
            Route::Events => commands::list::run(ctx, &mut history).await?,
            Route::EventDetail(id) => commands::show::run(ctx, id, &mut history).await?,
        }

        if history.routes().len() == visited {
            return Ok(());
        }
        println!();
    }
}
