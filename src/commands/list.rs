use anyhow::Result;
use eventdeck_core::EventsApi;
use eventdeck_core::list::EventList;
use eventdeck_core::route::History;
use eventdeck_core::view::QueryView;
use owo_colors::OwoColorize;

use crate::app::Context;
use crate::render::{LIST_LOADING, Render, list_label};
use crate::utils::tui;

const RETRY: &str = "Try again";
const QUIT: &str = "Quit";

/// The `/events` screen: pick an event to open it.
pub async fn run<A: EventsApi>(ctx: &Context<A>, history: &mut History) -> Result<()> {
    let mut list = EventList::mount(&ctx.client, ctx.api.clone());

    loop {
        let view = tui::with_spinner(LIST_LOADING, list.settled()).await;

        println!("{}", "All Events".bold());
        println!("{}\n", view.render());

        match view {
            QueryView::Loaded(events) => {
                let mut items: Vec<String> = events.iter().map(list_label).collect();
                items.push(QUIT.to_string());

                match tui::pick("Open an event", &items)? {
                    Some(i) if i < events.len() => {
                        list.open(&events[i], history);
                        return Ok(());
                    }
                    _ => return Ok(()),
                }
            }
            QueryView::Failed(_) => match tui::pick("What now?", &[RETRY, QUIT])? {
                Some(0) => {
                    list.retry();
                }
                _ => return Ok(()),
            },
            QueryView::Loading => {
                list.load();
            }
        }
    }
}
