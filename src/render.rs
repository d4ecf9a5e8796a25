//! TUI rendering traits for eventdeck types.
//!
//! Extension traits that turn the core's view states into colored terminal
//! text using owo_colors.

use eventdeck_core::Event;
use eventdeck_core::detail::DetailView;
use eventdeck_core::dialog::{DeleteDialog, DialogActions};
use eventdeck_core::list::ListView;
use eventdeck_core::view::{ErrorBlock, QueryView};
use owo_colors::OwoColorize;

pub const DETAIL_LOADING: &str = "Fetching event details...";
pub const LIST_LOADING: &str = "Fetching events...";

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for ErrorBlock {
    fn render(&self) -> String {
        format!("{}\n{}", self.title.red().bold(), self.message.red())
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let mut lines = vec![self.title.bold().to_string(), String::new()];

        lines.push(format!("📍 {}", self.location));

        let schedule = self.schedule_label();
        match self.machine_timestamp() {
            Some(ts) => lines.push(format!("🕑 {} {}", schedule, format!("({ts})").dimmed())),
            None => lines.push(format!("🕑 {}", schedule)),
        }

        lines.push(format!("🖼  {}", self.image_url().dimmed()));
        lines.push(String::new());
        lines.push(self.description.clone());

        lines.join("\n")
    }
}

impl Render for DetailView {
    fn render(&self) -> String {
        match self {
            QueryView::Loading => DETAIL_LOADING.dimmed().to_string(),
            QueryView::Failed(block) => block.render(),
            QueryView::Loaded(event) => event.render(),
        }
    }
}

impl Render for ListView {
    fn render(&self) -> String {
        match self {
            QueryView::Loading => LIST_LOADING.dimmed().to_string(),
            QueryView::Failed(block) => block.render(),
            QueryView::Loaded(events) if events.is_empty() => "No events found".dimmed().to_string(),
            QueryView::Loaded(events) => events
                .iter()
                .map(|event| format!("  {} {}", event.title, list_subtitle(event).dimmed()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl Render for DeleteDialog {
    fn render(&self) -> String {
        let mut lines = vec![self.title.bold().to_string(), self.prompt.to_string()];

        if let DialogActions::Waiting(message) = &self.actions {
            lines.push(message.dimmed().to_string());
        }

        if let Some(error) = &self.error {
            lines.push(String::new());
            lines.push(error.render());
        }

        lines.join("\n")
    }
}

/// One-line label used to pick an event from the list
pub fn list_label(event: &Event) -> String {
    format!("{} {}", event.title, list_subtitle(event))
}

fn list_subtitle(event: &Event) -> String {
    format!("({}, {})", event.schedule_label(), event.location)
}
