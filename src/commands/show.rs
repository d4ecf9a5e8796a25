use anyhow::Result;
use eventdeck_core::EventsApi;
use eventdeck_core::detail::{DeleteOutcome, EventDetail};
use eventdeck_core::dialog::{DeleteDialog, DialogActions, DialogChoice};
use eventdeck_core::route::History;
use eventdeck_core::view::QueryView;
use indicatif::ProgressBar;
use owo_colors::OwoColorize;

use crate::app::Context;
use crate::render::{DETAIL_LOADING, Render};
use crate::utils::tui;

#[derive(Clone, Copy)]
enum Action {
    Delete,
    Retry,
    ViewAll,
    Quit,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Action::Delete => "Delete",
            Action::Retry => "Try again",
            Action::ViewAll => "View all Events",
            Action::Quit => "Quit",
        }
    }
}

/// The `/events/{id}` screen.
pub async fn run<A: EventsApi>(ctx: &Context<A>, id: &str, history: &mut History) -> Result<()> {
    let mut detail = EventDetail::mount(&ctx.client, ctx.api.clone(), id);

    loop {
        let view = if detail.query_state().is_fetching {
            tui::with_spinner(DETAIL_LOADING, detail.settled()).await
        } else {
            detail.view()
        };

        println!("{}", view.render());
        println!();

        let actions: &[Action] = match view {
            QueryView::Loaded(_) => &[Action::Delete, Action::ViewAll, Action::Quit],
            QueryView::Failed(_) => &[Action::Retry, Action::ViewAll, Action::Quit],
            QueryView::Loading => &[Action::Retry, Action::Quit],
        };
        let labels: Vec<&str> = actions.iter().map(Action::label).collect();
        let picked = tui::pick("Choose an action", &labels)?;

        match picked.map(|i| actions[i]).unwrap_or(Action::Quit) {
            Action::Delete => {
                detail.start_delete();
                if confirm_delete(&mut detail, history).await? {
                    return Ok(());
                }
            }
            Action::Retry => {
                detail.retry();
            }
            Action::ViewAll => {
                detail.show_all_events(history);
                return Ok(());
            }
            Action::Quit => return Ok(()),
        }
    }
}

/// Show the dialog until it is closed. Returns true if the event was deleted.
async fn confirm_delete<A: EventsApi>(detail: &mut EventDetail<A>, history: &mut History) -> Result<bool> {
    while let Some(dialog) = detail.dialog() {
        println!("\n{}\n", dialog.render());

        let choices = dialog.choices();
        let labels: Vec<&str> = choices.iter().map(DialogChoice::label).collect();
        // Esc closes the dialog like Cancel
        let choice = tui::pick("Delete this event?", &labels)?
            .map(|i| choices[i])
            .unwrap_or(DialogChoice::Cancel);

        match choose(detail, choice, history).await {
            DeleteOutcome::Deleted { .. } => {
                println!("{}", "Event deleted".green());
                return Ok(true);
            }
            DeleteOutcome::Failed(_) => {}
            DeleteOutcome::Cancelled | DeleteOutcome::Ignored => return Ok(false),
        }
    }

    Ok(false)
}

/// Run a dialog choice, showing the dialog's waiting message while the delete is in flight.
async fn choose<A: EventsApi>(
    detail: &mut EventDetail<A>,
    choice: DialogChoice,
    history: &mut History,
) -> DeleteOutcome {
    let mut updates = detail.deletion_updates();
    let outcome = detail.choose(choice, history);
    tokio::pin!(outcome);

    let mut spinner: Option<ProgressBar> = None;
    loop {
        tokio::select! {
            outcome = &mut outcome => {
                if let Some(spinner) = spinner.take() {
                    spinner.finish_and_clear();
                }
                return outcome;
            }
            Ok(()) = updates.changed() => {
                let dialog = DeleteDialog::new(&updates.borrow_and_update().clone());
                if let DialogActions::Waiting(message) = dialog.actions {
                    spinner.get_or_insert_with(|| tui::create_spinner(message.to_string()));
                }
            }
        }
    }
}
