//! Delete confirmation dialog.

use crate::mutation::MutationState;
use crate::view::ErrorBlock;

pub const DIALOG_TITLE: &str = "Are you sure?";
pub const DIALOG_PROMPT: &str = "Do you really sure to delete this event?";
pub const DELETING_MESSAGE: &str = "Deleting, please wait!...";
pub const DELETE_ERROR_TITLE: &str = "Failed to delete the event";
pub const DELETE_ERROR_FALLBACK: &str = "Failed to delete the event, please try again later";

/// A button in the dialog's action area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    /// Close the dialog without deleting
    Cancel,
    Delete,
}

impl DialogChoice {
    pub fn label(&self) -> &'static str {
        match self {
            DialogChoice::Cancel => "Cancel",
            DialogChoice::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogActions {
    /// The write is in flight; no buttons are offered.
    Waiting(&'static str),
    Choices(Vec<DialogChoice>),
}

/// Presentational model of the dialog, rebuilt from the delete mutation's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDialog {
    pub title: &'static str,
    pub prompt: &'static str,
    pub actions: DialogActions,
    pub error: Option<ErrorBlock>,
}

impl DeleteDialog {
    pub fn new<T>(deletion: &MutationState<T>) -> Self {
        let actions = if deletion.is_pending() {
            DialogActions::Waiting(DELETING_MESSAGE)
        } else {
            DialogActions::Choices(vec![DialogChoice::Cancel, DialogChoice::Delete])
        };

        let error = deletion
            .error()
            .map(|err| ErrorBlock::from_error(DELETE_ERROR_TITLE, Some(err), DELETE_ERROR_FALLBACK));

        DeleteDialog {
            title: DIALOG_TITLE,
            prompt: DIALOG_PROMPT,
            actions,
            error,
        }
    }

    /// Buttons currently offered, empty while waiting.
    pub fn choices(&self) -> &[DialogChoice] {
        match &self.actions {
            DialogActions::Waiting(_) => &[],
            DialogActions::Choices(choices) => choices.as_slice(),
        }
    }
}
