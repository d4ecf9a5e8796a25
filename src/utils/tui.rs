use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/", "-"])
        .template("{msg} {spinner}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Show a spinner with `message` until `fut` completes.
pub async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let spinner = create_spinner(message.to_string());
    let output = fut.await;
    spinner.finish_and_clear();
    output
}

/// Let the user pick one of `items`. `None` when the prompt is dismissed (Esc/q).
pub fn pick<T: AsRef<str>>(prompt: &str, items: &[T]) -> Result<Option<usize>> {
    let labels: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    let picked = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(picked)
}
