mod app;
mod commands;
mod logging;
mod render;
mod utils;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use eventdeck_core::HttpEventsApi;
use eventdeck_core::config::Settings;
use eventdeck_core::query::QueryClient;
use eventdeck_core::route::Route;

use crate::app::Context;

#[derive(Parser)]
#[command(name = "eventdeck")]
#[command(about = "Browse and delete events served by an event API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the event API (overrides the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List all events
    List,
    /// Show one event
    Show {
        /// Event id, or a path like /events/<id>
        id: String,
    },
}

impl Commands {
    fn start_route(&self) -> Result<Route> {
        match self {
            Commands::List => Ok(Route::Events),
            Commands::Show { id } if id.starts_with('/') => {
                id.parse().with_context(|| format!("Cannot open '{id}'"))
            }
            Commands::Show { id } => Ok(Route::EventDetail(id.clone())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut settings = Settings::load().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    tracing::debug!(?settings, "loaded settings");

    let api = HttpEventsApi::new(&settings.api_url, settings.request_timeout)?;
    let client = QueryClient::with_gc_time(settings.gc_time);
    let ctx = Context::new(client, api);

    let start = cli.command.start_route()?;
    app::run(&ctx, start).await
}
