mod board;
mod config;
mod dates;
mod filters;
mod loader;
mod locale;
mod models;
pub mod render;
mod utils;

use std::fs;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use board::{BoardSettings, EventBoard};
pub use config::{AppConfig, ConfigError};
pub use dates::{parse_date, CardDate, DateInput, DEFAULT_ZONE};
pub use filters::{apply_filters, Control, Filters};
pub use loader::{LoadError, Loader};
pub use locale::Locale;
pub use models::{EventRecord, Status};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("event_board_lib=info,warn"));

    // A host that already installed a subscriber keeps it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Loads the config, fetches the events once and writes the rendered page.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load().context("failed to load configuration")?;
    let settings = BoardSettings::from_config(&config)?;
    let loader = Loader::from_config(&config).context("cannot build events loader")?;

    let mut board = EventBoard::new(settings).with_filters(config.filters.clone());
    // Served as CGI, the filter form submits back through QUERY_STRING.
    if let Ok(query) = std::env::var("QUERY_STRING") {
        board.apply_query(&query);
    }
    info!(endpoint = %loader.endpoint(), "loading events");
    // A failed load is logged and shown on the page; the page is still written.
    let _ = board.reload(&loader).await;

    let html = board.page().to_html();
    match &config.output {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("unable to write page to {path:?}"))?;
            info!(path = %path.display(), "page written");
        }
        None => print!("{html}"),
    }
    Ok(())
}
