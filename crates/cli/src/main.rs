//! Dealcart CLI

use std::{io, process};

use tracing::error;

use crate::config::CliConfig;

mod commands;
mod config;
mod observability;
mod render;

/// Dealcart CLI entry point
#[tokio::main]
async fn main() {
    // Load configuration from .env and CLI arguments
    let config = CliConfig::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for subscriber errors"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }

    let mut out = io::stdout().lock();

    if let Err(error) = commands::run(&config, &mut out).await {
        error!(%error, "command failed");

        #[expect(
            clippy::print_stderr,
            reason = "errors are reported to the shopper regardless of log level"
        )]
        {
            eprintln!("error: {error}");
        }

        process::exit(1);
    }
}
