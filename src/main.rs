//! Catalog Bot - browse and search an audio catalog by artist and album.
//!
//! The bot resolves free-text queries into paginated artist/album/track
//! views, encodes navigation state into short action identifiers, and fills
//! in missing album information from external metadata providers. This
//! binary drives it from a console shell or one-shot CLI commands.

pub mod bot;
pub mod channel;
pub mod cli;
pub mod config;
pub mod db;
pub mod delivery;
pub mod enrichment;
pub mod error;
pub mod model;
pub mod navigation;
#[cfg(test)]
pub mod test_utils;
pub mod upload;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so console views stay readable
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalog_bot=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run_command(&args)
}
