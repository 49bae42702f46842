//! Command-line interface for catalog-bot.
//!
//! This module provides the console front end: an interactive shell that
//! drives the bot router, plus one-shot catalog and enrichment commands.

mod commands;
pub mod console;

pub use commands::{Cli, Commands, run_command};
