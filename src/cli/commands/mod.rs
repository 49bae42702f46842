//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `shell`: interactive session through the bot router
//! - `catalog`: search, browse, import and statistics
//! - `enrich`: bulk album enrichment

mod catalog;
mod enrich;
mod shell;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::bot::Services;
use crate::config;
use crate::db::{self, RecordStore, SqliteStore};

pub use catalog::{cmd_artists, cmd_import, cmd_search, cmd_stats};
pub use enrich::cmd_enrich;
pub use shell::cmd_shell;

/// Catalog Bot CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/catalog-bot/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path
    #[arg(long, global = true, env = "CATALOG_DB")]
    pub db: Option<PathBuf>,

    /// Extra admin ids, comma-separated
    #[arg(long, global = true, env = "ADMIN_IDS")]
    pub admin_ids: Option<String>,

    /// User id the console acts as
    #[arg(long, global = true, env = "CATALOG_USER_ID", default_value_t = 0)]
    pub user_id: i64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Interactive session (default)
    Shell,
    /// Search the catalog like a chat message would
    Search {
        /// Free-text query
        query: String,
    },
    /// Browse the artist list
    Artists {
        /// Zero-based page
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Add an item as an upload would
    Import {
        /// Channel-side reference of the audio asset
        external_ref: String,
        /// Title tag
        #[arg(long)]
        title: Option<String>,
        /// Performer tag
        #[arg(long)]
        performer: Option<String>,
        /// Original file name
        #[arg(long)]
        file_name: Option<String>,
        /// Duration in seconds
        #[arg(long)]
        duration: Option<i64>,
    },
    /// Fetch missing album information for the catalog
    Enrich {
        /// Maximum items to process (default from config)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show catalog statistics
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Run the specified CLI command, or the shell when none is given.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;

    match &cli.command {
        None | Some(Commands::Shell) => cmd_shell(&rt, cli),
        Some(Commands::Search { query }) => cmd_search(&rt, cli, query),
        Some(Commands::Artists { page }) => cmd_artists(&rt, cli, *page),
        Some(Commands::Import {
            external_ref,
            title,
            performer,
            file_name,
            duration,
        }) => {
            let upload = crate::upload::AudioUpload {
                user_id: cli.user_id,
                external_ref: external_ref.clone(),
                title: title.clone(),
                performer: performer.clone(),
                file_name: file_name.clone(),
                duration: *duration,
            };
            cmd_import(&rt, cli, upload)
        }
        Some(Commands::Enrich { limit }) => cmd_enrich(&rt, cli, *limit),
        Some(Commands::Stats { json }) => cmd_stats(&rt, cli, *json),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Load config, open the database and build the shared services.
pub(crate) async fn open_services(cli: &Cli) -> anyhow::Result<Services> {
    let config = config::load(cli.config.as_deref());
    open_services_with(cli, config).await
}

pub(crate) async fn open_services_with(
    cli: &Cli,
    config: config::Config,
) -> anyhow::Result<Services> {
    let url = db::db_url(cli.db.as_deref());
    let pool = db::init_db(&url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database {}: {}", url, e))?;
    tracing::debug!("Opened database {}", url);

    let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::new(pool));
    Ok(Services::from_config(config, store, cli.admin_ids.as_deref())?)
}
