//! Search, browse, import and statistics commands.

use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::bot::{Bot, Inbound};
use crate::cli::console::{ConsoleChannel, ConsolePresenter};
use crate::upload::AudioUpload;

use super::{Cli, open_services};

/// Run one search and print the resulting view
pub fn cmd_search(rt: &Runtime, cli: &Cli, query: &str) -> anyhow::Result<()> {
    rt.block_on(async {
        let bot = Bot::new(open_services(cli).await?, Arc::new(ConsoleChannel));
        let presenter = ConsolePresenter::new();
        bot.handle(
            Inbound::Text {
                user_id: cli.user_id,
                text: query.to_string(),
            },
            &presenter,
        )
        .await;
        Ok(())
    })
}

/// Print one page of the artist list
pub fn cmd_artists(rt: &Runtime, cli: &Cli, page: u32) -> anyhow::Result<()> {
    rt.block_on(async {
        let bot = Bot::new(open_services(cli).await?, Arc::new(ConsoleChannel));
        let presenter = ConsolePresenter::new();
        let id = format!("artists_page:::{}", page);
        bot.handle(
            Inbound::Action {
                user_id: cli.user_id,
                id,
            },
            &presenter,
        )
        .await;
        Ok(())
    })
}

/// Add one item through the upload intake
pub fn cmd_import(rt: &Runtime, cli: &Cli, upload: AudioUpload) -> anyhow::Result<()> {
    rt.block_on(async {
        let bot = Bot::new(open_services(cli).await?, Arc::new(ConsoleChannel));
        let presenter = ConsolePresenter::new();
        bot.handle(Inbound::Upload(upload), &presenter).await;
        Ok(())
    })
}

/// Print catalog statistics
pub fn cmd_stats(rt: &Runtime, cli: &Cli, json: bool) -> anyhow::Result<()> {
    rt.block_on(async {
        let services = open_services(cli).await?;
        let stats = services.store.stats().await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("Catalog statistics");
        println!("==================");
        println!("Tracks:         {}", stats.total_items);
        println!("Artists:        {}", stats.unique_artists);
        println!("Albums:         {}", stats.unique_albums);
        println!("Genres:         {}", stats.genres);
        println!("Missing album:  {}", stats.missing_album);
        println!("Album coverage: {:.1}%", stats.album_coverage());
        if let Some(last) = &stats.last_upload {
            println!("Last upload:    {}", last);
        }
        Ok(())
    })
}
