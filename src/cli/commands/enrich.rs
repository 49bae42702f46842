//! Bulk album enrichment command.

use tokio::runtime::Runtime;

use crate::cli::console::ConsolePresenter;
use crate::config;
use crate::enrichment::EnrichmentJob;

use super::{Cli, open_services_with};

/// Fetch missing albums for up to `limit` items
pub fn cmd_enrich(rt: &Runtime, cli: &Cli, limit: Option<u32>) -> anyhow::Result<()> {
    rt.block_on(async {
        let mut config = config::load(cli.config.as_deref());
        if let Some(limit) = limit {
            config.enrichment.batch_limit = limit;
        }
        let job_config = config.enrichment.clone();

        let services = open_services_with(cli, config).await?;
        if !services.resolver.has_providers() {
            eprintln!("Error: all metadata providers are disabled.");
            eprintln!("Enable musicbrainz_enabled or itunes_enabled in the [metadata] config section.");
            std::process::exit(1);
        }

        println!(
            "Enriching up to {} items (one request every {:?})...\n",
            job_config.batch_limit,
            services.resolver.limiter().min_interval()
        );

        let job = EnrichmentJob::new(services.store.clone(), services.resolver.clone(), job_config);
        let outcome = job.run(&ConsolePresenter::new()).await?;
        println!("{}", outcome.report());
        Ok(())
    })
}
