//! Album backfill over the "missing album" backlog.
//!
//! Runs sequentially in the caller's task. Every update is committed as it
//! happens, so an interrupted run simply leaves a shorter backlog for the
//! next one.

use std::sync::Arc;
use std::time::Duration;

use super::resolver::MetadataResolver;
use crate::channel::Presenter;
use crate::config::EnrichmentJobConfig;
use crate::db::RecordStore;
use crate::error::{Result, ResultExt};
use crate::model::CatalogItem;

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentOutcome {
    /// Items missing an album before the run
    pub backlog: i64,
    /// Items selected for this run
    pub total: usize,
    pub updated: usize,
    pub not_found: usize,
    /// Placeholder artists, never sent to a provider
    pub skipped: usize,
}

impl EnrichmentOutcome {
    /// Items actually looked up.
    pub fn processed(&self) -> usize {
        self.total - self.skipped
    }

    /// `updated / processed` in percent, one decimal.
    pub fn success_rate(&self) -> f64 {
        let processed = self.processed();
        if processed == 0 {
            return 0.0;
        }
        let rate = self.updated as f64 / processed as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }

    /// Final report text.
    pub fn report(&self) -> String {
        if self.backlog == 0 {
            return "✅ All items already have album information!\n\nNo enrichment needed."
                .to_string();
        }

        format!(
            "✅ Metadata enrichment complete!\n\n\
             📊 Results:\n\
             Total processed: {}\n\
             ✅ Successfully updated: {}\n\
             ❌ Not found: {}\n\
             ⏭ Skipped: {}\n\n\
             📈 Success rate: {:.1}%",
            self.processed(),
            self.updated,
            self.not_found,
            self.skipped,
            self.success_rate()
        )
    }

    fn progress(&self, done: usize, eta: Duration) -> String {
        format!(
            "🔄 Processing items...\n\n\
             Progress: {}/{}\n\
             ✅ Updated: {}\n\
             ❌ Not found: {}\n\
             ⏭ Skipped: {}\n\n\
             ⏱ Estimated time: ~{} seconds",
            done,
            self.total,
            self.updated,
            self.not_found,
            self.skipped,
            eta.as_secs()
        )
    }
}

pub struct EnrichmentJob {
    store: Arc<dyn RecordStore>,
    resolver: Arc<MetadataResolver>,
    config: EnrichmentJobConfig,
}

impl EnrichmentJob {
    pub fn new(
        store: Arc<dyn RecordStore>,
        resolver: Arc<MetadataResolver>,
        config: EnrichmentJobConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            config,
        }
    }

    /// Process up to `batch_limit` items missing an album, oldest first.
    ///
    /// Only selecting the batch can fail; per-item errors are logged and
    /// counted as not found.
    pub async fn run(&self, presenter: &dyn Presenter) -> Result<EnrichmentOutcome> {
        let backlog = self
            .store
            .count_missing_album()
            .await
            .with_context("counting items without album")?;

        if backlog == 0 {
            tracing::info!("Enrichment skipped: no items without album");
            return Ok(EnrichmentOutcome::default());
        }

        let items = self
            .store
            .list_missing_album(self.config.batch_limit)
            .await
            .with_context("selecting items without album")?;

        let mut outcome = EnrichmentOutcome {
            backlog,
            total: items.len(),
            ..Default::default()
        };

        presenter
            .status(&format!(
                "🔄 Processing {} items...\n\n📊 Total without album: {}\nProgress: 0/{}",
                outcome.total, backlog, outcome.total
            ))
            .await;
        tracing::info!("Starting bulk enrichment: {} of {} items", outcome.total, backlog);

        let interval = self.resolver.limiter().min_interval();
        let progress_every = self.config.progress_every.max(1);

        for (i, item) in items.iter().enumerate() {
            self.process(item, &mut outcome).await;

            let done = i + 1;
            if done % progress_every == 0 || done == outcome.total {
                let remaining = (outcome.total - done) as u32;
                presenter.status(&outcome.progress(done, interval * remaining)).await;
            }
        }

        tracing::info!(
            "Enrichment complete: {}/{} updated ({:.1}% success rate), {} skipped",
            outcome.updated,
            outcome.processed(),
            outcome.success_rate(),
            outcome.skipped
        );
        Ok(outcome)
    }

    async fn process(&self, item: &CatalogItem, outcome: &mut EnrichmentOutcome) {
        if item.has_placeholder_artist() {
            tracing::debug!("Skipping item {} with placeholder artist", item.id);
            outcome.skipped += 1;
            return;
        }

        let Some(album) = self.resolver.resolve_album(&item.artist, &item.title).await else {
            outcome.not_found += 1;
            return;
        };

        match self.store.update_album(item.id, &album).await {
            Ok(Some(_)) => {
                tracing::info!("Enriched item {}: {}", item.id, album);
                outcome.updated += 1;
            }
            Ok(None) => {
                tracing::warn!("Item {} disappeared before its album could be saved", item.id);
                outcome.not_found += 1;
            }
            Err(e) => {
                tracing::error!("Failed to save album for item {}: {}", item.id, e);
                outcome.not_found += 1;
            }
        }
    }
}
