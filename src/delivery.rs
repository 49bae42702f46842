//! Bulk delivery - sends many items one after another.
//!
//! Sends are sequential. A failed item is logged and counted but never stops
//! the run. The presenter gets a progress line every `progress_every` items
//! and a summary at the end; a short pause every `pause_every` items keeps
//! the channel's flood limits happy.

use std::sync::Arc;

use crate::channel::{AudioAsset, DeliveryChannel, DeliveryError, Presenter};
use crate::config::DeliveryConfig;
use crate::model::CatalogItem;

/// Totals of one bulk run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn summary(&self) -> String {
        format!(
            "✅ Done!\n\n📊 Total: {}\n✅ Sent: {}\n❌ Failed: {}",
            self.total, self.sent, self.failed
        )
    }
}

pub struct BulkDelivery {
    channel: Arc<dyn DeliveryChannel>,
    config: DeliveryConfig,
}

impl BulkDelivery {
    pub fn new(channel: Arc<dyn DeliveryChannel>, config: DeliveryConfig) -> Self {
        Self { channel, config }
    }

    /// Send a single item with its caption.
    pub async fn deliver_one(&self, item: &CatalogItem) -> Result<(), DeliveryError> {
        self.channel.send_audio(&AudioAsset::from_item(item)).await?;
        tracing::info!("Item sent: {} - {}", item.id, item.title);
        Ok(())
    }

    /// Send every item in order, reporting progress through `presenter`.
    pub async fn deliver_all(
        &self,
        label: &str,
        items: &[CatalogItem],
        presenter: &dyn Presenter,
    ) -> DeliveryReport {
        let mut report = DeliveryReport {
            total: items.len(),
            ..Default::default()
        };

        presenter
            .status(&format!("📤 Sending {} tracks: {}", report.total, label))
            .await;
        tracing::info!("Bulk delivery of {} items started: {}", report.total, label);

        let progress_every = self.config.progress_every.max(1);
        let pause_every = self.config.pause_every.max(1);

        for (i, item) in items.iter().enumerate() {
            let done = i + 1;

            match self.deliver_one(item).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("Failed to send item {} ({}): {}", item.id, item.external_ref, e);
                }
            }

            if done % progress_every == 0 && done < report.total {
                presenter
                    .status(&format!("📤 Sending... {}/{}", done, report.total))
                    .await;
            }

            if done % pause_every == 0 && done < report.total {
                tokio::time::sleep(self.config.pause()).await;
            }
        }

        presenter.status(&report.summary()).await;
        tracing::info!(
            "Bulk delivery finished: {}/{} sent, {} failed",
            report.sent,
            report.total,
            report.failed
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mocks::{RecordingChannel, RecordingPresenter};
    use crate::test_utils::mock_item;
    use std::time::Duration;
    use tokio::time::Instant;

    fn items(n: i64) -> Vec<CatalogItem> {
        (1..=n).map(|i| mock_item(i, &format!("Song {}", i), "Artist", None)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivers_all_in_order() {
        let channel = Arc::new(RecordingChannel::default());
        let delivery = BulkDelivery::new(channel.clone(), DeliveryConfig::default());
        let presenter = RecordingPresenter::default();

        let report = delivery.deliver_all("Artist", &items(4), &presenter).await;

        assert_eq!(report, DeliveryReport { total: 4, sent: 4, failed: 0 });
        assert_eq!(channel.sent_refs(), vec!["ref-1", "ref-2", "ref-3", "ref-4"]);
        assert!(presenter.last_status().unwrap().contains("Sent: 4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_counted_not_fatal() {
        let channel = Arc::new(RecordingChannel::failing_on(&["ref-2"]));
        let delivery = BulkDelivery::new(channel.clone(), DeliveryConfig::default());
        let presenter = RecordingPresenter::default();

        let report = delivery.deliver_all("Artist", &items(3), &presenter).await;

        assert_eq!(report, DeliveryReport { total: 3, sent: 2, failed: 1 });
        assert_eq!(channel.sent_refs(), vec!["ref-1", "ref-3"]);
        assert!(presenter.last_status().unwrap().contains("Failed: 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_between_groups_but_not_after_last() {
        let channel = Arc::new(RecordingChannel::default());
        let delivery = BulkDelivery::new(channel, DeliveryConfig::default());
        let presenter = RecordingPresenter::default();

        let start = Instant::now();
        delivery.deliver_all("x", &items(6), &presenter).await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));

        let start = Instant::now();
        delivery.deliver_all("x", &items(7), &presenter).await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_every_five() {
        let channel = Arc::new(RecordingChannel::default());
        let delivery = BulkDelivery::new(channel, DeliveryConfig::default());
        let presenter = RecordingPresenter::default();

        delivery.deliver_all("x", &items(11), &presenter).await;

        let statuses = presenter.statuses.lock().clone();
        let progress: Vec<_> = statuses.iter().filter(|s| s.contains("Sending...")).collect();
        assert_eq!(progress, vec!["📤 Sending... 5/11", "📤 Sending... 10/11"]);
        assert_eq!(statuses.len(), 4);
    }
}
