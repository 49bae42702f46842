//! Presentation and delivery seams.
//!
//! The bot never talks to a chat transport directly. It renders through a
//! [`Presenter`] and sends audio through a [`DeliveryChannel`]; the CLI
//! ships console implementations and tests use the recording mocks below.

use async_trait::async_trait;

use crate::model::CatalogItem;
use crate::navigation::View;

/// Everything needed to send one catalog item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    /// Channel-side storage reference
    pub external_ref: String,
    pub caption: String,
    pub title: String,
    pub performer: String,
    /// Seconds
    pub duration: Option<i64>,
}

impl AudioAsset {
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            external_ref: item.external_ref.clone(),
            caption: caption(item),
            title: item.title.clone(),
            performer: item.artist.clone(),
            duration: item.duration,
        }
    }
}

/// Caption shown under a delivered item.
pub fn caption(item: &CatalogItem) -> String {
    let mut text = format!("🎵 {}\n👤 Artist: {}\n", item.title, item.artist);
    if let Some(album) = &item.album {
        text.push_str(&format!("💿 Album: {}\n", album));
    }
    if let Some(genre) = &item.genre {
        text.push_str(&format!("🎼 Genre: {}\n", genre));
    }
    if item.duration.is_some() {
        text.push_str(&format!("⏱ Duration: {}\n", item.duration_formatted()));
    }
    text
}

/// Errors sending through a channel
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeliveryError {
    #[error("asset {0} is not available")]
    AssetUnavailable(String),

    #[error("send failed: {0}")]
    Send(String),
}

/// Sends audio items to the user
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send_audio(&self, asset: &AudioAsset) -> Result<(), DeliveryError>;
}

/// Renders views and transient status text
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Render a text body plus button rows.
    async fn show(&self, view: &View);

    /// Replace the current status line (progress updates).
    async fn status(&self, text: &str);
}
