//! Bot router.
//!
//! [`Services`] holds the process-wide singletons (store, token cache, rate
//! limiter, resolver, admin list), built once at startup. [`Bot`] maps each
//! inbound event onto a handler and renders the result through a
//! [`Presenter`]; the transport in front of it only has to produce
//! [`Inbound`] events.

use std::sync::Arc;

use crate::channel::{DeliveryChannel, Presenter};
use crate::config::Config;
use crate::db::RecordStore;
use crate::delivery::BulkDelivery;
use crate::enrichment::{EnrichmentJob, MetadataResolver, RateLimiter};
use crate::error::{self, Result};
use crate::model::CatalogStats;
use crate::navigation::{NavigationEngine, Outcome, TokenCache, View};
use crate::upload::{AdminList, AudioUpload, UploadIntake};

/// Something a user did
#[derive(Debug, Clone)]
pub enum Inbound {
    /// A command or a search query
    Text { user_id: i64, text: String },
    /// A pressed button
    Action { user_id: i64, id: String },
    Upload(AudioUpload),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Artists,
    Stats,
    AlbumStats,
    Upload,
    EnrichAll,
}

impl Command {
    /// Parse `/name` or `/name@botname`, ignoring arguments.
    pub fn parse(text: &str) -> Option<Command> {
        let word = text.trim().strip_prefix('/')?.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word);
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "artists" => Some(Command::Artists),
            "stats" => Some(Command::Stats),
            "album_stats" => Some(Command::AlbumStats),
            "upload" => Some(Command::Upload),
            "enrich_all" => Some(Command::EnrichAll),
            _ => None,
        }
    }
}

/// Singleton services shared by every handler
#[derive(Clone)]
pub struct Services {
    pub config: Arc<Config>,
    pub store: Arc<dyn RecordStore>,
    pub tokens: Arc<TokenCache>,
    pub resolver: Arc<MetadataResolver>,
    pub admins: Arc<AdminList>,
}

impl Services {
    pub fn new(
        config: Config,
        store: Arc<dyn RecordStore>,
        resolver: Arc<MetadataResolver>,
        admins: AdminList,
    ) -> Self {
        Self {
            tokens: Arc::new(TokenCache::from_config(&config.navigation)),
            config: Arc::new(config),
            store,
            resolver,
            admins: Arc::new(admins),
        }
    }

    /// Production wiring: real providers behind one rate limiter.
    pub fn from_config(
        config: Config,
        store: Arc<dyn RecordStore>,
        admin_env: Option<&str>,
    ) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::new(config.metadata.min_interval()));
        let resolver = Arc::new(MetadataResolver::from_config(&config.metadata, limiter)?);
        let admins = AdminList::from_config(&config.bot, admin_env);
        tracing::info!("{} admin(s) configured", admins.len());
        Ok(Self::new(config, store, resolver, admins))
    }
}

pub struct Bot {
    services: Services,
    engine: NavigationEngine,
    delivery: BulkDelivery,
    job: EnrichmentJob,
    intake: UploadIntake,
}

impl Bot {
    pub fn new(services: Services, channel: Arc<dyn DeliveryChannel>) -> Self {
        let config = services.config.clone();
        Self {
            engine: NavigationEngine::new(services.store.clone(), services.tokens.clone(), &config),
            delivery: BulkDelivery::new(channel, config.delivery.clone()),
            job: EnrichmentJob::new(
                services.store.clone(),
                services.resolver.clone(),
                config.enrichment.clone(),
            ),
            intake: UploadIntake::new(
                services.store.clone(),
                services.resolver.clone(),
                services.admins.clone(),
                config.metadata.auto_fetch_album,
            ),
            services,
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn engine(&self) -> &NavigationEngine {
        &self.engine
    }

    pub async fn handle(&self, event: Inbound, presenter: &dyn Presenter) {
        match event {
            Inbound::Text { user_id, text } => {
                if text.trim_start().starts_with('/') {
                    match Command::parse(&text) {
                        Some(command) => self.handle_command(command, user_id, presenter).await,
                        None => {
                            presenter
                                .show(&View::text("❓ Unknown command. Use /help to see what I can do."))
                                .await
                        }
                    }
                } else {
                    tracing::info!("User {} searching for: {}", user_id, text.trim());
                    let outcome = self.engine.search(&text).await;
                    self.render(outcome, presenter).await;
                }
            }
            Inbound::Action { user_id, id } => {
                tracing::debug!("User {} pressed {}", user_id, id);
                let outcome = self.engine.handle_action(&id).await;
                self.render(outcome, presenter).await;
            }
            Inbound::Upload(upload) => match self.intake.intake(&upload, presenter).await {
                Ok(outcome) => presenter.show(&View::text(outcome.message())).await,
                Err(e) => {
                    tracing::error!("Error processing upload {}: {}", upload.external_ref, e);
                    presenter
                        .show(&View::text(error::user_message(&e, "processing track")))
                        .await;
                }
            },
        }
    }

    async fn handle_command(&self, command: Command, user_id: i64, presenter: &dyn Presenter) {
        tracing::debug!("User {} ran {:?}", user_id, command);
        let is_admin = self.services.admins.is_admin(user_id);

        match command {
            Command::Start => presenter.show(&View::text(self.greeting())).await,
            Command::Help => presenter.show(&View::text(help_text(is_admin))).await,
            Command::Artists => {
                let outcome = self.engine.artists(0).await;
                self.render(outcome, presenter).await;
            }
            Command::Stats | Command::AlbumStats => {
                let text = match self.services.store.stats().await {
                    Ok(stats) if command == Command::Stats => stats_text(&stats),
                    Ok(stats) => album_stats_text(&stats, is_admin),
                    Err(e) => {
                        tracing::error!("Error getting stats: {}", e);
                        error::user_message(&e.into(), "loading statistics")
                    }
                };
                presenter.show(&View::text(text)).await;
            }
            Command::Upload => {
                let text = if is_admin {
                    "📤 Send audio files to add them to the catalog.\n\n\
                     Files with artist/title tags get their album looked up automatically."
                } else {
                    tracing::warn!("Unauthorized /upload attempt by user {}", user_id);
                    ACCESS_DENIED
                };
                presenter.show(&View::text(text)).await;
            }
            Command::EnrichAll => self.enrich_all(user_id, is_admin, presenter).await,
        }
    }

    async fn enrich_all(&self, user_id: i64, is_admin: bool, presenter: &dyn Presenter) {
        if !is_admin {
            tracing::warn!("Unauthorized /enrich_all attempt by user {}", user_id);
            presenter.show(&View::text(ACCESS_DENIED)).await;
            return;
        }

        if !self.services.resolver.has_providers() {
            presenter
                .show(&View::text(
                    "❌ Metadata providers are disabled\n\nEnable one in the [metadata] config section.",
                ))
                .await;
            return;
        }

        presenter
            .status("🔄 Starting metadata enrichment...\n\n⏳ This may take several minutes.")
            .await;

        let text = match self.job.run(presenter).await {
            Ok(outcome) => outcome.report(),
            Err(e) => {
                tracing::error!("Error in bulk metadata enrichment: {}", e);
                error::user_message(&e, "metadata enrichment")
            }
        };
        presenter.show(&View::text(text)).await;
    }

    async fn render(&self, outcome: Outcome, presenter: &dyn Presenter) {
        match outcome {
            Outcome::Show(view) => presenter.show(&view).await,
            Outcome::Deliver(item) => {
                if let Err(e) = self.delivery.deliver_one(&item).await {
                    tracing::error!("Error sending item {}: {}", item.id, e);
                    presenter
                        .show(&View::text(format!(
                            "❌ Error sending track.\nTrack ID: {}\nTitle: {}",
                            item.id, item.title
                        )))
                        .await;
                }
            }
            Outcome::DeliverMany { label, items } => {
                self.delivery.deliver_all(&label, &items, presenter).await;
            }
            Outcome::Ack => {}
        }
    }

    fn greeting(&self) -> String {
        format!(
            "👋 Welcome to {}!\n\n\
             Send me an artist, album or track name to search.\n\
             Use /artists to browse and /help for all commands.",
            self.services.config.bot.name
        )
    }
}

const ACCESS_DENIED: &str =
    "⛔️ Access Denied\n\nThis command is only available to administrators.";

fn help_text(is_admin: bool) -> String {
    let mut text = String::from(
        "🎵 How to use:\n\n\
         • Send any text to search by title, artist or album\n\
         /artists - browse all artists\n\
         /stats - catalog statistics\n\
         /album_stats - album coverage\n",
    );
    if is_admin {
        text.push_str(
            "\n🔧 Admin:\n\
             /upload - how to add tracks\n\
             /enrich_all - fetch missing album info\n",
        );
    }
    text
}

fn stats_text(stats: &CatalogStats) -> String {
    format!(
        "📊 Catalog statistics\n\n\
         🎵 Total tracks: {}\n\
         👤 Unique artists: {}\n\
         💿 Albums: {}\n\
         🎼 Genres: {}\n\
         📅 Last upload: {}",
        stats.total_items,
        stats.unique_artists,
        stats.unique_albums,
        stats.genres,
        stats.last_upload.as_deref().unwrap_or("never")
    )
}

fn album_stats_text(stats: &CatalogStats, is_admin: bool) -> String {
    let mut text = format!(
        "📊 Album Coverage Statistics\n\n\
         🎵 Total tracks: {}\n\
         💿 With album: {}\n\
         ❓ Without album: {}\n\n\
         📈 Coverage: {:.1}%\n\n",
        stats.total_items,
        stats.total_items - stats.missing_album,
        stats.missing_album,
        stats.album_coverage()
    );

    if stats.missing_album == 0 {
        text.push_str("✅ All tracks have album information!");
    } else if is_admin {
        text.push_str("💡 Use /enrich_all to automatically fetch missing album info");
    } else {
        text.push_str("💡 Ask an admin to run /enrich_all to fetch missing album info");
    }
    text
}
