//! Application state shared across components (bot, notifier).

use std::sync::Arc;

use sqlx::PgPool;

use crate::blob::BlobStore;
use crate::chat::ChatAdapter;
use crate::config::Config;
use crate::embedding::EmbeddingGateway;
use crate::feedback::FeedbackRepo;
use crate::repo::{MeetingRepo, PlaceRepo, SettingsRepo, UserMessageRepo, UserRepo};

/// Everything a use-case handler needs, wired once at startup and cloned
/// (cheaply, behind `Arc`) into every task.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: PgPool,
    pub users: Arc<dyn UserRepo>,
    pub places: Arc<dyn PlaceRepo>,
    pub meetings: Arc<dyn MeetingRepo>,
    pub user_messages: Arc<dyn UserMessageRepo>,
    pub settings: Arc<dyn SettingsRepo>,
    pub feedback: Arc<dyn FeedbackRepo>,
    pub embedder: Arc<dyn EmbeddingGateway>,
    pub chat: Arc<dyn ChatAdapter>,
    pub blob: Arc<dyn BlobStore>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<Config>,
        db_pool: PgPool,
        users: Arc<dyn UserRepo>,
        places: Arc<dyn PlaceRepo>,
        meetings: Arc<dyn MeetingRepo>,
        user_messages: Arc<dyn UserMessageRepo>,
        settings: Arc<dyn SettingsRepo>,
        feedback: Arc<dyn FeedbackRepo>,
        embedder: Arc<dyn EmbeddingGateway>,
        chat: Arc<dyn ChatAdapter>,
        blob: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            config,
            db_pool,
            users,
            places,
            meetings,
            user_messages,
            settings,
            feedback,
            embedder,
            chat,
            blob,
        }
    }

    /// Whether registration is currently closed, per the `registration_closed`
    /// setting (spec.md §4.9). Defaults to open if unset.
    pub async fn registration_closed(&self) -> Result<bool, crate::error::RepoError> {
        Ok(self.settings.get(crate::gate::setting_key()).await?.as_deref() == Some("true"))
    }
}
