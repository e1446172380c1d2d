//! Wires configuration, database, and every repository/gateway into a
//! single [`AppState`], then registers and runs the long-lived services
//! (currently just the notifier). The chat transport itself is an external
//! collaborator (spec.md §1) — [`crate::chat::LoggingChatAdapter`] stands in
//! until a real adapter is wired up.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;
use tokio::sync::broadcast;
use tracing::info;

use crate::blob::UnconfiguredBlobStore;
use crate::chat::LoggingChatAdapter;
use crate::config::Config;
use crate::embedding::ollama::OllamaGateway;
use crate::error::CoreError;
use crate::notifier::Notifier;
use crate::rand_source::SystemRandom;
use crate::repo::postgres::{PgFeedbackRepo, PgMeetingRepo, PgPlaceRepo, PgSettingsRepo, PgUserMessageRepo, PgUserRepo};
use crate::service::{Service, ServiceManager};
use crate::state::AppState;
use crate::usecase::{MatchingCycle, MatchingCycleSummary};

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

pub struct App {
    config: Arc<Config>,
    state: AppState,
    service_manager: ServiceManager,
}

impl App {
    pub async fn new() -> Result<Self, anyhow::Error> {
        let config = Config::load().context("failed to load config")?;

        let connect_options = PgConnectOptions::from_str(&config.postgres.database_url())
            .context("failed to parse database url")?
            .log_statements(tracing::log::LevelFilter::Debug);

        let db_pool = PgPoolOptions::new()
            .min_connections(0)
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(connect_options)
            .await
            .context("failed to create database pool")?;

        info!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("failed to run database migrations")?;

        let http_client = reqwest::Client::builder()
            .build()
            .context("failed to build http client")?;
        let embedder = Arc::new(OllamaGateway::new(
            http_client,
            config.ollama.base_url(),
            config.ollama.model.clone(),
            config.ollama.max_chars,
        ));

        let users = Arc::new(PgUserRepo::new(db_pool.clone()));
        let places = Arc::new(PgPlaceRepo::new(db_pool.clone()));
        let meetings = Arc::new(PgMeetingRepo::new(db_pool.clone()));
        let user_messages = Arc::new(PgUserMessageRepo::new(db_pool.clone()));
        let settings = Arc::new(PgSettingsRepo::new(db_pool.clone()));
        let feedback = Arc::new(PgFeedbackRepo::new(db_pool.clone()));

        let config = Arc::new(config);
        let state = AppState::new(
            config.clone(),
            db_pool,
            users,
            places,
            meetings,
            user_messages,
            settings,
            feedback,
            embedder,
            Arc::new(LoggingChatAdapter),
            Arc::new(UnconfiguredBlobStore),
        );

        Ok(App {
            config,
            state,
            service_manager: ServiceManager::new(),
        })
    }

    pub fn setup_notifier_service(&mut self) {
        let notifications = &self.config.notifications;
        let notifier = Notifier::new(
            self.state.meetings.clone(),
            self.state.users.clone(),
            self.state.chat.clone(),
            notifications.poll_interval,
            notifications.date_upcoming_in,
            notifications.registration_reminder_in,
            notifications.invite_reminder_in,
        );
        self.service_manager.register_service("notifier", Box::new(NotifierService(notifier)));
    }

    pub fn start_services(&mut self) {
        self.service_manager.spawn_all();
    }

    pub async fn run(self) {
        self.service_manager.run_until_shutdown(SHUTDOWN_GRACE_PERIOD).await;
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Admin-triggered matching cycle: pair solver → scheduler → meeting
    /// store (spec.md §4.4: "admin → pair solver → meeting scheduler →
    /// meeting store"). Grounded in
    /// `original_source/internal/usecase/matching.go`'s `RunMatch` and
    /// `internal/usecase/meeting.go`'s `CreateMeetings`; a one-shot task, not
    /// a long-running `Service`.
    pub async fn run_matching_cycle(&self) -> Result<MatchingCycleSummary, CoreError> {
        let cycle = MatchingCycle::new(
            self.state.users.clone(),
            self.state.places.clone(),
            self.state.meetings.clone(),
            self.state.embedder.clone(),
        );
        let rng = SystemRandom::default();
        let summary = cycle.run(self.config.meeting_date, &rng).await?;

        let message = format!(
            "Matching cycle complete: {} pairs, {} full matches, {} unmatched, {} scheduled ({} via fallback).",
            summary.pairs_created, summary.full_matches_created, summary.unmatched, summary.scheduled, summary.fallback_scheduled
        );
        for admin_ext_id in &self.config.admin_ids {
            if let Err(e) = self.state.chat.send(*admin_ext_id, &message, None).await {
                tracing::warn!(error = %e, ext_id = admin_ext_id, "matching cycle summary send failed");
            }
        }

        Ok(summary)
    }
}

struct NotifierService(Notifier);

#[async_trait::async_trait]
impl Service for NotifierService {
    async fn run(self: Box<Self>, shutdown_rx: broadcast::Receiver<()>) {
        self.0.run(shutdown_rx).await;
    }
}
