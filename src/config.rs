//! Application configuration, loaded once at startup and passed by value.
//!
//! Mirrors spec.md §6's configuration table. Loaded via `figment` from the
//! environment (and, optionally, a TOML file pointed to by `CONFIG_PATH`),
//! the same way `Xevion-Banner`'s `App::new()` builds its `Config`.

use std::time::Duration;

use chrono::NaiveDate;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer};

/// Deployment environment. Controls log verbosity and whether admins are
/// pinged on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Dev,
    Prod,
}

impl Environment {
    pub fn default_log_level(self) -> &'static str {
        match self {
            Environment::Local => "debug",
            Environment::Dev => "info",
            Environment::Prod => "warn",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    #[serde(default)]
    pub max_chars: Option<usize>,
}

impl OllamaConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
}

fn default_sslmode() -> String {
    "disable".to_owned()
}

impl PostgresConfig {
    /// Assemble a libpq-style DSN for `sqlx::postgres::PgConnectOptions::from_str`.
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.name, self.sslmode
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub host: String,
    pub port: u16,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub use_ssl: bool,
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    fundu::parse_duration(&raw).map_err(serde::de::Error::custom)
}

fn duration_5s() -> Duration {
    Duration::from_secs(5)
}
fn duration_1h() -> Duration {
    Duration::from_secs(3600)
}
fn duration_24h() -> Duration {
    Duration::from_secs(24 * 3600)
}
fn duration_10m() -> Duration {
    Duration::from_secs(10 * 60)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "duration_5s", deserialize_with = "deserialize_duration")]
    pub poll_interval: Duration,
    #[serde(default = "duration_1h", deserialize_with = "deserialize_duration")]
    pub date_upcoming_in: Duration,
    #[serde(default = "duration_24h", deserialize_with = "deserialize_duration")]
    pub registration_reminder_in: Duration,
    #[serde(default = "duration_10m", deserialize_with = "deserialize_duration")]
    pub invite_reminder_in: Duration,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            poll_interval: duration_5s(),
            date_upcoming_in: duration_1h(),
            registration_reminder_in: duration_24h(),
            invite_reminder_in: duration_10m(),
        }
    }
}

fn default_meeting_date() -> NaiveDate {
    // Preserved from the original implementation's hardcoded scheduling date;
    // surfaced as configuration per spec.md §9's Open Questions.
    NaiveDate::from_ymd_opt(2000, 2, 14).expect("static date is valid")
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub env: Environment,
    pub bot: BotConfig,
    pub ollama: OllamaConfig,
    pub postgres: PostgresConfig,
    pub s3: S3Config,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub admin_ids: Vec<i64>,
    #[serde(default = "default_meeting_date")]
    pub meeting_date: NaiveDate,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from the environment, optionally merging a TOML
    /// file named by `CONFIG_PATH`.
    pub fn load() -> Result<Self, figment::Error> {
        let mut figment = Figment::new();
        if let Ok(path) = std::env::var("CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::raw().split("__")).extract()
    }

    pub fn log_level(&self) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| self.env.default_log_level().to_owned())
    }
}
