//! Logging setup. Mirrors `Xevion-Banner`'s `logging::setup_logging`, minus
//! the custom pretty/JSON formatters (not part of the retrieved teacher
//! sources) — this uses `tracing_subscriber::fmt`'s stock formatters instead.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Configure and install the global tracing subscriber. Must run before any
/// other initialization so startup logs are never silently dropped.
pub fn setup_logging(config: &Config, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.log_level();
        EnvFilter::new(format!("warn,kupid_core={level}"))
    });

    let builder = tracing_subscriber::fmt().with_target(true).with_env_filter(filter);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
