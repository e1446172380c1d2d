//! `kupid-bot`: the long-running service. Reads config from the
//! environment (and `CONFIG_PATH` if set), starts the notifier, and traps
//! SIGINT/SIGTERM for graceful shutdown (spec.md §6).

use std::process::ExitCode;

use clap::Parser;
use kupid_core::app::App;
use kupid_core::config::Config;
use kupid_core::logging::{setup_logging, LogFormat};
use tracing::info;

#[derive(Parser)]
struct Args {
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let early_config = Config::load().expect("failed to load config for logging setup");
    setup_logging(&early_config, args.log_format);

    let mut app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize application");
            return ExitCode::FAILURE;
        }
    };

    info!(version = env!("CARGO_PKG_VERSION"), "starting kupid-bot");

    app.setup_notifier_service();
    app.start_services();
    app.run().await;

    ExitCode::SUCCESS
}
