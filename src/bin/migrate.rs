//! `migrate`: applies schema migrations from `migrations/` against
//! `DATABASE_URL` (spec.md §6).

use std::process::ExitCode;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            error!("DATABASE_URL is not set");
            return ExitCode::FAILURE;
        }
    };

    let connect_options = match PgConnectOptions::from_str(&database_url) {
        Ok(o) => o.log_statements(tracing::log::LevelFilter::Debug),
        Err(e) => {
            error!(error = %e, "failed to parse DATABASE_URL");
            return ExitCode::FAILURE;
        }
    };

    let pool = match PgPoolOptions::new().max_connections(2).connect_with(connect_options).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "failed to connect to database");
            return ExitCode::FAILURE;
        }
    };

    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(()) => {
            info!("migrations applied successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "migration failed");
            ExitCode::FAILURE
        }
    }
}
