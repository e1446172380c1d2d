//! `matcher`: offline pair solver. Reads the current verified-participant
//! snapshot from the database, runs the pair solver, and writes the result
//! as JSON. Makes no database writes (spec.md §6).

use std::fs;
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use kupid_core::config::Config;
use kupid_core::embedding::ollama::OllamaGateway;
use kupid_core::logging::{setup_logging, LogFormat};
use kupid_core::matching;
use kupid_core::repo::postgres::PgUserRepo;
use kupid_core::repo::UserRepo;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::error;

#[derive(Parser)]
struct Args {
    /// Output file for the JSON match result.
    #[arg(short, long)]
    output: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, LogFormat::Pretty);

    let connect_options = match PgConnectOptions::from_str(&config.postgres.database_url()) {
        Ok(o) => o,
        Err(e) => {
            error!(error = %e, "failed to parse database url");
            return ExitCode::FAILURE;
        }
    };
    let db_pool = match PgPoolOptions::new().max_connections(4).connect_with(connect_options).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "failed to connect to database");
            return ExitCode::FAILURE;
        }
    };

    let users = PgUserRepo::new(db_pool);
    let participants = match users.list_verified().await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "failed to list verified participants");
            return ExitCode::FAILURE;
        }
    };

    let http_client = reqwest::Client::new();
    let embedder = OllamaGateway::new(http_client, config.ollama.base_url(), config.ollama.model.clone(), config.ollama.max_chars);

    let result = match matching::solve(&participants, &embedder).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "pair solver failed");
            return ExitCode::FAILURE;
        }
    };

    let json = match serde_json::to_string_pretty(&result) {
        Ok(j) => j,
        Err(e) => {
            error!(error = %e, "failed to serialize match result");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = fs::write(&args.output, json) {
        error!(error = %e, path = %args.output, "failed to write output file");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        pairs = result.pairs.len(),
        full_matches = result.full_matches.len(),
        unmatched = result.unmatched.len(),
        output = %args.output,
        "pair solver run complete"
    );

    ExitCode::SUCCESS
}
