mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hookwatch_core::EventStore;
use hookwatch_store::{Database, EventRepo};

use crate::config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    hookwatch_telemetry::init_telemetry(&cli.telemetry_config())?;

    let db = match cli.database_path() {
        Some(path) => Database::open(&path)
            .with_context(|| format!("failed to open database at {}", path.display()))?,
        None => {
            tracing::warn!("using in-memory store; events will not survive a restart");
            Database::in_memory().context("failed to open in-memory database")?
        }
    };
    let database = db.path().display().to_string();
    let repo = EventRepo::new(db);
    let stored = repo.count().context("failed to read event log")?;
    tracing::info!(%database, stored, "event log ready");
    let store: Arc<dyn EventStore> = Arc::new(repo);

    let handle = hookwatch_server::start(cli.server_config(), store)
        .await
        .with_context(|| format!("failed to bind {}:{}", cli.host, cli.port))?;

    tracing::info!(port = handle.port, "hookwatch ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl+c")?;

    tracing::info!("shutting down");
    handle.shutdown().await;
    Ok(())
}
