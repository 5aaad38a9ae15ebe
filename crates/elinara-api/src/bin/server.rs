//! Elinara profile sync server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `ELINARA_*` environment variables, opens the SQLite store, and serves the
//! REST API over HTTP.
//!
//! # Purging corrupted rows once
//!
//! ```
//! cargo run -p elinara-api --bin server -- --purge-corrupted
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use elinara_api::{AppState, ServerConfig};
use elinara_core::sync;
use elinara_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Elinara profile sync server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Delete every profile carrying the placeholder email, print the count,
  /// and exit.
  #[arg(long)]
  purge_corrupted: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let db_path = server_cfg.resolved_database_path();
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  // Maintenance mode: one-shot cleanup and exit.
  if cli.purge_corrupted {
    let purged = sync::purge_corrupted(&store)
      .await
      .context("failed to purge corrupted profiles")?;
    println!("{purged}");
    return Ok(());
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState {
    store:  Arc::new(store),
    config: Arc::new(server_cfg),
  };
  let app = elinara_api::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
