//! carrera server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! participant store and serves the registration API over HTTP.
//!
//! ```text
//! carrera init-db     # create the database and schema, then exit
//! carrera serve       # the default
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use carrera_server::{ServerConfig, app};
use carrera_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Carrera del Médico registration server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Default)]
enum Command {
  /// Create the database file, its directory and the schema, then exit.
  InitDb,
  /// Start the HTTP listener.
  #[default]
  Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("invalid configuration in {:?}", cli.config))?;
  let store_path = server_cfg.resolved_store_path();

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or_default() {
    Command::InitDb => {
      info!(path = %store_path.display(), "database initialised");
      Ok(())
    }
    Command::Serve => serve(&server_cfg, store).await,
  }
}

async fn serve(server_cfg: &ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let app = app(server_cfg, store);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  info!(
    capacity = server_cfg.capacity,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
}
