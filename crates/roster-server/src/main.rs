//! roster server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `ROSTER_*` environment variables, opens the SQLite store and the cache, and
//! serves the contact API over HTTP.
//!
//! # API key provisioning
//!
//! To issue a key for a contact:
//!
//! ```
//! cargo run -p roster-server --bin server -- --provision-api-key person_AP2-…
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use rand_core::{OsRng, RngCore};
use roster_cache::CacheBackend;
use roster_core::crypto::Cipher;
use roster_server::{AppState, ServerConfig};
use roster_service::{ContactRepository, ContactService, Repository};
use roster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster contact API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Generate an API key for the given contact id, store it, print it and
  /// exit.
  #[arg(long, value_name = "CONTACT_ID")]
  provision_api_key: Option<String>,
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ROSTER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  tracing::debug!(config = ?server_cfg, "configuration loaded");

  let cipher = Cipher::from_hex(&server_cfg.encryption_key)
    .context("invalid encryption_key")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open_with_deadline(&store_path, server_cfg.connect_timeout())
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let repository = Repository::new(store, cipher, server_cfg.operation_timeout());

  // Helper mode: issue an API key and exit.
  if let Some(contact_id) = cli.provision_api_key {
    let api_key = generate_api_key();
    repository
      .provision_api_key(&api_key, &contact_id)
      .await
      .context("failed to store API key")?;
    println!("{api_key}");
    return Ok(());
  }

  let cache = CacheBackend::connect(
    server_cfg.cache_url.as_deref(),
    server_cfg.cache_ttl(),
    server_cfg.connect_timeout(),
  )
  .await
  .context("failed to connect to cache")?;

  let service = ContactService::new(repository, cache, server_cfg.operation_timeout());
  let app = roster_server::router(AppState::new(service));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

/// 16 random bytes, hex-encoded.
fn generate_api_key() -> String {
  let mut bytes = [0u8; 16];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
