//! HTTP transport for Roster.
//!
//! Exposes an axum [`Router`] over a [`ContactService`]. Every route requires
//! an `autopilotapikey` header resolving to a known contact.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use roster_core::cache::Cache;
use roster_service::{ContactRepository, ContactService};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// Redis URL. Without one the server caches in process memory.
  #[serde(default)]
  pub cache_url:            Option<String>,
  /// Upper bound on how long a cache entry may be served. Absent or `0`
  /// means entries do not expire.
  #[serde(default)]
  pub cache_ttl_secs:       Option<u64>,
  /// AES-256 key as 64 hex characters.
  pub encryption_key:       String,
  #[serde(default = "default_operation_timeout_ms")]
  pub operation_timeout_ms: u64,
  #[serde(default = "default_connect_timeout_ms")]
  pub connect_timeout_ms:   u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_operation_timeout_ms() -> u64 { 5_000 }
fn default_connect_timeout_ms() -> u64 { 10_000 }

impl ServerConfig {
  pub fn operation_timeout(&self) -> Duration {
    Duration::from_millis(self.operation_timeout_ms)
  }

  pub fn connect_timeout(&self) -> Duration {
    Duration::from_millis(self.connect_timeout_ms)
  }

  pub fn cache_ttl(&self) -> Option<Duration> {
    self.cache_ttl_secs.filter(|s| *s > 0).map(Duration::from_secs)
  }
}

// The `Debug` output must not leak the encryption key.
impl std::fmt::Debug for ServerConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ServerConfig")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("store_path", &self.store_path)
      .field("cache_url", &self.cache_url)
      .field("cache_ttl_secs", &self.cache_ttl_secs)
      .field("encryption_key", &"<redacted>")
      .field("operation_timeout_ms", &self.operation_timeout_ms)
      .field("connect_timeout_ms", &self.connect_timeout_ms)
      .finish()
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<R, C> {
  pub service: Arc<ContactService<R, C>>,
}

impl<R, C> Clone for AppState<R, C> {
  fn clone(&self) -> Self { Self { service: Arc::clone(&self.service) } }
}

impl<R, C> AppState<R, C> {
  pub fn new(service: ContactService<R, C>) -> Self {
    Self { service: Arc::new(service) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the contact API.
pub fn router<R, C>(state: AppState<R, C>) -> Router
where
  R: ContactRepository + 'static,
  C: Cache + 'static,
{
  Router::new()
    .route("/v1/contact", axum::routing::post(handlers::post::handler::<R, C>))
    .route(
      "/v1/contact/{contact_id_or_email}",
      get(handlers::get::handler::<R, C>).delete(handlers::delete::handler::<R, C>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
