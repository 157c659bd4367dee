//! Error type for `roster-store-sqlite`.

use std::time::Duration;

use roster_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A write would break a uniqueness constraint (duplicate email, contact id
  /// or API key).
  #[error("uniqueness constraint violated: {0}")]
  Conflict(String),

  #[error("stored document is not a JSON object")]
  NotAnObject,

  #[error("invalid document field name: {0:?}")]
  InvalidField(String),

  #[error("timed out opening store after {0:?}")]
  ConnectTimeout(Duration),
}

impl Error {
  /// Classify an error raised by a write, separating constraint violations
  /// from other database failures.
  pub(crate) fn from_write(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, msg))
        if code.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Self::Conflict(msg.unwrap_or_else(|| code.to_string()))
      }
      other => Self::Database(other),
    }
  }
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool { matches!(self, Self::Conflict(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
