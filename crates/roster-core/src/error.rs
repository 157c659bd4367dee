//! Error types for `roster-core`.
//!
//! [`Error`] is the error every layer above the adapters speaks: the
//! repository, the service and (through it) the transport.

use thiserror::Error;

use crate::{crypto::CryptoError, store::StoreError};

#[derive(Debug, Error)]
pub enum Error {
  /// The store holds no document matching the lookup.
  #[error("contact not found")]
  NotFound,

  /// The caller asked for a lookup-key kind other than `contactid`/`email`.
  #[error("invalid lookup key: {0:?}")]
  InvalidKey(String),

  #[error("{field}: {source}")]
  Crypto {
    field:  &'static str,
    #[source]
    source: CryptoError,
  },

  /// Unrecognised or missing type tag on a custom field.
  #[error("unknown custom field type in {key:?}")]
  FieldType { key: String },

  #[error("custom field {key:?}: {reason}")]
  FieldValue { key: String, reason: String },

  #[error("custom field {0:?} given more than once")]
  DuplicateField(String),

  #[error("cache error: {0}")]
  Cache(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A write collided with an existing contact id, email or API key.
  #[error("store conflict: {0}")]
  Conflict(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("{operation} timed out")]
  Timeout { operation: &'static str },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound) }

  /// Whether this error comes from a malformed contact payload rather than
  /// from the system.
  pub fn is_invalid_input(&self) -> bool {
    matches!(
      self,
      Self::FieldType { .. } | Self::FieldValue { .. } | Self::DuplicateField(_)
    )
  }

  pub fn is_conflict(&self) -> bool { matches!(self, Self::Conflict(_)) }

  pub fn store(e: impl StoreError) -> Self {
    if e.is_conflict() {
      Self::Conflict(Box::new(e))
    } else {
      Self::Store(Box::new(e))
    }
  }

  pub fn cache(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Cache(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
