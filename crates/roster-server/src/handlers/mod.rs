//! Route handlers, one module per method.

pub mod delete;
pub mod get;
pub mod post;

use roster_core::contact::LookupKey;

use crate::error::ApiError;

/// Decide whether a path token names a contact by email or by contact id.
fn classify(token: &str) -> Result<LookupKey, ApiError> {
  LookupKey::classify(token).ok_or_else(|| {
    tracing::info!(token, "unrecognised contact_id_or_email");
    ApiError::InvalidToken
  })
}
