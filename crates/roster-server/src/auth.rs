//! API-key authentication extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use roster_core::cache::Cache;
use roster_service::ContactRepository;

use crate::{AppState, error::ApiError};

pub const API_KEY_HEADER: &str = "autopilotapikey";

/// Present in a handler means the request carried a known API key.
#[derive(Debug)]
pub struct ApiKey {
  /// The contact the key was provisioned for.
  pub contact_id: String,
}

impl<R, C> FromRequestParts<AppState<R, C>> for ApiKey
where
  R: ContactRepository + 'static,
  C: Cache + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<R, C>,
  ) -> Result<Self, Self::Rejection> {
    let key = parts
      .headers
      .get(API_KEY_HEADER)
      .and_then(|v| v.to_str().ok())
      .filter(|v| !v.is_empty())
      .ok_or(ApiError::MissingApiKey)?;

    match state.service.get_contact_id_by_api_key(key).await {
      Ok(contact_id) => Ok(ApiKey { contact_id }),
      Err(e) if e.is_not_found() => Err(ApiError::InvalidApiKey),
      Err(e) => Err(ApiError::Internal(e)),
    }
  }
}
