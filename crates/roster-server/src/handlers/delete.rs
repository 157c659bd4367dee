use axum::{
  extract::{Path, State},
  http::StatusCode,
};
use roster_core::cache::Cache;
use roster_service::ContactRepository;

use crate::{AppState, auth::ApiKey, error::ApiError};

pub async fn handler<R, C>(
  State(state): State<AppState<R, C>>,
  _key: ApiKey,
  Path(token): Path<String>,
) -> Result<StatusCode, ApiError>
where
  R: ContactRepository + 'static,
  C: Cache + 'static,
{
  let key = super::classify(&token)?;
  state.service.delete_contact(key, &token).await?;
  Ok(StatusCode::NO_CONTENT)
}
