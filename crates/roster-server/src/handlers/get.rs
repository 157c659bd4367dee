//! GET handler for a single contact.

use axum::{
  Json,
  extract::{Path, State},
};
use roster_core::{cache::Cache, contact::Contact};
use roster_service::ContactRepository;

use crate::{AppState, auth::ApiKey, error::ApiError};

pub async fn handler<R, C>(
  State(state): State<AppState<R, C>>,
  _key: ApiKey,
  Path(token): Path<String>,
) -> Result<Json<Contact>, ApiError>
where
  R: ContactRepository + 'static,
  C: Cache + 'static,
{
  let key = super::classify(&token)?;
  let contact = state.service.get_one_contact(key, &token).await?;
  Ok(Json(contact))
}
