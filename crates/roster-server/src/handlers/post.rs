//! POST handler: insert or update a contact by email.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use roster_core::{cache::Cache, contact::ContactPayload};
use roster_service::ContactRepository;
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::ApiKey, error::ApiError};

#[derive(Deserialize)]
pub struct Request {
  #[serde(default)]
  pub contact: ContactPayload,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
  pub contact_id: String,
}

pub async fn handler<R, C>(
  State(state): State<AppState<R, C>>,
  _key: ApiKey,
  body: Result<Json<Request>, JsonRejection>,
) -> Result<Json<Response>, ApiError>
where
  R: ContactRepository + 'static,
  C: Cache + 'static,
{
  let Json(Request { contact }) =
    body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  if contact.email.is_empty() {
    return Err(ApiError::NoContactDetails);
  }

  let contact = contact.into_contact()?;
  let contact_id = state.service.add_or_update_contact(contact).await?;
  Ok(Json(Response { contact_id }))
}
