//! Error types and axum `IntoResponse` implementation.
//!
//! Every failure leaves the server as `{"error": <reason>, "message": <text>}`
//! with the reason phrase of its status code.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("No autopilotapikey header provided.")]
  MissingApiKey,
  #[error("Provided autopilotapikey not valid.")]
  InvalidApiKey,
  #[error("Invalid contact_id_or_email value provided.")]
  InvalidToken,
  #[error("Contact could not be found.")]
  NotFound,
  #[error("No contact details provided.")]
  NoContactDetails,
  #[error("{0}")]
  BadRequest(String),
  #[error("{0}")]
  Internal(#[source] roster_core::Error),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::MissingApiKey
      | Self::InvalidToken
      | Self::NoContactDetails
      | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::InvalidApiKey => StatusCode::UNAUTHORIZED,
      Self::NotFound => StatusCode::NOT_FOUND,
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    match e {
      roster_core::Error::NotFound => Self::NotFound,
      roster_core::Error::InvalidKey(_) => Self::InvalidToken,
      e if e.is_invalid_input() => Self::BadRequest(e.to_string()),
      e => Self::Internal(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if let Self::Internal(e) = &self {
      tracing::error!(error = %e, "request failed");
    }
    let body = json!({
      "error":   status.canonical_reason().unwrap_or("Internal Server Error"),
      "message": self.to_string(),
    });
    (status, Json(body)).into_response()
  }
}
