//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Natural-key collision — a user-facing validation error.
  #[error("conflict: {0}")]
  Conflict(String),

  /// Backend unreachable.
  #[error("unavailable: {0}")]
  Unavailable(String),

  /// Recovery mail could not be delivered.
  #[error("delivery failed: {0}")]
  Delivery(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ficha_core::Error> for ApiError {
  fn from(err: ficha_core::Error) -> Self {
    match err {
      ficha_core::Error::DuplicateKey { key, .. } => {
        ApiError::Conflict(format!("el OT-TE {key} ya existe"))
      }
      ficha_core::Error::InvalidOtTe(token) => {
        ApiError::BadRequest(format!("OT-TE inválido: {token}"))
      }
      ficha_core::Error::Connection(msg) => ApiError::Unavailable(msg),
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Delivery(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Internal(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
