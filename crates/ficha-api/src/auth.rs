//! Login and recovery-code handlers.

use axum::{Json, extract::State};
use serde::Deserialize;

use ficha_core::user::Verification;
use ficha_service::auth::verify;

use crate::{AppState, error::ApiError};

#[derive(Deserialize)]
pub struct LoginRequest {
  pub username: String,
  pub password: String,
}

pub async fn login(
  State(state): State<AppState>,
  Json(req): Json<LoginRequest>,
) -> Json<Verification> {
  Json(verify(&state.usuarios, &req.username, &req.password).await)
}

#[derive(Deserialize)]
pub struct RecoveryRequest {
  pub username: String,
  pub email:    String,
}

pub async fn recovery_request(
  State(state): State<AppState>,
  Json(req): Json<RecoveryRequest>,
) -> Result<axum::http::StatusCode, ApiError> {
  state
    .recovery
    .issue_and_send(&state.mail, &req.username, &req.email)
    .await
    .map_err(|e| ApiError::Delivery(e.to_string()))?;
  Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ValidateRequest {
  pub username: String,
  pub code:     String,
}

pub async fn recovery_validate(
  State(state): State<AppState>,
  Json(req): Json<ValidateRequest>,
) -> Json<serde_json::Value> {
  let valid = state.recovery.validate(&req.username, &req.code);
  Json(serde_json::json!({ "valid": valid }))
}
