//! Draft load/save/delete handlers.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::Deserialize;

use ficha_core::draft::{Draft, DraftData, DraftStore as _};

use crate::{AppState, error::ApiError, parse_category};

#[derive(Deserialize)]
pub struct DraftQuery {
  pub usuario: String,
}

pub async fn load(
  State(state): State<AppState>,
  Path(category): Path<String>,
  Query(query): Query<DraftQuery>,
) -> Result<Json<Draft>, ApiError> {
  let category = parse_category(&category)?;
  let draft = state
    .drafts
    .load(&query.usuario, category)
    .await
    .map_err(ApiError::from)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("sin borrador para {}", query.usuario))
    })?;
  Ok(Json(draft))
}

#[derive(Deserialize)]
pub struct SaveDraftRequest {
  pub usuario: String,
  #[serde(flatten)]
  pub data:    DraftData,
}

/// Upsert the caller's draft. Mirrors the storage contract: the response
/// says whether the save took, and a backend failure is `saved: false`
/// rather than an error status.
pub async fn save(
  State(state): State<AppState>,
  Path(category): Path<String>,
  Json(req): Json<SaveDraftRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
  let category = parse_category(&category)?;
  let saved = match state.drafts.save(&req.usuario, category, &req.data).await {
    Ok(()) => true,
    Err(e) => {
      tracing::warn!("draft save for {} failed: {e}", req.usuario);
      false
    }
  };
  Ok(Json(serde_json::json!({ "saved": saved })))
}

pub async fn discard(
  State(state): State<AppState>,
  Path(category): Path<String>,
  Query(query): Query<DraftQuery>,
) -> Result<StatusCode, ApiError> {
  let category = parse_category(&category)?;
  state
    .drafts
    .delete(&query.usuario, category)
    .await
    .map_err(ApiError::from)?;
  Ok(StatusCode::NO_CONTENT)
}
