//! Intake submission and export handlers.

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;

use ficha_core::{draft::DraftStore as _, ot::OtTe};
use ficha_service::{
  NewCaso, NewHecho, NewPerfil, connect,
  export::CategoryExport,
  repo::SubmitResult,
};

use crate::{AppState, error::ApiError, parse_category};

#[derive(Deserialize)]
pub struct SubmitRequest {
  pub usuario:  String,
  pub ot_te:    OtTe,
  #[serde(default)]
  pub campos:   BTreeMap<String, String>,
  #[serde(default)]
  pub hechos:   Vec<BTreeMap<String, String>>,
  #[serde(default)]
  pub perfiles: Vec<BTreeMap<String, String>>,
}

/// Final submission: case row, hechos, perfiles — then the submitting
/// user's draft for this category is deleted.
pub async fn submit(
  State(state): State<AppState>,
  Path(category): Path<String>,
  Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResult>, ApiError> {
  let category = parse_category(&category)?;
  let tables = connect(&state.backend, category).await?;

  let caso = NewCaso { ot_te: req.ot_te, campos: req.campos };
  let hechos: Vec<NewHecho> = req
    .hechos
    .into_iter()
    .map(|campos| NewHecho { campos })
    .collect();
  let perfiles: Vec<NewPerfil> = req
    .perfiles
    .into_iter()
    .map(|campos| NewPerfil { campos })
    .collect();

  let result = tables.submit_intake(&caso, &hechos, &perfiles).await?;

  // The draft has served its purpose; a failed delete must not undo a
  // committed submission.
  if let Err(e) = state.drafts.delete(&req.usuario, category).await {
    tracing::warn!("draft cleanup for {} failed: {e}", req.usuario);
  }

  Ok(Json(result))
}

#[derive(Deserialize)]
pub struct ExportQuery {
  pub ot: Option<String>,
}

pub async fn export(
  State(state): State<AppState>,
  Path(category): Path<String>,
  Query(query): Query<ExportQuery>,
) -> Result<Json<CategoryExport>, ApiError> {
  let category = parse_category(&category)?;
  let tables = connect(&state.backend, category).await?;
  let export = tables.export(query.ot.as_deref()).await?;
  Ok(Json(export))
}
