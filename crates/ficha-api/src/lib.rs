//! JSON API for the ficha intake service.
//!
//! Exposes an axum [`Router`] over the repository, draft store, and
//! credential/recovery subsystem. The form UI is a separate client; this
//! layer is its only entry point into storage.

pub mod auth;
pub mod cases;
pub mod drafts;
pub mod error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;

use ficha_core::category::Category;
use ficha_service::{
  AnyBackend, AnyTable, mail::MailRelay, recovery::RecoveryCodes,
};
use ficha_store_sqlite::DocStore;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Which realization holds the case tables.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
  Sheet,
  Sqlite,
}

#[derive(Clone, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum MailConfig {
  Smtp {
    host:     String,
    port:     u16,
    username: String,
    password: String,
    from:     String,
  },
  File {
    dir:  PathBuf,
    from: String,
  },
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Clone, Deserialize)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub backend:     BackendKind,
  /// Workbook file; required when `backend = "sheet"`.
  pub sheet_path:  Option<PathBuf>,
  /// Document store; always opened — drafts live here.
  pub sqlite_path: PathBuf,
  pub mail:        MailConfig,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub backend:  AnyBackend,
  /// Draft persistence, independent of where cases live.
  pub drafts:   DocStore,
  pub usuarios: AnyTable,
  pub recovery: Arc<RecoveryCodes>,
  pub mail:     Arc<MailRelay>,
}

impl AppState {
  /// Open the shared user table and assemble the state.
  pub async fn new(
    backend: AnyBackend,
    drafts: DocStore,
    mail: MailRelay,
  ) -> Result<Self, ficha_core::Error> {
    let usuarios = ficha_service::auth::open_usuarios(&backend).await?;
    Ok(AppState {
      backend,
      drafts,
      usuarios,
      recovery: Arc::new(RecoveryCodes::new()),
      mail: Arc::new(mail),
    })
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/api/login", post(auth::login))
    .route("/api/recovery/request", post(auth::recovery_request))
    .route("/api/recovery/validate", post(auth::recovery_validate))
    .route(
      "/api/drafts/{category}",
      get(drafts::load).put(drafts::save).delete(drafts::discard),
    )
    .route("/api/cases/{category}", post(cases::submit))
    .route("/api/export/{category}", get(cases::export))
    .with_state(state)
}

pub(crate) fn parse_category(raw: &str) -> Result<Category, ApiError> {
  raw.parse().map_err(ApiError::BadRequest)
}

// ─── Integration tests ───────────────────────────────────────────────────────
