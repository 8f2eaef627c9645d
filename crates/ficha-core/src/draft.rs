//! Drafts — unsubmitted, user-private snapshots of in-progress form state.
//!
//! At most one draft exists per (username, category) pair. A draft is
//! overwritten on every save, read once at form entry, and deleted on
//! successful final submission or explicit discard.

use std::future::Future;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, category::Category};

/// Intake forms run on analyst wall-clock time (UTC-5, no DST).
const LOCAL_OFFSET_SECS: i32 = 5 * 3600;

/// Current wall-clock time in the fixed local offset.
pub fn now_local() -> DateTime<FixedOffset> {
  let offset =
    FixedOffset::west_opt(LOCAL_OFFSET_SECS).expect("offset within range");
  Utc::now().with_timezone(&offset)
}

/// The caller-owned part of a draft: partially-filled field values plus
/// the in-progress hecho and perfil lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftData {
  #[serde(default)]
  pub campos:   serde_json::Map<String, serde_json::Value>,
  #[serde(default)]
  pub hechos:   Vec<serde_json::Value>,
  #[serde(default)]
  pub perfiles: Vec<serde_json::Value>,
}

/// A stored draft: the saved data plus the injected save timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
  #[serde(flatten)]
  pub data:        DraftData,
  pub guardado_en: DateTime<FixedOffset>,
}

/// Per-user, per-category draft persistence.
pub trait DraftStore: Send + Sync {
  /// Upsert the draft for (`usuario`, `category`), overwriting any prior
  /// save and stamping the current local save time.
  fn save<'a>(
    &'a self,
    usuario: &'a str,
    category: Category,
    data: &'a DraftData,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// The exact previous save, or `None` if never saved.
  fn load<'a>(
    &'a self,
    usuario: &'a str,
    category: Category,
  ) -> impl Future<Output = Result<Option<Draft>>> + Send + 'a;

  /// Idempotent; deleting an absent draft is a no-op.
  fn delete<'a>(
    &'a self,
    usuario: &'a str,
    category: Category,
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}
