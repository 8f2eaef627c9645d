//! User records and the `"TRUE"`/`"FALSE"` flag convention.
//!
//! Both realizations store every cell as a string, so boolean flags are
//! persisted as the literal strings `TRUE` and `FALSE`.

use serde::{Deserialize, Serialize};

use crate::table::{Record, TableSpec};

pub const USUARIOS_TABLE: &str = "Usuarios";

pub const USUARIOS_HEADER: &[&str] = &[
  "username",
  "password_hash",
  "nombre_completo",
  "es_admin",
  "debe_cambiar_password",
];

/// Table declaration for the shared user table.
pub fn usuarios_spec() -> TableSpec {
  TableSpec::new(USUARIOS_TABLE, USUARIOS_HEADER).with_unique_key("username")
}

pub fn encode_flag(value: bool) -> &'static str {
  if value { "TRUE" } else { "FALSE" }
}

/// Only the literal `TRUE` is truthy; anything else (including an empty
/// cell from a sparse document) reads as `false`.
pub fn decode_flag(value: &str) -> bool {
  value == "TRUE"
}

/// One row of the user table.
#[derive(Debug, Clone)]
pub struct UserRecord {
  pub username:              String,
  pub password_hash:         String,
  pub nombre_completo:       String,
  pub es_admin:              bool,
  pub debe_cambiar_password: bool,
}

impl UserRecord {
  /// Parse a stored record. Returns `None` when the record is malformed
  /// (missing username or hash) — the caller treats that as a miss.
  pub fn from_record(record: &Record) -> Option<Self> {
    let username = record.get("username").filter(|v| !v.is_empty())?;
    let password_hash = record.get("password_hash").filter(|v| !v.is_empty())?;

    Some(UserRecord {
      username:              username.clone(),
      password_hash:         password_hash.clone(),
      nombre_completo:       record
        .get("nombre_completo")
        .cloned()
        .unwrap_or_default(),
      es_admin:              record
        .get("es_admin")
        .is_some_and(|v| decode_flag(v)),
      debe_cambiar_password: record
        .get("debe_cambiar_password")
        .is_some_and(|v| decode_flag(v)),
    })
  }

  /// Serialize into a row in `USUARIOS_HEADER` order.
  pub fn to_row(&self) -> Vec<String> {
    vec![
      self.username.clone(),
      self.password_hash.clone(),
      self.nombre_completo.clone(),
      encode_flag(self.es_admin).to_string(),
      encode_flag(self.debe_cambiar_password).to_string(),
    ]
  }
}

/// Outcome of a credential check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
  pub ok:                    bool,
  pub nombre_completo:       Option<String>,
  pub debe_cambiar_password: bool,
  pub es_admin:              bool,
}

impl Verification {
  /// The uniform rejection value: `(false, None, false, false)`.
  pub fn denied() -> Self {
    Verification {
      ok:                    false,
      nombre_completo:       None,
      debe_cambiar_password: false,
      es_admin:              false,
    }
  }
}
