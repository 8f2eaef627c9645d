//! Credential verification against the shared user table.

use sha2::{Digest as _, Sha256};

use ficha_core::{
  Error, Result,
  table::{Table, TableBackend},
  user::{UserRecord, Verification, usuarios_spec},
};

use crate::backend::{AnyBackend, AnyTable};

/// Lowercase hex sha-256 digest — the stored password format.
pub fn hash_password(password: &str) -> String {
  hex::encode(Sha256::digest(password.as_bytes()))
}

/// Open (or create) the shared user table.
pub async fn open_usuarios(backend: &AnyBackend) -> Result<AnyTable> {
  backend.open_table(&usuarios_spec()).await
}

/// Register a new user row. The username is the natural key; a collision
/// is reported as [`Error::DuplicateKey`] on either realization.
pub async fn register_user(
  backend: &AnyBackend,
  usuarios: &AnyTable,
  user: &UserRecord,
) -> Result<()> {
  if !backend.enforces_unique_key() {
    let records = usuarios.get_all_records().await?;
    let taken = records
      .iter()
      .any(|r| r.get("username").is_some_and(|u| *u == user.username));
    if taken {
      return Err(Error::DuplicateKey {
        table: usuarios_spec().name,
        key:   user.username.clone(),
      });
    }
  }
  usuarios.append_row(&user.to_row()).await
}

/// Check `password` against the stored hash for `username`.
///
/// A username miss, a malformed record, or an unreachable backend all
/// yield the uniform denial `(false, None, false, false)` — lookup
/// failures never escape this boundary.
pub async fn verify(
  usuarios: &AnyTable,
  username: &str,
  password: &str,
) -> Verification {
  let records = match usuarios.get_all_records().await {
    Ok(records) => records,
    Err(e) => {
      tracing::warn!("user lookup failed: {e}");
      return Verification::denied();
    }
  };

  let Some(user) = records
    .iter()
    .find(|r| r.get("username").is_some_and(|u| u == username))
    .and_then(UserRecord::from_record)
  else {
    return Verification::denied();
  };

  let digest = hash_password(password);
  if digest.as_bytes() != user.password_hash.as_bytes() {
    return Verification::denied();
  }

  Verification {
    ok:                    true,
    nombre_completo:       Some(user.nombre_completo),
    debe_cambiar_password: user.debe_cambiar_password,
    es_admin:              user.es_admin,
  }
}
