//! The case/hecho/perfil repository.
//!
//! `connect` opens a category's table triple (creating structure on first
//! use); the append operations assign sequential IDs, stamp timestamps,
//! and surface natural-key collisions uniformly across both realizations.

use std::collections::BTreeMap;

use ficha_core::{
  Error, Result,
  category::{Category, ID_CASO_FIELD, OT_TE_FIELD},
  draft::now_local,
  ids::next_row_id,
  ot::OtTe,
  table::{Table, TableBackend},
};

use crate::backend::{AnyBackend, AnyTable};

// ─── Input types ─────────────────────────────────────────────────────────────

/// A case to append. `campos` holds the remaining header fields by column
/// name; fields the form did not collect are written as empty cells.
#[derive(Debug, Clone)]
pub struct NewCaso {
  pub ot_te:  OtTe,
  pub campos: BTreeMap<String, String>,
}

/// A hecho to append under a case. The repository fills `ID_Hecho`,
/// `ID_Caso` and `OT-TE`.
#[derive(Debug, Clone, Default)]
pub struct NewHecho {
  pub campos: BTreeMap<String, String>,
}

/// A perfil to append under a case, same foreign-key shape as a hecho.
#[derive(Debug, Clone, Default)]
pub struct NewPerfil {
  pub campos: BTreeMap<String, String>,
}

/// IDs assigned by a full intake submission.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SubmitResult {
  pub id_caso:     u32,
  pub id_hechos:   Vec<u32>,
  pub id_perfiles: Vec<u32>,
}

// ─── Connection ──────────────────────────────────────────────────────────────

/// A category's table triple, opened against one backend.
pub struct CategoryTables {
  pub category:   Category,
  pub casos:      AnyTable,
  pub hechos:     AnyTable,
  pub perfiles:   AnyTable,
  /// Credential-masked backend identifier, for display.
  pub backend_id: String,
  enforces_unique: bool,
}

/// Open (or create) the three tables for `category`. Repeated connects are
/// idempotent.
pub async fn connect(
  backend: &AnyBackend,
  category: Category,
) -> Result<CategoryTables> {
  let casos = backend.open_table(&category.casos_spec()).await?;
  let hechos = backend.open_table(&category.hechos_spec()).await?;
  let perfiles = backend.open_table(&category.perfiles_spec()).await?;

  Ok(CategoryTables {
    category,
    casos,
    hechos,
    perfiles,
    backend_id: backend.identifier(),
    enforces_unique: backend.enforces_unique_key(),
  })
}

// ─── Row assembly ────────────────────────────────────────────────────────────

/// Project assigned fields and caller-provided `campos` onto the table's
/// effective header; anything else becomes an empty cell.
fn build_row(
  header: &[String],
  assigned: &[(&str, String)],
  campos: &BTreeMap<String, String>,
) -> Vec<String> {
  header
    .iter()
    .map(|field| {
      assigned
        .iter()
        .find(|(name, _)| *name == field.as_str())
        .map(|(_, value)| value.clone())
        .or_else(|| campos.get(field).cloned())
        .unwrap_or_default()
    })
    .collect()
}

impl CategoryTables {
  /// Append one case row and return its assigned `ID_Caso`.
  ///
  /// When the backend does not enforce the natural key itself (the sheet
  /// realization), existing `OT-TE` values are scanned before the append;
  /// either path reports a collision as [`Error::DuplicateKey`].
  pub async fn append_caso(&self, caso: &NewCaso) -> Result<u32> {
    let ot = caso.ot_te.to_string();

    if !self.enforces_unique {
      let records = self.casos.get_all_records().await?;
      let taken = records
        .iter()
        .any(|r| r.get(OT_TE_FIELD).is_some_and(|v| *v == ot));
      if taken {
        return Err(Error::DuplicateKey {
          table: self.category.casos_spec().name,
          key:   ot,
        });
      }
    }

    let id = next_row_id(&self.casos).await?;
    let row = build_row(
      self.casos.header(),
      &[
        ("ID_Caso", id.to_string()),
        ("Timestamp", now_local().to_rfc3339()),
        (OT_TE_FIELD, ot),
      ],
      &caso.campos,
    );
    self.casos.append_row(&row).await?;
    Ok(id)
  }

  /// Append one hecho row under `(id_caso, ot_te)`; returns `ID_Hecho`.
  pub async fn append_hecho(
    &self,
    id_caso: u32,
    ot_te: OtTe,
    hecho: &NewHecho,
  ) -> Result<u32> {
    let id = next_row_id(&self.hechos).await?;
    let row = build_row(
      self.hechos.header(),
      &[
        ("ID_Hecho", id.to_string()),
        (ID_CASO_FIELD, id_caso.to_string()),
        (OT_TE_FIELD, ot_te.to_string()),
      ],
      &hecho.campos,
    );
    self.hechos.append_row(&row).await?;
    Ok(id)
  }

  /// Append one perfil row under `(id_caso, ot_te)`; returns `ID_Perfil`.
  pub async fn append_perfil(
    &self,
    id_caso: u32,
    ot_te: OtTe,
    perfil: &NewPerfil,
  ) -> Result<u32> {
    let id = next_row_id(&self.perfiles).await?;
    let row = build_row(
      self.perfiles.header(),
      &[
        ("ID_Perfil", id.to_string()),
        (ID_CASO_FIELD, id_caso.to_string()),
        (OT_TE_FIELD, ot_te.to_string()),
      ],
      &perfil.campos,
    );
    self.perfiles.append_row(&row).await?;
    Ok(id)
  }

  /// Full intake submission: the case row, then its hechos, then its
  /// perfiles, appended sequentially. There is no transaction across the
  /// sequence — a failure part-way leaves the rows already appended in
  /// place, and the caller's saved draft is the recovery path.
  pub async fn submit_intake(
    &self,
    caso: &NewCaso,
    hechos: &[NewHecho],
    perfiles: &[NewPerfil],
  ) -> Result<SubmitResult> {
    let id_caso = self.append_caso(caso).await?;

    let mut id_hechos = Vec::with_capacity(hechos.len());
    for hecho in hechos {
      id_hechos.push(self.append_hecho(id_caso, caso.ot_te, hecho).await?);
    }

    let mut id_perfiles = Vec::with_capacity(perfiles.len());
    for perfil in perfiles {
      id_perfiles.push(self.append_perfil(id_caso, caso.ot_te, perfil).await?);
    }

    Ok(SubmitResult { id_caso, id_hechos, id_perfiles })
  }
}
