//! On-demand export: the three category tables bundled as named sheets.
//!
//! A pure consumer of the read contract — nothing here writes.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use ficha_core::{
  Result,
  category::{Category, OT_TE_FIELD},
  draft::now_local,
  table::Table,
};

use crate::{backend::AnyTable, repo::CategoryTables};

#[derive(Debug, Clone, Serialize)]
pub struct ExportSheet {
  pub titulo: String,
  pub filas:  Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryExport {
  pub categoria:   Category,
  pub backend:     String,
  pub generado_en: DateTime<FixedOffset>,
  pub hojas:       Vec<ExportSheet>,
}

async fn sheet(
  table: &AnyTable,
  titulo: String,
  ot_filter: Option<&str>,
) -> Result<ExportSheet> {
  let mut filas = table.get_all_values().await?;

  if let Some(ot) = ot_filter
    && let Some(col) = filas
      .first()
      .and_then(|header| header.iter().position(|f| f == OT_TE_FIELD))
  {
    let header = filas.remove(0);
    filas.retain(|row| row.get(col).is_some_and(|v| v == ot));
    filas.insert(0, header);
  }

  Ok(ExportSheet { titulo, filas })
}

impl CategoryTables {
  /// Bundle the category's three tables, each as one sheet. With
  /// `ot_filter`, only rows whose `OT-TE` cell equals the filter are kept
  /// (header rows always remain).
  pub async fn export(&self, ot_filter: Option<&str>) -> Result<CategoryExport> {
    let hojas = vec![
      sheet(&self.casos, self.category.casos_spec().name, ot_filter).await?,
      sheet(&self.hechos, self.category.hechos_spec().name, ot_filter).await?,
      sheet(&self.perfiles, self.category.perfiles_spec().name, ot_filter)
        .await?,
    ];

    Ok(CategoryExport {
      categoria:   self.category,
      backend:     self.backend_id.clone(),
      generado_en: now_local(),
      hojas,
    })
  }
}
