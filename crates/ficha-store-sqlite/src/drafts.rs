//! Persistent draft store over the `drafts` table.

use chrono::DateTime;
use rusqlite::OptionalExtension as _;

use ficha_core::{
  Error, Result,
  category::Category,
  draft::{Draft, DraftData, DraftStore, now_local},
};

use crate::DocStore;

impl DraftStore for DocStore {
  async fn save(
    &self,
    usuario: &str,
    category: Category,
    data: &DraftData,
  ) -> Result<()> {
    let usuario = usuario.to_string();
    let categoria = category.as_str().to_string();
    let doc = serde_json::to_string(data)?;
    let guardado_en = now_local().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO drafts (username, categoria, doc, guardado_en)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (username, categoria)
           DO UPDATE SET doc = excluded.doc, guardado_en = excluded.guardado_en",
          rusqlite::params![usuario, categoria, doc, guardado_en],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::backend)
  }

  async fn load(
    &self,
    usuario: &str,
    category: Category,
  ) -> Result<Option<Draft>> {
    let usuario = usuario.to_string();
    let categoria = category.as_str().to_string();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT doc, guardado_en FROM drafts
               WHERE username = ?1 AND categoria = ?2",
              rusqlite::params![usuario, categoria],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::backend)?;

    let Some((doc, guardado_en)) = row else { return Ok(None) };

    let data: DraftData = serde_json::from_str(&doc)?;
    let guardado_en =
      DateTime::parse_from_rfc3339(&guardado_en).map_err(Error::backend)?;

    Ok(Some(Draft { data, guardado_en }))
  }

  async fn delete(&self, usuario: &str, category: Category) -> Result<()> {
    let usuario = usuario.to_string();
    let categoria = category.as_str().to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM drafts WHERE username = ?1 AND categoria = ?2",
          rusqlite::params![usuario, categoria],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::backend)
  }
}
