//! [`DocStore`] — the SQLite implementation of the tabular proxy.

use std::{path::Path, sync::Arc};

use uuid::Uuid;

use ficha_core::{
  Error, Result,
  table::{
    Record, Table, TableBackend, TableSpec, check_arity, mask_identifier,
    project_values,
  },
};

use crate::schema::{BASE_SCHEMA, collection_ddl};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct DocStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  source:          Arc<String>,
}

impl DocStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let source = format!("sqlite:{}", path.display());
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(|e| Error::Connection(format!("cannot open {source}: {e}")))?;
    let store = DocStore { conn, source: Arc::new(source) };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(|e| Error::Connection(format!("cannot open :memory:: {e}")))?;
    let store = DocStore { conn, source: Arc::new("sqlite::memory:".to_string()) };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(BASE_SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(Error::backend)
  }
}

impl TableBackend for DocStore {
  type Table = DocTable;

  async fn open_table(&self, spec: &TableSpec) -> Result<DocTable> {
    let ddl = collection_ddl(
      &spec.collection_name(),
      spec.unique_key.is_some(),
      spec.lookup_key.is_some(),
    );

    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await
      .map_err(Error::backend)?;

    Ok(DocTable { conn: self.conn.clone(), spec: Arc::new(spec.clone()) })
  }

  fn identifier(&self) -> String {
    mask_identifier(&self.source)
  }

  fn enforces_unique_key(&self) -> bool {
    true
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// One document collection, opened against its declared spec.
#[derive(Clone)]
pub struct DocTable {
  conn: tokio_rusqlite::Connection,
  spec: Arc<TableSpec>,
}

/// Stringify a document field the way a sheet cell would hold it.
fn cell(value: &serde_json::Value) -> String {
  match value {
    serde_json::Value::String(s) => s.clone(),
    serde_json::Value::Null => String::new(),
    other => other.to_string(),
  }
}

fn is_unique_violation(err: &rusqlite::ffi::Error) -> bool {
  // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
  err.extended_code == 2067 || err.extended_code == 1555
}

impl Table for DocTable {
  fn header(&self) -> &[String] {
    &self.spec.header
  }

  async fn get_all_records(&self) -> Result<Vec<Record>> {
    let collection = self.spec.collection_name();

    let docs: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT doc FROM \"{collection}\""))?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::backend)?;

    let mut records = Vec::with_capacity(docs.len());
    for doc in docs {
      let value: serde_json::Value = serde_json::from_str(&doc)?;
      let record = self
        .spec
        .header
        .iter()
        .map(|field| {
          let text = value.get(field).map(cell).unwrap_or_default();
          (field.clone(), text)
        })
        .collect();
      records.push(record);
    }
    Ok(records)
  }

  async fn get_all_values(&self) -> Result<Vec<Vec<String>>> {
    let records = self.get_all_records().await?;
    Ok(project_values(&self.spec.header, &records))
  }

  async fn append_row(&self, values: &[String]) -> Result<()> {
    check_arity(self.spec.header.len(), values.len())?;

    let mut doc = serde_json::Map::new();
    for (field, value) in self.spec.header.iter().zip(values) {
      doc.insert(field.clone(), serde_json::Value::String(value.clone()));
    }

    let field_of = |key: &Option<String>| {
      key
        .as_deref()
        .and_then(|f| doc.get(f))
        .and_then(|v| v.as_str())
        .map(str::to_owned)
    };
    let natural_key = field_of(&self.spec.unique_key);
    let lookup_key = field_of(&self.spec.lookup_key);

    let collection = self.spec.collection_name();
    let doc_id = Uuid::new_v4().hyphenated().to_string();
    let doc_json = serde_json::to_string(&serde_json::Value::Object(doc))?;

    let table_name = self.spec.name.clone();
    let key_for_err = natural_key.clone().unwrap_or_default();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO \"{collection}\" (doc_id, natural_key, lookup_key, doc)
             VALUES (?1, ?2, ?3, ?4)"
          ),
          rusqlite::params![doc_id, natural_key, lookup_key, doc_json],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| match &e {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
          ffi,
          _,
        )) if is_unique_violation(ffi) => {
          Error::DuplicateKey { table: table_name, key: key_for_err }
        }
        _ => Error::backend(e),
      })
  }
}
