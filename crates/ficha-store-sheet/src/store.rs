//! [`SheetBackend`] — the workbook implementation of the tabular proxy.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use tokio::sync::RwLock;

use ficha_core::{
  Error, Result,
  table::{
    Record, Table, TableBackend, TableSpec, check_arity, mask_identifier,
    row_to_record,
  },
};

use crate::workbook::Workbook;

// ─── Backend ─────────────────────────────────────────────────────────────────

/// A workbook of worksheets persisted as a single JSON file.
///
/// Cloning is cheap — the workbook is shared behind a lock.
#[derive(Clone)]
pub struct SheetBackend {
  path: Option<Arc<PathBuf>>,
  book: Arc<RwLock<Workbook>>,
}

impl SheetBackend {
  /// Open (or create) the workbook file at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let book = if tokio::fs::try_exists(&path)
      .await
      .map_err(|e| Error::Connection(format!("cannot stat {path:?}: {e}")))?
    {
      let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| Error::Connection(format!("cannot read {path:?}: {e}")))?;
      serde_json::from_slice(&bytes)
        .map_err(|e| Error::Connection(format!("cannot parse {path:?}: {e}")))?
    } else {
      Workbook::default()
    };

    Ok(SheetBackend {
      path: Some(Arc::new(path)),
      book: Arc::new(RwLock::new(book)),
    })
  }

  /// An unpersisted workbook — useful for testing.
  pub fn open_in_memory() -> Self {
    SheetBackend { path: None, book: Arc::new(RwLock::new(Workbook::default())) }
  }

  async fn persist(&self, book: &Workbook) -> Result<()> {
    let Some(path) = &self.path else { return Ok(()) };
    let bytes = serde_json::to_vec_pretty(book)?;
    tokio::fs::write(path.as_ref(), bytes)
      .await
      .map_err(|e| Error::Connection(format!("cannot write {path:?}: {e}")))
  }
}

impl TableBackend for SheetBackend {
  type Table = SheetTable;

  async fn open_table(&self, spec: &TableSpec) -> Result<SheetTable> {
    let mut book = self.book.write().await;
    let existed = book.sheets.contains_key(&spec.name);
    let header = book.ensure_sheet(&spec.name, &spec.header);
    if !existed {
      self.persist(&book).await?;
    }

    Ok(SheetTable { backend: self.clone(), title: spec.name.clone(), header })
  }

  fn identifier(&self) -> String {
    let raw = match &self.path {
      Some(path) => format!("sheet:{}", path.display()),
      None => "sheet::memory:".to_string(),
    };
    mask_identifier(&raw)
  }

  fn enforces_unique_key(&self) -> bool {
    false
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// One worksheet, opened against its declared spec.
#[derive(Clone)]
pub struct SheetTable {
  backend: SheetBackend,
  title:   String,
  header:  Vec<String>,
}

impl SheetTable {
  fn missing(&self) -> Error {
    Error::Connection(format!("worksheet {:?} not found", self.title))
  }
}

impl Table for SheetTable {
  fn header(&self) -> &[String] {
    &self.header
  }

  async fn get_all_values(&self) -> Result<Vec<Vec<String>>> {
    let book = self.backend.book.read().await;
    book
      .sheets
      .get(&self.title)
      .cloned()
      .ok_or_else(|| self.missing())
  }

  async fn get_all_records(&self) -> Result<Vec<Record>> {
    let values = self.get_all_values().await?;
    let (header, rows) = match values.split_first() {
      Some(split) => split,
      None => return Ok(vec![]),
    };
    Ok(rows.iter().map(|row| row_to_record(header, row)).collect())
  }

  async fn append_row(&self, values: &[String]) -> Result<()> {
    check_arity(self.header.len(), values.len())?;

    let mut book = self.backend.book.write().await;
    let grid = book
      .sheets
      .get_mut(&self.title)
      .ok_or_else(|| self.missing())?;
    grid.push(values.to_vec());

    if let Err(e) = self.backend.persist(&book).await {
      // Keep the in-memory grid consistent with disk.
      if let Some(grid) = book.sheets.get_mut(&self.title) {
        grid.pop();
      }
      return Err(e);
    }
    Ok(())
  }
}
