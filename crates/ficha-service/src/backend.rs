//! Runtime backend selection.
//!
//! The realization is picked once from configuration; from then on the
//! repository only sees the [`Table`]/[`TableBackend`] contract.

use ficha_core::{
  Result,
  table::{Record, Table, TableBackend, TableSpec},
};
use ficha_store_sheet::{SheetBackend, SheetTable};
use ficha_store_sqlite::{DocStore, DocTable};

/// Either storage realization.
#[derive(Clone)]
pub enum AnyBackend {
  Sheet(SheetBackend),
  Doc(DocStore),
}

impl TableBackend for AnyBackend {
  type Table = AnyTable;

  async fn open_table(&self, spec: &TableSpec) -> Result<AnyTable> {
    match self {
      AnyBackend::Sheet(b) => Ok(AnyTable::Sheet(b.open_table(spec).await?)),
      AnyBackend::Doc(b) => Ok(AnyTable::Doc(b.open_table(spec).await?)),
    }
  }

  fn identifier(&self) -> String {
    match self {
      AnyBackend::Sheet(b) => b.identifier(),
      AnyBackend::Doc(b) => b.identifier(),
    }
  }

  fn enforces_unique_key(&self) -> bool {
    match self {
      AnyBackend::Sheet(b) => b.enforces_unique_key(),
      AnyBackend::Doc(b) => b.enforces_unique_key(),
    }
  }
}

/// A table opened through [`AnyBackend`].
#[derive(Clone)]
pub enum AnyTable {
  Sheet(SheetTable),
  Doc(DocTable),
}

impl Table for AnyTable {
  fn header(&self) -> &[String] {
    match self {
      AnyTable::Sheet(t) => t.header(),
      AnyTable::Doc(t) => t.header(),
    }
  }

  async fn get_all_records(&self) -> Result<Vec<Record>> {
    match self {
      AnyTable::Sheet(t) => t.get_all_records().await,
      AnyTable::Doc(t) => t.get_all_records().await,
    }
  }

  async fn get_all_values(&self) -> Result<Vec<Vec<String>>> {
    match self {
      AnyTable::Sheet(t) => t.get_all_values().await,
      AnyTable::Doc(t) => t.get_all_values().await,
    }
  }

  async fn append_row(&self, values: &[String]) -> Result<()> {
    match self {
      AnyTable::Sheet(t) => t.append_row(values).await,
      AnyTable::Doc(t) => t.append_row(values).await,
    }
  }
}
