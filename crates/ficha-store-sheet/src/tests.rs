//! Integration tests for `SheetBackend`.

use ficha_core::{
  Error,
  category::Category,
  ids::next_row_id,
  table::{Table, TableBackend, TableSpec},
};

use crate::SheetBackend;

fn spec() -> TableSpec {
  TableSpec::new("Casos_Individual", &["ID_Caso", "OT-TE", "Edad"])
    .with_unique_key("OT-TE")
}

fn row(id: &str, ot: &str, edad: &str) -> Vec<String> {
  vec![id.to_string(), ot.to_string(), edad.to_string()]
}

// ─── Header invariant ────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_table_values_is_header_only() {
  let backend = SheetBackend::open_in_memory();
  let table = backend.open_table(&spec()).await.unwrap();

  let values = table.get_all_values().await.unwrap();
  assert_eq!(values, vec![vec!["ID_Caso", "OT-TE", "Edad"]]);
  assert!(table.get_all_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn appended_rows_follow_header_in_order() {
  let backend = SheetBackend::open_in_memory();
  let table = backend.open_table(&spec()).await.unwrap();

  table.append_row(&row("1", "OT-2024-001", "34")).await.unwrap();
  table.append_row(&row("2", "OT-2024-002", "51")).await.unwrap();

  let values = table.get_all_values().await.unwrap();
  assert_eq!(values.len(), 3);
  assert_eq!(values[0], table.header());
  assert!(values.iter().all(|r| r.len() == table.header().len()));
  assert_eq!(values[1][1], "OT-2024-001");
  assert_eq!(values[2][1], "OT-2024-002");

  let records = table.get_all_records().await.unwrap();
  assert_eq!(records.len(), 2);
  assert!(records.iter().any(|r| r["OT-TE"] == "OT-2024-002"));
}

// ─── Arity ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn arity_mismatch_fails_without_mutating() {
  let backend = SheetBackend::open_in_memory();
  let table = backend.open_table(&spec()).await.unwrap();
  table.append_row(&row("1", "OT-2024-001", "34")).await.unwrap();

  let short = vec!["2".to_string(), "OT-2024-002".to_string()];
  let err = table.append_row(&short).await.unwrap_err();
  assert!(matches!(err, Error::Arity { expected: 3, got: 2 }));

  let values = table.get_all_values().await.unwrap();
  assert_eq!(values.len(), 2);
}

// ─── ID assignment ───────────────────────────────────────────────────────────

#[tokio::test]
async fn next_row_id_counts_data_rows_plus_one() {
  let backend = SheetBackend::open_in_memory();
  let table = backend.open_table(&spec()).await.unwrap();

  assert_eq!(next_row_id(&table).await.unwrap(), 1);
  for k in 1..=3u32 {
    table
      .append_row(&row(&k.to_string(), &format!("OT-2024-{k:03}"), "40"))
      .await
      .unwrap();
    assert_eq!(next_row_id(&table).await.unwrap(), k + 1);
  }
}

// ─── Idempotent open ─────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_table_keeps_existing_rows() {
  let backend = SheetBackend::open_in_memory();
  let table = backend.open_table(&spec()).await.unwrap();
  table.append_row(&row("1", "OT-2024-001", "34")).await.unwrap();

  let again = backend.open_table(&spec()).await.unwrap();
  let values = again.get_all_values().await.unwrap();
  assert_eq!(values.len(), 2);
}

#[tokio::test]
async fn existing_header_is_the_compatibility_baseline() {
  // A worksheet created with a legacy header keeps it when reopened with
  // a richer spec; the effective header is what is stored.
  let backend = SheetBackend::open_in_memory();
  let legacy = TableSpec::new("Casos_Individual", &["ID_Caso", "OT-TE"]);
  backend.open_table(&legacy).await.unwrap();

  let table = backend.open_table(&spec()).await.unwrap();
  assert_eq!(table.header(), ["ID_Caso", "OT-TE"]);
  let values = table.get_all_values().await.unwrap();
  assert_eq!(values[0], ["ID_Caso", "OT-TE"]);
}

// ─── Category isolation ──────────────────────────────────────────────────────

#[tokio::test]
async fn categories_use_distinct_worksheets() {
  let backend = SheetBackend::open_in_memory();
  let individual = backend
    .open_table(&Category::Individual.casos_spec())
    .await
    .unwrap();
  let collective = backend
    .open_table(&Category::Collective.casos_spec())
    .await
    .unwrap();

  let mut row: Vec<String> =
    vec![String::new(); individual.header().len()];
  row[0] = "1".to_string();
  row[2] = "OT-2024-007".to_string();
  individual.append_row(&row).await.unwrap();

  assert_eq!(individual.get_all_values().await.unwrap().len(), 2);
  assert_eq!(collective.get_all_values().await.unwrap().len(), 1);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn workbook_survives_reopen_from_disk() {
  let path = std::env::temp_dir().join(format!(
    "ficha-sheet-reopen-{}.json",
    std::process::id()
  ));
  let _ = tokio::fs::remove_file(&path).await;

  {
    let backend = SheetBackend::open(&path).await.unwrap();
    let table = backend.open_table(&spec()).await.unwrap();
    table.append_row(&row("1", "OT-2024-001", "34")).await.unwrap();
  }

  let backend = SheetBackend::open(&path).await.unwrap();
  let table = backend.open_table(&spec()).await.unwrap();
  let values = table.get_all_values().await.unwrap();
  assert_eq!(values.len(), 2);
  assert_eq!(values[1][1], "OT-2024-001");

  let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn identifier_names_the_file() {
  let backend = SheetBackend::open_in_memory();
  assert_eq!(backend.identifier(), "sheet::memory:");
  assert!(!backend.enforces_unique_key());
}
