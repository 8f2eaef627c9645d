//! Service-level tests, run against both storage realizations.

use std::collections::BTreeMap;

use ficha_core::{
  Error,
  category::Category,
  table::Table,
  user::UserRecord,
};
use ficha_store_sheet::SheetBackend;
use ficha_store_sqlite::DocStore;

use crate::{
  AnyBackend, NewCaso, NewHecho, NewPerfil,
  auth::{hash_password, open_usuarios, register_user, verify},
  connect,
  mail::MailRelay,
  recovery::RecoveryCodes,
};

async fn backends() -> Vec<AnyBackend> {
  vec![
    AnyBackend::Sheet(SheetBackend::open_in_memory()),
    AnyBackend::Doc(DocStore::open_in_memory().await.expect("doc store")),
  ]
}

fn caso(ot: &str) -> NewCaso {
  let mut campos = BTreeMap::new();
  campos.insert("Edad".to_string(), "34".to_string());
  campos.insert("Municipio".to_string(), "Quibdó".to_string());
  campos.insert("Analista".to_string(), "Maria Rojas".to_string());
  NewCaso { ot_te: ot.parse().expect("ot token"), campos }
}

fn hecho(tipo: &str) -> NewHecho {
  let mut campos = BTreeMap::new();
  campos.insert("Tipo de Hecho".to_string(), tipo.to_string());
  NewHecho { campos }
}

fn perfil(grupo: &str) -> NewPerfil {
  let mut campos = BTreeMap::new();
  campos.insert("Grupo".to_string(), grupo.to_string());
  NewPerfil { campos }
}

// ─── Case append ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_caso_assigns_sequential_ids() {
  for backend in backends().await {
    let tables = connect(&backend, Category::Individual).await.unwrap();

    assert_eq!(tables.append_caso(&caso("OT-2024-001")).await.unwrap(), 1);
    assert_eq!(tables.append_caso(&caso("OT-2024-002")).await.unwrap(), 2);
    assert_eq!(tables.append_caso(&caso("OT-2024-003")).await.unwrap(), 3);
  }
}

#[tokio::test]
async fn case_row_projects_campos_onto_the_header() {
  for backend in backends().await {
    let tables = connect(&backend, Category::Individual).await.unwrap();
    tables.append_caso(&caso("OT-2024-001")).await.unwrap();

    let records = tables.casos.get_all_records().await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["ID_Caso"], "1");
    assert_eq!(record["OT-TE"], "OT-2024-001");
    assert_eq!(record["Edad"], "34");
    assert_eq!(record["Municipio"], "Quibdó");
    // Fields the form did not collect are empty cells, not absent.
    assert_eq!(record["Sexo"], "");
    assert!(!record["Timestamp"].is_empty());
  }
}

// ─── Duplicate natural key (spec scenario) ───────────────────────────────────

#[tokio::test]
async fn duplicate_ot_te_is_rejected_per_category() {
  for backend in backends().await {
    let individual = connect(&backend, Category::Individual).await.unwrap();
    let collective = connect(&backend, Category::Collective).await.unwrap();

    individual.append_caso(&caso("OT-2024-007")).await.unwrap();

    let err = individual
      .append_caso(&caso("OT-2024-007"))
      .await
      .unwrap_err();
    match err {
      Error::DuplicateKey { key, .. } => assert_eq!(key, "OT-2024-007"),
      other => panic!("expected DuplicateKey, got {other:?}"),
    }

    // Category isolation: the collective triple is untouched by the
    // individual one.
    collective.append_caso(&caso("OT-2024-008")).await.unwrap();

    assert_eq!(
      individual.casos.get_all_values().await.unwrap().len(),
      2
    );
    assert_eq!(
      collective.casos.get_all_values().await.unwrap().len(),
      2
    );
  }
}

// ─── Full intake ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_intake_links_hechos_and_perfiles_to_the_case() {
  for backend in backends().await {
    let tables = connect(&backend, Category::Collective).await.unwrap();

    let result = tables
      .submit_intake(
        &caso("OT-2024-010"),
        &[hecho("Amenaza"), hecho("Desplazamiento")],
        &[perfil("Grupo A")],
      )
      .await
      .unwrap();

    assert_eq!(result.id_caso, 1);
    assert_eq!(result.id_hechos, vec![1, 2]);
    assert_eq!(result.id_perfiles, vec![1]);

    let hechos = tables.hechos.get_all_records().await.unwrap();
    assert_eq!(hechos.len(), 2);
    for record in &hechos {
      assert_eq!(record["ID_Caso"], "1");
      assert_eq!(record["OT-TE"], "OT-2024-010");
    }

    let perfiles = tables.perfiles.get_all_records().await.unwrap();
    assert_eq!(perfiles[0]["Grupo"], "Grupo A");
    assert_eq!(perfiles[0]["ID_Caso"], "1");
  }
}

#[tokio::test]
async fn duplicate_case_stops_the_intake_before_any_hecho() {
  for backend in backends().await {
    let tables = connect(&backend, Category::Individual).await.unwrap();
    tables.append_caso(&caso("OT-2024-020")).await.unwrap();

    let err = tables
      .submit_intake(&caso("OT-2024-020"), &[hecho("Amenaza")], &[])
      .await
      .unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { .. }));

    assert!(tables.hechos.get_all_records().await.unwrap().is_empty());
  }
}

// ─── Connection ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_is_idempotent_and_reports_backend_id() {
  for backend in backends().await {
    let first = connect(&backend, Category::Individual).await.unwrap();
    first.append_caso(&caso("OT-2024-001")).await.unwrap();

    let second = connect(&backend, Category::Individual).await.unwrap();
    assert_eq!(second.casos.get_all_values().await.unwrap().len(), 2);
    assert!(!second.backend_id.is_empty());
    // Identifiers never leak credentials.
    assert!(!second.backend_id.contains('@'));
  }
}

// ─── Credentials ─────────────────────────────────────────────────────────────

fn test_user() -> UserRecord {
  UserRecord {
    username:              "mrojas".to_string(),
    password_hash:         hash_password("secreta123"),
    nombre_completo:       "Maria Rojas".to_string(),
    es_admin:              true,
    debe_cambiar_password: false,
  }
}

#[tokio::test]
async fn verify_accepts_the_exact_password_only() {
  for backend in backends().await {
    let usuarios = open_usuarios(&backend).await.unwrap();
    register_user(&backend, &usuarios, &test_user()).await.unwrap();

    let ok = verify(&usuarios, "mrojas", "secreta123").await;
    assert!(ok.ok);
    assert_eq!(ok.nombre_completo.as_deref(), Some("Maria Rojas"));
    assert!(ok.es_admin);
    assert!(!ok.debe_cambiar_password);

    let wrong = verify(&usuarios, "mrojas", "secreta124").await;
    assert!(!wrong.ok);
    assert!(wrong.nombre_completo.is_none());
  }
}

#[tokio::test]
async fn verify_misses_yield_the_uniform_denial() {
  for backend in backends().await {
    let usuarios = open_usuarios(&backend).await.unwrap();

    let miss = verify(&usuarios, "nadie", "x").await;
    assert!(!miss.ok);
    assert!(miss.nombre_completo.is_none());
    assert!(!miss.es_admin);
    assert!(!miss.debe_cambiar_password);
  }
}

#[tokio::test]
async fn register_user_rejects_duplicate_usernames() {
  for backend in backends().await {
    let usuarios = open_usuarios(&backend).await.unwrap();
    register_user(&backend, &usuarios, &test_user()).await.unwrap();

    let err = register_user(&backend, &usuarios, &test_user())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { .. }));
  }
}

// ─── Recovery delivery ───────────────────────────────────────────────────────

#[tokio::test]
async fn delivery_failure_discards_the_pending_code() {
  let codes = RecoveryCodes::new();
  // A file transport pointed at a directory that does not exist fails on
  // send, standing in for an unreachable SMTP relay.
  let missing = std::env::temp_dir().join("ficha-no-such-dir-for-mail");
  let relay = MailRelay::file(&missing, "Ficha <ficha@example.org>").unwrap();

  let err = codes
    .issue_and_send(&relay, "mrojas", "mrojas@example.org")
    .await
    .unwrap_err();
  assert!(err.0.contains("mrojas@example.org"));

  // Rolled back: nothing left to validate.
  assert!(codes.pending_code("mrojas").is_none());
}

#[tokio::test]
async fn delivered_code_validates_once() {
  let dir = std::env::temp_dir().join(format!(
    "ficha-mail-outbox-{}",
    std::process::id()
  ));
  tokio::fs::create_dir_all(&dir).await.unwrap();

  let codes = RecoveryCodes::new();
  let relay = MailRelay::file(&dir, "Ficha <ficha@example.org>").unwrap();
  codes
    .issue_and_send(&relay, "mrojas", "mrojas@example.org")
    .await
    .unwrap();

  let code = codes.pending_code("mrojas").expect("pending code");
  assert!(codes.validate("mrojas", &code));
  assert!(!codes.validate("mrojas", &code));

  let _ = tokio::fs::remove_dir_all(&dir).await;
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn export_bundles_three_sheets_with_optional_filter() {
  for backend in backends().await {
    let tables = connect(&backend, Category::Individual).await.unwrap();
    tables
      .submit_intake(&caso("OT-2024-001"), &[hecho("Amenaza")], &[])
      .await
      .unwrap();
    tables
      .submit_intake(&caso("OT-2024-002"), &[hecho("Homicidio")], &[])
      .await
      .unwrap();

    let full = tables.export(None).await.unwrap();
    assert_eq!(full.hojas.len(), 3);
    assert_eq!(full.hojas[0].filas.len(), 3); // header + 2 cases

    let filtered = tables.export(Some("OT-2024-002")).await.unwrap();
    assert_eq!(filtered.hojas[0].filas.len(), 2); // header + 1 case
    assert_eq!(filtered.hojas[1].filas.len(), 2); // header + 1 hecho
    assert!(
      filtered.hojas[0].filas[1].contains(&"OT-2024-002".to_string())
    );
  }
}
