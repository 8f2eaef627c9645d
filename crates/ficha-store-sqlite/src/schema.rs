//! SQL schema for the document store.
//!
//! Collections are created lazily per [`TableSpec`](ficha_core::table::TableSpec);
//! only the draft table and pragmas are fixed.

/// Base DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const BASE_SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- At most one draft per (username, categoria).
CREATE TABLE IF NOT EXISTS drafts (
    username    TEXT NOT NULL,
    categoria   TEXT NOT NULL,
    doc         TEXT NOT NULL,   -- JSON DraftData
    guardado_en TEXT NOT NULL,   -- RFC 3339, fixed local offset
    UNIQUE (username, categoria)
);
";

/// DDL for one collection. Documents live in `doc` as JSON text; the key
/// columns are extracted at write time to carry the declared indexes.
pub fn collection_ddl(
  collection: &str,
  unique_key: bool,
  lookup_key: bool,
) -> String {
  let mut ddl = format!(
    "CREATE TABLE IF NOT EXISTS \"{collection}\" (
        doc_id      TEXT PRIMARY KEY,
        natural_key TEXT,
        lookup_key  TEXT,
        doc         TEXT NOT NULL
    );\n"
  );
  if unique_key {
    ddl.push_str(&format!(
      "CREATE UNIQUE INDEX IF NOT EXISTS \"{collection}_natural_key_idx\"
         ON \"{collection}\"(natural_key);\n"
    ));
  }
  if lookup_key {
    ddl.push_str(&format!(
      "CREATE INDEX IF NOT EXISTS \"{collection}_lookup_key_idx\"
         ON \"{collection}\"(lookup_key);\n"
    ));
  }
  ddl
}
