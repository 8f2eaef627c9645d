//! Error taxonomy shared by both storage realizations.
//!
//! The proxy contract requires that the repository and everything above it
//! see the same failure surface regardless of backend, so the variants live
//! here rather than in the backend crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Backend unreachable or misconfigured. Reported to callers as a
  /// non-fatal failure signal (`None`/`false`) at the repository boundary.
  #[error("backend connection failed: {0}")]
  Connection(String),

  /// `append_row` called with the wrong number of values. Signals a caller
  /// bug; the stored state is left untouched.
  #[error("row arity mismatch: expected {expected} values, got {got}")]
  Arity { expected: usize, got: usize },

  /// Natural-key collision on a case append.
  #[error("duplicate key {key:?} in table {table:?}")]
  DuplicateKey { table: String, key: String },

  /// A value that does not parse as an `OT-<year>-<number>` token.
  #[error("malformed OT-TE token: {0:?}")]
  InvalidOtTe(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Any other backend failure, wrapped with its source.
  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap an arbitrary backend error.
  pub fn backend<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Backend(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
