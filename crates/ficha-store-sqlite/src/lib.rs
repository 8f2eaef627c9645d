//! Document-store realization of the tabular storage proxy, backed by
//! SQLite.
//!
//! Each logical table is a collection of schema-less JSON documents; the
//! proxy projects them onto the declared header on read and validates
//! arity on write. Wraps [`tokio_rusqlite`] so all database access runs on
//! a dedicated thread without blocking the async runtime.
//!
//! This crate also hosts the persistent draft store (keyed upserts have no
//! natural home in the sheet realization).

mod drafts;
mod schema;
mod store;

pub use store::{DocStore, DocTable};
