//! Service layer: the case repository, credential and recovery subsystem,
//! mail relay, and export assembly.
//!
//! Everything here talks to storage exclusively through the
//! [`ficha_core::table`] traits; the concrete realization is chosen once at
//! startup via [`AnyBackend`].

pub mod auth;
pub mod backend;
pub mod export;
pub mod mail;
pub mod recovery;
pub mod repo;

pub use backend::{AnyBackend, AnyTable};
pub use repo::{CategoryTables, NewCaso, NewHecho, NewPerfil, connect};

#[cfg(test)]
mod tests;
