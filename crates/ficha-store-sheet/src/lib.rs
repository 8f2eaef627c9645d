//! Sheet realization of the tabular storage proxy.
//!
//! Tables are worksheets in a single workbook: 2-D grids of strings whose
//! first row is the header. The whole workbook is persisted as one JSON
//! file and rewritten on every append, which matches the single-writer
//! deployment model.

mod store;
mod workbook;

pub use store::{SheetBackend, SheetTable};
pub use workbook::Workbook;

#[cfg(test)]
mod tests;
