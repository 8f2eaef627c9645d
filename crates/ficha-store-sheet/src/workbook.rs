//! The on-disk workbook model: named worksheets of string grids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A workbook: worksheet title → grid. Row 0 of every non-empty grid is
/// that worksheet's header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
  pub sheets: BTreeMap<String, Vec<Vec<String>>>,
}

impl Workbook {
  /// Create the worksheet with its header row if it does not exist yet.
  /// Existing worksheets are left untouched (their stored header is the
  /// compatibility baseline). Returns the worksheet's effective header.
  pub fn ensure_sheet(&mut self, title: &str, header: &[String]) -> Vec<String> {
    let grid = self.sheets.entry(title.to_string()).or_default();
    if grid.is_empty() {
      grid.push(header.to_vec());
    }
    grid[0].clone()
  }
}
