//! Sequential row-ID assignment.

use crate::{Result, table::Table};

/// Next integer ID for a new row in `table`: the current row count of
/// `get_all_values` (header included), floored at 1. An empty table yields
/// 1; a table with k data rows yields k + 1.
///
/// Read-then-assign: two near-simultaneous submissions can observe the
/// same row count and be handed the same ID. There is no locking across
/// sessions.
pub async fn next_row_id<T: Table>(table: &T) -> Result<u32> {
  let rows = table.get_all_values().await?;
  Ok(rows.len().max(1) as u32)
}
