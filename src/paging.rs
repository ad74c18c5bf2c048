//! Cursor-based paged scan
//!
//! One control-flow primitive shared by the orders, balances, and
//! operation-log loads: fetch `id > cursor ORDER BY id LIMIT page_size`,
//! feed each row to the handler in order, advance the cursor to the last
//! row's id, stop on a short page. A handler failure aborts the whole scan
//! immediately - no partial success.

use crate::store::{PageSource, StoreError, TableRow};

/// Rows fetched per round-trip. Bounds memory and transfer cost.
pub const PAGE_SIZE: usize = 1000;

/// Drive a full scan of `source`, returning the final cursor (last seen
/// row id, 0 for an empty table).
pub async fn paged_scan<S, F, E>(source: &S, page_size: usize, mut on_row: F) -> Result<u64, E>
where
    S: PageSource,
    F: FnMut(S::Row) -> Result<(), E>,
    E: From<StoreError>,
{
    let mut cursor = 0u64;
    loop {
        let rows = source.fetch_page(cursor, page_size).await?;
        let fetched = rows.len();
        tracing::trace!(after_id = cursor, fetched, "fetched page");

        for row in rows {
            cursor = row.row_id();
            on_row(row)?;
        }

        // A short page means the table is exhausted.
        if fetched < page_size {
            break;
        }
    }
    Ok(cursor)
}
