//! # Full Entry Export
//!
//! Collects every entry for a bulk export by walking the store with an
//! [`EntryCursor`] keyset, oldest first. Submissions or deletions landing
//! between pages neither repeat nor skip an entry that existed when the
//! walk began and still exists when its page is read.

use sweeps_core::Entry;

use crate::error::StoreError;
use crate::store::{EntryCursor, EntryStore};

/// Rows fetched per round trip.
pub const EXPORT_PAGE_SIZE: i64 = 500;

/// Every entry in `(created_at, id)` order, fetched `page_size` at a time.
pub async fn collect_all_entries<S: EntryStore>(
    store: &S,
    page_size: i64,
) -> Result<Vec<Entry>, StoreError> {
    let page_size = page_size.max(1);
    let mut entries = Vec::new();
    let mut cursor = None;

    loop {
        let page = store.entries_after(cursor, page_size).await.map_err(|e| {
            tracing::error!(error = %e, fetched = entries.len(), "export page query failed");
            e
        })?;
        let done = (page.len() as i64) < page_size;
        if let Some(last) = page.last() {
            cursor = Some(EntryCursor::of(last));
        }
        entries.extend(page);
        if done {
            break;
        }
    }

    tracing::debug!(count = entries.len(), "entries collected for export");
    Ok(entries)
}
