//! # Entry Lookup (dedup guard)
//!
//! Reports whether an email already has an entry. "Not found" is
//! `Ok(None)`; a failing query is propagated so the caller never mistakes
//! an outage for a fresh email.

use sweeps_core::{EmailAddress, ExistingEntry};

use crate::error::StoreError;
use crate::store::EntryStore;

/// Look up the existing entry for `email`, if any.
pub async fn find_existing_entry<S: EntryStore>(
    store: &S,
    email: &EmailAddress,
) -> Result<Option<ExistingEntry>, StoreError> {
    let existing = store.existing_entry(email.as_str()).await.map_err(|e| {
        tracing::error!(error = %e, "existing-entry lookup failed");
        e
    })?;

    if let Some(found) = &existing {
        tracing::info!(
            referral_code = %found.referral_code,
            entry_count = found.entry_count,
            "email already has an entry"
        );
    }

    Ok(existing)
}
