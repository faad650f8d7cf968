//! # Entry Writer
//!
//! Inserts one entry and returns the stored row. Does not re-check for an
//! existing email: the caller runs the dedup guard first, and a lost race
//! surfaces here as [`StoreError::UniqueViolation`].

use sweeps_core::{Entry, NewEntry};

use crate::error::StoreError;
use crate::store::EntryStore;

/// Insert `entry`, returning the row with its generated id and referral code.
pub async fn write_entry<S: EntryStore>(store: &S, entry: NewEntry) -> Result<Entry, StoreError> {
    let campaign_id = entry.campaign_id;
    let referred = entry.referred_by.is_some();

    match store.insert_entry(entry).await {
        Ok(created) => {
            tracing::info!(
                entry_id = %created.id,
                referral_code = %created.referral_code,
                %campaign_id,
                referred,
                "entry created"
            );
            Ok(created)
        }
        Err(e) => {
            tracing::error!(error = %e, %campaign_id, "entry insert failed");
            Err(e)
        }
    }
}
