//! # Entry Store Interface
//!
//! The relational collaborator behind the entry flow: equality-filtered
//! selects, single-row insert-returning, delete-with-count, and a
//! paginated listing for the admin surface.
//!
//! Methods return `impl Future + Send` so that handlers generic over the
//! store stay `Send` and can run on a multi-threaded runtime.

use std::future::Future;

use chrono::{DateTime, Utc};
use sweeps_core::{Campaign, Entry, ExistingEntry, NewEntry, ReferralDebugRecord};
use uuid::Uuid;

use crate::error::StoreError;

/// Keyset position in `(created_at, id)` order.
///
/// Field order matters: the derived `Ord` compares `created_at` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EntryCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl EntryCursor {
    /// Position of `entry`.
    pub fn of(entry: &Entry) -> Self {
        Self {
            created_at: entry.created_at,
            id: entry.id,
        }
    }
}

/// Persistence backend for entries, campaigns and referral debug records.
pub trait EntryStore: Send + Sync {
    /// Fetch a campaign by its identifier.
    fn campaign_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Campaign>, StoreError>> + Send;

    /// Fetch a campaign by its slug.
    fn campaign_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Campaign>, StoreError>> + Send;

    /// Fetch the dedup view of the entry registered under `email`.
    ///
    /// Matches on [`sweeps_core::email_dedup_key`], so addresses differing
    /// only in case find the same entry.
    fn existing_entry(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<ExistingEntry>, StoreError>> + Send;

    /// Whether any entry owns `code` as its referral code.
    fn referral_code_exists(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Insert an entry, returning the stored row with generated `id` and
    /// `referral_code`. Must not re-check for duplicates beyond what the
    /// backend's own constraints enforce.
    fn insert_entry(
        &self,
        entry: NewEntry,
    ) -> impl Future<Output = Result<Entry, StoreError>> + Send;

    /// Append one referral debug record.
    fn insert_referral_debug(
        &self,
        record: ReferralDebugRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetch one entry by id.
    fn entry_by_id(&self, id: Uuid)
        -> impl Future<Output = Result<Option<Entry>, StoreError>> + Send;

    /// List entries, newest first.
    fn list_entries(
        &self,
        limit: i64,
        offset: i64,
    ) -> impl Future<Output = Result<Vec<Entry>, StoreError>> + Send;

    /// Entries strictly after `after` in `(created_at, id)` order, oldest
    /// first. Rows inserted or deleted between calls never shift a page.
    fn entries_after(
        &self,
        after: Option<EntryCursor>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Entry>, StoreError>> + Send;

    /// Delete an entry, returning the number of rows removed (0 or 1).
    fn delete_entry(&self, id: Uuid) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Cheap round trip used by the readiness probe.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
