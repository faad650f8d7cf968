//! # In-Memory Entry Store
//!
//! Process-local [`EntryStore`] used when no database is configured and by
//! tests. It reproduces the database-side behaviour the flow relies on:
//!
//! - unique `email` (compared case-insensitively) and unique
//!   `referral_code` constraints,
//! - 8-character uppercase hex referral codes generated on insert,
//! - crediting the referrer's `entry_count` when a referred entry lands.
//!
//! All operations are synchronous under a `parking_lot::RwLock`; the lock
//! is never held across an `.await`.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use rand::Rng;
use sweeps_core::{
    email_dedup_key, Campaign, Entry, ExistingEntry, NewEntry, ReferralDebugRecord,
    DEFAULT_CAMPAIGN_SLUG,
};
use uuid::Uuid;

use crate::error::{StoreError, EMAIL_UNIQUE_CONSTRAINT};
use crate::store::{EntryCursor, EntryStore};

/// Entry count added to a referrer each time one of its codes is used.
pub const REFERRAL_BONUS: i32 = 1;

#[derive(Debug, Default)]
struct Tables {
    campaigns: Vec<Campaign>,
    /// Insertion order; listing reverses it.
    entries: Vec<Entry>,
    referral_debug: Vec<ReferralDebugRecord>,
}

/// Thread-safe, cloneable in-memory entry store.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryEntryStore {
    /// Create a store seeded with the default campaign.
    pub fn new() -> Self {
        let store = Self::empty();
        store.add_campaign(DEFAULT_CAMPAIGN_SLUG, "Sweepstakes");
        store
    }

    /// Create a store with no campaigns at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a campaign and return it.
    pub fn add_campaign(&self, slug: &str, title: &str) -> Campaign {
        let campaign = Campaign {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: title.to_string(),
            prize: None,
            audience: None,
            created_at: Utc::now(),
        };
        self.tables.write().campaigns.push(campaign.clone());
        campaign
    }

    /// Snapshot of the referral debug trail.
    pub fn referral_debug_records(&self) -> Vec<ReferralDebugRecord> {
        self.tables.read().referral_debug.clone()
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.tables.read().entries.len()
    }

    fn generate_code(tables: &Tables) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let code = format!("{:08X}", rng.gen::<u32>());
            if !tables.entries.iter().any(|e| e.referral_code == code) {
                return code;
            }
        }
    }
}

impl EntryStore for MemoryEntryStore {
    async fn campaign_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        Ok(self
            .tables
            .read()
            .campaigns
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn campaign_by_slug(&self, slug: &str) -> Result<Option<Campaign>, StoreError> {
        Ok(self
            .tables
            .read()
            .campaigns
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn existing_entry(&self, email: &str) -> Result<Option<ExistingEntry>, StoreError> {
        let key = email_dedup_key(email);
        Ok(self
            .tables
            .read()
            .entries
            .iter()
            .find(|e| email_dedup_key(&e.email) == key)
            .map(|e| ExistingEntry {
                referral_code: e.referral_code.clone(),
                entry_count: e.entry_count,
                created_at: e.created_at,
            }))
    }

    async fn referral_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .read()
            .entries
            .iter()
            .any(|e| e.referral_code == code))
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        let mut tables = self.tables.write();
        let key = email_dedup_key(&entry.email);
        if tables.entries.iter().any(|e| email_dedup_key(&e.email) == key) {
            return Err(StoreError::UniqueViolation {
                constraint: EMAIL_UNIQUE_CONSTRAINT.into(),
            });
        }

        let now = Utc::now();
        let record = Entry {
            id: Uuid::new_v4(),
            first_name: entry.first_name,
            last_name: entry.last_name,
            email: entry.email,
            referral_code: Self::generate_code(&tables),
            referred_by: entry.referred_by,
            entry_count: entry.entry_count,
            campaign_id: entry.campaign_id,
            created_at: now,
            updated_at: now,
        };

        if let Some(code) = record.referred_by.as_deref() {
            if let Some(referrer) = tables.entries.iter_mut().find(|e| e.referral_code == code) {
                referrer.entry_count += REFERRAL_BONUS;
                referrer.updated_at = now;
            }
        }

        tables.entries.push(record.clone());
        Ok(record)
    }

    async fn insert_referral_debug(&self, record: ReferralDebugRecord) -> Result<(), StoreError> {
        self.tables.write().referral_debug.push(record);
        Ok(())
    }

    async fn entry_by_id(&self, id: Uuid) -> Result<Option<Entry>, StoreError> {
        Ok(self
            .tables
            .read()
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn list_entries(&self, limit: i64, offset: i64) -> Result<Vec<Entry>, StoreError> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(0);
        let offset = usize::try_from(offset.max(0)).unwrap_or(0);
        Ok(self
            .tables
            .read()
            .entries
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn entries_after(
        &self,
        after: Option<EntryCursor>,
        limit: i64,
    ) -> Result<Vec<Entry>, StoreError> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(0);
        let mut page: Vec<Entry> = self
            .tables
            .read()
            .entries
            .iter()
            .filter(|e| after.map_or(true, |cursor| EntryCursor::of(e) > cursor))
            .cloned()
            .collect();
        page.sort_by_key(EntryCursor::of);
        page.truncate(limit);
        Ok(page)
    }

    async fn delete_entry(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut tables = self.tables.write();
        let before = tables.entries.len();
        tables.entries.retain(|e| e.id != id);
        Ok((before - tables.entries.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(email: &str, campaign_id: Uuid, referred_by: Option<&str>) -> NewEntry {
        NewEntry {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            referred_by: referred_by.map(String::from),
            entry_count: 1,
            campaign_id,
        }
    }

    #[tokio::test]
    async fn new_store_has_default_campaign() {
        let store = MemoryEntryStore::new();
        let campaign = store.campaign_by_slug(DEFAULT_CAMPAIGN_SLUG).await.unwrap();
        assert!(campaign.is_some_and(|c| c.is_default()));
    }

    #[tokio::test]
    async fn insert_generates_eight_char_hex_code() {
        let store = MemoryEntryStore::new();
        let entry = store
            .insert_entry(new_entry("a@b.com", Uuid::new_v4(), None))
            .await
            .unwrap();
        assert_eq!(entry.referral_code.len(), 8);
        assert!(entry
            .referral_code
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = MemoryEntryStore::new();
        let campaign = Uuid::new_v4();
        store.insert_entry(new_entry("a@b.com", campaign, None)).await.unwrap();
        let err = store
            .insert_entry(new_entry("a@b.com", campaign, None))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn email_uniqueness_ignores_case() {
        let store = MemoryEntryStore::new();
        let campaign = Uuid::new_v4();
        store
            .insert_entry(new_entry("Ada@Example.com", campaign, None))
            .await
            .unwrap();

        let found = store.existing_entry("ada@example.COM").await.unwrap();
        assert!(found.is_some());

        let err = store
            .insert_entry(new_entry("ada@example.com", campaign, None))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn entries_after_walks_oldest_first() {
        let store = MemoryEntryStore::new();
        let campaign = Uuid::new_v4();
        for i in 0..5 {
            store
                .insert_entry(new_entry(&format!("u{i}@b.com"), campaign, None))
                .await
                .unwrap();
        }

        let first = store.entries_after(None, 2).await.unwrap();
        assert_eq!(first.len(), 2);
        let cursor = EntryCursor::of(first.last().unwrap());
        let rest = store.entries_after(Some(cursor), 10).await.unwrap();
        assert_eq!(rest.len(), 3);
        assert!(rest.iter().all(|e| EntryCursor::of(e) > cursor));

        let mut all: Vec<EntryCursor> = first.iter().chain(&rest).map(EntryCursor::of).collect();
        let walked = all.clone();
        all.sort();
        assert_eq!(walked, all);
    }

    #[tokio::test]
    async fn referred_insert_credits_referrer() {
        let store = MemoryEntryStore::new();
        let campaign = Uuid::new_v4();
        let referrer = store.insert_entry(new_entry("r@b.com", campaign, None)).await.unwrap();
        store
            .insert_entry(new_entry("n@b.com", campaign, Some(&referrer.referral_code)))
            .await
            .unwrap();

        let refreshed = store.entry_by_id(referrer.id).await.unwrap().unwrap();
        assert_eq!(refreshed.entry_count, 1 + REFERRAL_BONUS);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paginated() {
        let store = MemoryEntryStore::new();
        let campaign = Uuid::new_v4();
        for i in 0..5 {
            store
                .insert_entry(new_entry(&format!("u{i}@b.com"), campaign, None))
                .await
                .unwrap();
        }
        let page = store.list_entries(2, 1).await.unwrap();
        let emails: Vec<&str> = page.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(emails, vec!["u3@b.com", "u2@b.com"]);
    }

    #[tokio::test]
    async fn delete_reports_row_count() {
        let store = MemoryEntryStore::new();
        let entry = store
            .insert_entry(new_entry("a@b.com", Uuid::new_v4(), None))
            .await
            .unwrap();
        assert_eq!(store.delete_entry(entry.id).await.unwrap(), 1);
        assert_eq!(store.delete_entry(entry.id).await.unwrap(), 0);
        assert!(store.existing_entry("a@b.com").await.unwrap().is_none());
    }
}
