//! # Export Paging Tests
//!
//! Runs `collect_all_entries` against a memory store wrapper that changes
//! the table between pages: a submission lands and an already exported
//! entry is deleted after the first page is read.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sweeps_core::{Campaign, Entry, ExistingEntry, NewEntry, ReferralDebugRecord};
use sweeps_entry::{
    collect_all_entries, EntryCursor, EntryStore, MemoryEntryStore, StoreError,
};
use uuid::Uuid;

/// Memory store that mutates itself after the first export page.
#[derive(Debug, Clone)]
struct InterleavingStore {
    inner: MemoryEntryStore,
    pages: Arc<AtomicUsize>,
}

impl InterleavingStore {
    fn new(inner: MemoryEntryStore) -> Self {
        Self {
            inner,
            pages: Arc::new(AtomicUsize::new(0)),
        }
    }
}

fn new_entry(email: &str) -> NewEntry {
    NewEntry {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: email.into(),
        referred_by: None,
        entry_count: 1,
        campaign_id: Uuid::nil(),
    }
}

impl EntryStore for InterleavingStore {
    async fn campaign_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        self.inner.campaign_by_id(id).await
    }

    async fn campaign_by_slug(&self, slug: &str) -> Result<Option<Campaign>, StoreError> {
        self.inner.campaign_by_slug(slug).await
    }

    async fn existing_entry(&self, email: &str) -> Result<Option<ExistingEntry>, StoreError> {
        self.inner.existing_entry(email).await
    }

    async fn referral_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        self.inner.referral_code_exists(code).await
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        self.inner.insert_entry(entry).await
    }

    async fn insert_referral_debug(&self, record: ReferralDebugRecord) -> Result<(), StoreError> {
        self.inner.insert_referral_debug(record).await
    }

    async fn entry_by_id(&self, id: Uuid) -> Result<Option<Entry>, StoreError> {
        self.inner.entry_by_id(id).await
    }

    async fn list_entries(&self, limit: i64, offset: i64) -> Result<Vec<Entry>, StoreError> {
        self.inner.list_entries(limit, offset).await
    }

    async fn entries_after(
        &self,
        after: Option<EntryCursor>,
        limit: i64,
    ) -> Result<Vec<Entry>, StoreError> {
        let page = self.inner.entries_after(after, limit).await?;
        if self.pages.fetch_add(1, Ordering::SeqCst) == 0 {
            self.inner.insert_entry(new_entry("late@b.com")).await?;
            if let Some(first) = page.first() {
                self.inner.delete_entry(first.id).await?;
            }
        }
        Ok(page)
    }

    async fn delete_entry(&self, id: Uuid) -> Result<u64, StoreError> {
        self.inner.delete_entry(id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

#[tokio::test]
async fn changes_between_pages_neither_repeat_nor_skip() {
    let inner = MemoryEntryStore::new();
    let mut originals = Vec::new();
    for i in 0..7 {
        let entry = inner.insert_entry(new_entry(&format!("u{i}@b.com"))).await.unwrap();
        originals.push(entry.id);
    }
    let store = InterleavingStore::new(inner);

    let exported = collect_all_entries(&store, 3).await.unwrap();

    let ids: Vec<Uuid> = exported.iter().map(|e| e.id).collect();
    let unique: HashSet<Uuid> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "an entry was exported twice");
    for id in &originals {
        assert!(unique.contains(id), "entry {id} was skipped");
    }
    assert!(store.pages.load(Ordering::SeqCst) >= 3);
}

#[tokio::test]
async fn exact_multiple_of_page_size_terminates() {
    let store = MemoryEntryStore::new();
    for i in 0..4 {
        store.insert_entry(new_entry(&format!("u{i}@b.com"))).await.unwrap();
    }

    let exported = collect_all_entries(&store, 2).await.unwrap();
    assert_eq!(exported.len(), 4);
}

#[tokio::test]
async fn empty_store_exports_nothing() {
    let store = MemoryEntryStore::new();
    assert!(collect_all_entries(&store, 500).await.unwrap().is_empty());
}
