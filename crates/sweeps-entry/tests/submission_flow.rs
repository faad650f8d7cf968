//! # Submission Flow Tests
//!
//! Drives `submit_entry` against the in-memory store, wrapped in a store
//! that counts calls per operation and can force individual operations to
//! fail. Covers the dedup guard, referral attribution, campaign resolution,
//! and the fatal/non-fatal split between stages.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use sweeps_core::{
    Campaign, Entry, EntrySubmission, ExistingEntry, NewEntry, ReferralDebugRecord,
    DEFAULT_CAMPAIGN_SLUG,
};
use sweeps_entry::{
    submit_entry, EntryCursor, EntryStore, MemoryEntryStore, StoreError, SubmissionError, SubmissionOutcome,
    SubmissionStage,
};
use uuid::Uuid;

// -- Counting store -----------------------------------------------------------

#[derive(Debug, Default)]
struct Faults {
    campaign: AtomicBool,
    lookup: AtomicBool,
    referral: AtomicBool,
    insert: AtomicBool,
    debug_log: AtomicBool,
}

#[derive(Debug, Default)]
struct Calls {
    lookup: AtomicUsize,
    referral: AtomicUsize,
    insert: AtomicUsize,
    debug_log: AtomicUsize,
}

/// Memory store wrapper with per-operation call counters and fault switches.
#[derive(Debug, Clone)]
struct CountingStore {
    inner: MemoryEntryStore,
    faults: Arc<Faults>,
    calls: Arc<Calls>,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryEntryStore::new(),
            faults: Arc::new(Faults::default()),
            calls: Arc::new(Calls::default()),
        }
    }

    fn inserts(&self) -> usize {
        self.calls.insert.load(Ordering::SeqCst)
    }

    fn referral_queries(&self) -> usize {
        self.calls.referral.load(Ordering::SeqCst)
    }

    fn debug_writes(&self) -> usize {
        self.calls.debug_log.load(Ordering::SeqCst)
    }
}

fn forced(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
    if flag.load(Ordering::SeqCst) {
        Err(StoreError::Query(format!("forced {what} failure")))
    } else {
        Ok(())
    }
}

impl EntryStore for CountingStore {
    async fn campaign_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        forced(&self.faults.campaign, "campaign")?;
        self.inner.campaign_by_id(id).await
    }

    async fn campaign_by_slug(&self, slug: &str) -> Result<Option<Campaign>, StoreError> {
        forced(&self.faults.campaign, "campaign")?;
        self.inner.campaign_by_slug(slug).await
    }

    async fn existing_entry(&self, email: &str) -> Result<Option<ExistingEntry>, StoreError> {
        self.calls.lookup.fetch_add(1, Ordering::SeqCst);
        forced(&self.faults.lookup, "lookup")?;
        self.inner.existing_entry(email).await
    }

    async fn referral_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        self.calls.referral.fetch_add(1, Ordering::SeqCst);
        forced(&self.faults.referral, "referral")?;
        self.inner.referral_code_exists(code).await
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        self.calls.insert.fetch_add(1, Ordering::SeqCst);
        forced(&self.faults.insert, "insert")?;
        self.inner.insert_entry(entry).await
    }

    async fn insert_referral_debug(&self, record: ReferralDebugRecord) -> Result<(), StoreError> {
        self.calls.debug_log.fetch_add(1, Ordering::SeqCst);
        forced(&self.faults.debug_log, "debug log")?;
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
        self.inner.entries_after(after, limit).await
    }

    async fn delete_entry(&self, id: Uuid) -> Result<u64, StoreError> {
        self.inner.delete_entry(id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

// -- Helpers ------------------------------------------------------------------

fn submission(email: &str, referred_by: Option<&str>) -> EntrySubmission {
    EntrySubmission {
        first_name: "A".into(),
        last_name: "B".into(),
        email: email.into(),
        referred_by: referred_by.map(String::from),
        campaign_id: None,
    }
}

fn created(outcome: SubmissionOutcome) -> Entry {
    match outcome {
        SubmissionOutcome::Created(entry) => entry,
        other => panic!("expected Created, got: {other:?}"),
    }
}

// -- Creation -----------------------------------------------------------------

#[tokio::test]
async fn unique_email_creates_entry_with_code() {
    let store = CountingStore::new();
    let entry = created(submit_entry(&store, &submission("a@b.com", None)).await.unwrap());

    assert_eq!(entry.email, "a@b.com");
    assert!(!entry.referral_code.is_empty());
    assert_eq!(entry.entry_count, 1);
    assert!(entry.referred_by.is_none());

    let default = store
        .inner
        .campaign_by_slug(DEFAULT_CAMPAIGN_SLUG)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.campaign_id, default.id);
}

#[tokio::test]
async fn explicit_campaign_is_used() {
    let store = CountingStore::new();
    let summer = store.inner.add_campaign("summer-2026", "Summer Giveaway");
    let mut req = submission("a@b.com", None);
    req.campaign_id = Some(summer.id.to_string());

    let entry = created(submit_entry(&store, &req).await.unwrap());
    assert_eq!(entry.campaign_id, summer.id);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_query() {
    let store = CountingStore::new();
    let err = submit_entry(&store, &submission("not-an-email", None))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Invalid(_)));
    assert_eq!(store.calls.lookup.load(Ordering::SeqCst), 0);
    assert_eq!(store.inserts(), 0);
}

// -- Dedup guard --------------------------------------------------------------

#[tokio::test]
async fn duplicate_submission_returns_existing_without_insert() {
    let store = CountingStore::new();
    let first = created(submit_entry(&store, &submission("a@b.com", None)).await.unwrap());
    assert_eq!(store.inserts(), 1);

    let second = submit_entry(&store, &submission("a@b.com", None)).await.unwrap();
    match second {
        SubmissionOutcome::Existing { email, entry } => {
            assert_eq!(email, "a@b.com");
            assert_eq!(entry.referral_code, first.referral_code);
            assert_eq!(entry.entry_count, first.entry_count);
            assert_eq!(entry.created_at, first.created_at);
        }
        other => panic!("expected Existing, got: {other:?}"),
    }
    assert_eq!(store.inserts(), 1, "insert must not be called for an existing email");
    assert_eq!(store.referral_queries(), 0, "existing path skips referral validation");
}

#[tokio::test]
async fn mixed_case_resubmission_returns_existing() {
    let store = CountingStore::new();
    let first = created(
        submit_entry(&store, &submission("Ada@Example.com", None))
            .await
            .unwrap(),
    );
    assert_eq!(first.email, "Ada@Example.com");

    let second = submit_entry(&store, &submission("ada@example.com", None))
        .await
        .unwrap();
    match second {
        SubmissionOutcome::Existing { entry, .. } => {
            assert_eq!(entry.referral_code, first.referral_code);
        }
        other => panic!("expected Existing, got: {other:?}"),
    }
    assert_eq!(store.inserts(), 1);
    assert_eq!(store.inner.entry_count(), 1);
}

#[tokio::test]
async fn lookup_failure_is_fatal_and_skips_insert() {
    let store = CountingStore::new();
    store.faults.lookup.store(true, Ordering::SeqCst);

    let err = submit_entry(&store, &submission("a@b.com", None))
        .await
        .unwrap_err();
    match &err {
        SubmissionError::Store { stage, source } => {
            assert_eq!(*stage, SubmissionStage::CheckingExisting);
            assert_eq!(source, &StoreError::Query("forced lookup failure".into()));
        }
        other => panic!("expected Store error, got: {other:?}"),
    }
    assert!(err.to_string().contains("forced lookup failure"));
    assert_eq!(store.inserts(), 0);
}

// -- Referral attribution -----------------------------------------------------

#[tokio::test]
async fn valid_referral_code_is_recorded() {
    let store = CountingStore::new();
    let referrer = created(submit_entry(&store, &submission("r@b.com", None)).await.unwrap());

    let referred = created(
        submit_entry(&store, &submission("n@b.com", Some(&referrer.referral_code)))
            .await
            .unwrap(),
    );
    assert_eq!(referred.referred_by.as_deref(), Some(referrer.referral_code.as_str()));

    let records = store.inner.referral_debug_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].email, "n@b.com");
    assert_eq!(records[0].referral_code_used, referrer.referral_code);
    assert_eq!(records[0].new_referral_code, referred.referral_code);
}

#[tokio::test]
async fn valid_referral_credits_referrer_entry_count() {
    let store = CountingStore::new();
    let referrer = created(submit_entry(&store, &submission("r@b.com", None)).await.unwrap());
    submit_entry(&store, &submission("n@b.com", Some(&referrer.referral_code)))
        .await
        .unwrap();

    let refreshed = store.inner.entry_by_id(referrer.id).await.unwrap().unwrap();
    assert_eq!(refreshed.entry_count, 2);
}

#[tokio::test]
async fn unknown_empty_and_missing_codes_leave_referred_by_null() {
    let store = CountingStore::new();
    let cases: [(&str, Option<&str>); 3] = [
        ("x1@b.com", Some("NOPE1234")),
        ("x2@b.com", Some("")),
        ("x3@b.com", None),
    ];
    for (email, code) in cases {
        let entry = created(submit_entry(&store, &submission(email, code)).await.unwrap());
        assert!(entry.referred_by.is_none(), "{email} should not be attributed");
    }
    assert_eq!(store.referral_queries(), 1, "blank and missing codes never query");
}

#[tokio::test]
async fn referral_query_failure_degrades_to_unattributed_entry() {
    let store = CountingStore::new();
    let referrer = created(submit_entry(&store, &submission("r@b.com", None)).await.unwrap());
    store.faults.referral.store(true, Ordering::SeqCst);

    let entry = created(
        submit_entry(&store, &submission("n@b.com", Some(&referrer.referral_code)))
            .await
            .unwrap(),
    );
    assert!(entry.referred_by.is_none());
}

// -- Debug log ----------------------------------------------------------------

#[tokio::test]
async fn debug_log_failure_does_not_fail_submission() {
    let store = CountingStore::new();
    let referrer = created(submit_entry(&store, &submission("r@b.com", None)).await.unwrap());
    store.faults.debug_log.store(true, Ordering::SeqCst);

    let entry = created(
        submit_entry(&store, &submission("n@b.com", Some(&referrer.referral_code)))
            .await
            .unwrap(),
    );
    assert_eq!(entry.email, "n@b.com");
    assert_eq!(store.debug_writes(), 1);
    assert!(store.inner.referral_debug_records().is_empty());
}

#[tokio::test]
async fn no_debug_record_without_supplied_code() {
    let store = CountingStore::new();
    submit_entry(&store, &submission("a@b.com", None)).await.unwrap();
    assert_eq!(store.debug_writes(), 0);
}

// -- Campaign resolution ------------------------------------------------------

#[tokio::test]
async fn unknown_campaign_aborts_before_lookup() {
    let store = CountingStore::new();
    let mut req = submission("a@b.com", None);
    req.campaign_id = Some(Uuid::new_v4().to_string());

    let err = submit_entry(&store, &req).await.unwrap_err();
    assert!(matches!(err, SubmissionError::CampaignNotFound(_)));
    assert_eq!(store.calls.lookup.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn campaign_query_failure_is_fatal() {
    let store = CountingStore::new();
    store.faults.campaign.store(true, Ordering::SeqCst);

    let err = submit_entry(&store, &submission("a@b.com", None))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::Store {
            stage: SubmissionStage::ResolvingCampaign,
            ..
        }
    ));
}

// -- Writer -------------------------------------------------------------------

#[tokio::test]
async fn insert_failure_is_fatal_with_message_preserved() {
    let store = CountingStore::new();
    store.faults.insert.store(true, Ordering::SeqCst);

    let err = submit_entry(&store, &submission("a@b.com", None))
        .await
        .unwrap_err();
    assert_eq!(
        err.store_error(),
        Some(&StoreError::Query("forced insert failure".into()))
    );
    assert!(err.to_string().starts_with("writing failed"));
}
