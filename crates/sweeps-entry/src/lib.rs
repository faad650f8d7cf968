//! # sweeps-entry: Referral Entry Creation Flow
//!
//! Composes five small components into the entry submission flow:
//!
//! | Component               | Module          | Failure policy          |
//! |-------------------------|-----------------|-------------------------|
//! | Campaign Resolver       | [`campaign`]    | fatal, propagated       |
//! | Entry Lookup (dedup)    | [`lookup`]      | fatal, propagated       |
//! | Referral Code Validator | [`referral`]    | absorbed, `false`       |
//! | Entry Writer            | [`writer`]      | fatal, propagated       |
//! | Referral Debug Logger   | [`debug_log`]   | absorbed, dropped       |
//!
//! [`submission::submit_entry`] runs them in that order. All persistence
//! goes through the [`EntryStore`] trait; [`MemoryEntryStore`] is the
//! in-process implementation used for development and tests.
//!
//! ## Concurrency
//!
//! Each submission is sequential and stateless. The dedup check and the
//! insert are separate round trips with no transaction around them: two
//! simultaneous submissions for one email can both pass the check, and the
//! loser surfaces as [`StoreError::UniqueViolation`] from the writer.

pub mod campaign;
pub mod debug_log;
pub mod error;
pub mod export;
pub mod lookup;
pub mod memory;
pub mod referral;
pub mod store;
pub mod submission;
pub mod writer;

pub use error::{
    StoreError, SubmissionError, EMAIL_UNIQUE_CONSTRAINT, REFERRAL_CODE_UNIQUE_CONSTRAINT,
};
pub use export::{collect_all_entries, EXPORT_PAGE_SIZE};
pub use memory::MemoryEntryStore;
pub use store::{EntryCursor, EntryStore};
pub use submission::{submit_entry, SubmissionOutcome, SubmissionStage};
