//! # sweeps-core: Foundational Types for the Sweepstakes Service
//!
//! Defines the data model shared by every other crate in the workspace:
//! entries, campaigns, referral debug records, and the validated newtypes
//! that stand between raw request input and the entry store.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes at the boundary.** `EmailAddress`, `PersonName`
//!    and `ReferralCode` can only be built through their `parse`
//!    constructors. The orchestrator never sees a raw request string.
//!
//! 2. **Backend-owned identifiers.** Entry ids and referral codes are
//!    generated by the store on insert. `NewEntry` deliberately has no
//!    field for either.
//!
//! 3. **`referred_by` is attribution, not a foreign key.** It is checked
//!    once at write time and never re-validated afterwards.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sweeps-*` crates.
//! - No `unsafe` code, no `.unwrap()` outside tests.

pub mod campaign;
pub mod entry;
pub mod error;
pub mod identity;

pub use campaign::{Campaign, DEFAULT_CAMPAIGN_SLUG};
pub use entry::{
    Entry, EntrySubmission, ExistingEntry, NewEntry, ReferralDebugRecord, ValidatedContact,
    INITIAL_ENTRY_COUNT,
};
pub use error::ValidationError;
pub use identity::{email_dedup_key, EmailAddress, PersonName, ReferralCode};
