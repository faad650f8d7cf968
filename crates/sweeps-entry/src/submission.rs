//! # Entry Submission Orchestrator
//!
//! Runs one submission through a fixed sequence of stages:
//!
//! ```text
//! ResolvingCampaign → CheckingExisting → ValidatingReferral → Writing → LoggingDebug → Done
//! ```
//!
//! `ResolvingCampaign`, `CheckingExisting` and `Writing` are fatal: a
//! failure there aborts the flow with a [`SubmissionError`].
//! `ValidatingReferral` and `LoggingDebug` are not: their failures are
//! absorbed and the flow continues with `referred_by = None` or without a
//! debug record.
//!
//! An email that already has an entry ends the flow after
//! `CheckingExisting` with [`SubmissionOutcome::Existing`]; the writer is
//! never called for it.

use serde::{Deserialize, Serialize};
use sweeps_core::{Entry, EntrySubmission, ExistingEntry, NewEntry, INITIAL_ENTRY_COUNT};

use crate::campaign::resolve_campaign;
use crate::debug_log::log_referral_debug;
use crate::error::SubmissionError;
use crate::lookup::find_existing_entry;
use crate::referral::validate_referral;
use crate::store::EntryStore;
use crate::writer::write_entry;

/// A stage of the submission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStage {
    ResolvingCampaign,
    CheckingExisting,
    ValidatingReferral,
    Writing,
    LoggingDebug,
    /// Terminal success.
    Done,
}

impl SubmissionStage {
    /// The stage that follows this one on the success path.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::ResolvingCampaign => Some(Self::CheckingExisting),
            Self::CheckingExisting => Some(Self::ValidatingReferral),
            Self::ValidatingReferral => Some(Self::Writing),
            Self::Writing => Some(Self::LoggingDebug),
            Self::LoggingDebug => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Whether a failure in this stage aborts the submission.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::ResolvingCampaign | Self::CheckingExisting | Self::Writing
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResolvingCampaign => "resolving_campaign",
            Self::CheckingExisting => "checking_existing",
            Self::ValidatingReferral => "validating_referral",
            Self::Writing => "writing",
            Self::LoggingDebug => "logging_debug",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a submission that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// A new entry was written.
    Created(Entry),
    /// The email already had an entry; nothing was written.
    Existing {
        email: String,
        entry: ExistingEntry,
    },
}

impl SubmissionOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Existing { .. } => "existing",
        }
    }
}

/// Tracks the current stage and logs every transition.
struct Progress {
    stage: SubmissionStage,
}

impl Progress {
    fn start() -> Self {
        tracing::debug!(stage = %SubmissionStage::ResolvingCampaign, "submission started");
        Self {
            stage: SubmissionStage::ResolvingCampaign,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            tracing::debug!(from = %self.stage, to = %next, "submission stage transition");
            self.stage = next;
        }
    }

    fn fail(&self, source: crate::error::StoreError) -> SubmissionError {
        debug_assert!(self.stage.is_fatal(), "non-fatal stage {} raised", self.stage);
        SubmissionError::Store {
            stage: self.stage,
            source,
        }
    }
}

/// Run one entry submission against `store`.
pub async fn submit_entry<S: EntryStore>(
    store: &S,
    submission: &EntrySubmission,
) -> Result<SubmissionOutcome, SubmissionError> {
    let contact = submission.validate_contact()?;
    let mut progress = Progress::start();

    // ResolvingCampaign
    let campaign = resolve_campaign(store, submission.campaign_id.as_deref())
        .await
        .map_err(|e| progress.fail(e))?
        .ok_or_else(|| {
            let requested = submission
                .campaign_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .unwrap_or(sweeps_core::DEFAULT_CAMPAIGN_SLUG);
            tracing::warn!(campaign = %requested, "submission for unresolvable campaign");
            SubmissionError::CampaignNotFound(requested.to_string())
        })?;
    progress.advance();

    // CheckingExisting
    let existing = find_existing_entry(store, &contact.email)
        .await
        .map_err(|e| progress.fail(e))?;
    if let Some(existing) = existing {
        return Ok(SubmissionOutcome::Existing {
            email: contact.email.into_inner(),
            entry: existing,
        });
    }
    progress.advance();

    // ValidatingReferral
    let referred_by = validate_referral(store, submission.referred_by.as_deref()).await;
    progress.advance();

    // Writing
    let entry = write_entry(
        store,
        NewEntry {
            first_name: contact.first_name.into_inner(),
            last_name: contact.last_name.into_inner(),
            email: contact.email.into_inner(),
            referred_by: referred_by.map(|code| code.into_inner()),
            entry_count: INITIAL_ENTRY_COUNT,
            campaign_id: campaign.id,
        },
    )
    .await
    .map_err(|e| progress.fail(e))?;
    progress.advance();

    // LoggingDebug
    if let Some(used) = submission
        .referred_by
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
    {
        log_referral_debug(store, &entry.email, used, &entry.referral_code).await;
    }
    progress.advance();

    Ok(SubmissionOutcome::Created(entry))
}
