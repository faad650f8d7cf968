//! # Entry Flow Errors
//!
//! [`StoreError`] is what an [`EntryStore`](crate::EntryStore) backend
//! reports. [`SubmissionError`] is what the orchestrator returns: it tags
//! store failures with the stage that raised them and keeps the original
//! message in its `Display` output.

use sweeps_core::ValidationError;
use thiserror::Error;

use crate::submission::SubmissionStage;

/// Unique constraint on the case-folded email.
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "entries_email_key";

/// Unique constraint on the generated referral code.
pub const REFERRAL_CODE_UNIQUE_CONSTRAINT: &str = "entries_referral_code_key";

/// Failure reported by an entry store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An insert collided with a unique constraint (duplicate email or code).
    #[error("duplicate key violates unique constraint \"{constraint}\"")]
    UniqueViolation { constraint: String },

    /// The backend could not be reached (pool exhausted, connection refused).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The query itself failed.
    #[error("query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// Whether this error is a uniqueness collision.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    /// Whether this is a collision on the generated referral code. Such a
    /// collision says nothing about the submitter and a retry will succeed.
    pub fn is_referral_code_collision(&self) -> bool {
        matches!(
            self,
            Self::UniqueViolation { constraint } if constraint == REFERRAL_CODE_UNIQUE_CONSTRAINT
        )
    }
}

/// Failure of a whole entry submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The submission did not pass input validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The named campaign (or the default one) does not exist.
    #[error("campaign not found: {0}")]
    CampaignNotFound(String),

    /// A fatal stage failed in the store.
    #[error("{stage} failed: {source}")]
    Store {
        stage: SubmissionStage,
        #[source]
        source: StoreError,
    },
}

impl SubmissionError {
    /// The underlying store error, if this failure came from the store.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Store { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_collision_is_told_apart_from_duplicate_email() {
        let code = StoreError::UniqueViolation {
            constraint: REFERRAL_CODE_UNIQUE_CONSTRAINT.into(),
        };
        let email = StoreError::UniqueViolation {
            constraint: EMAIL_UNIQUE_CONSTRAINT.into(),
        };
        assert!(code.is_referral_code_collision());
        assert!(!email.is_referral_code_collision());
        assert!(email.is_unique_violation());
    }

    #[test]
    fn store_failure_keeps_original_message() {
        let err = SubmissionError::Store {
            stage: SubmissionStage::Writing,
            source: StoreError::Query("connection reset by peer".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("connection reset by peer"), "got: {msg}");
        assert!(msg.contains("writing"), "got: {msg}");
    }

    #[test]
    fn validation_error_is_transparent() {
        let err = SubmissionError::from(ValidationError::Empty { field: "email" });
        assert_eq!(err.to_string(), "email must not be empty");
        assert!(err.store_error().is_none());
    }

    #[test]
    fn unique_violation_is_detected() {
        let err = StoreError::UniqueViolation {
            constraint: "entries_email_key".into(),
        };
        assert!(err.is_unique_violation());
        assert!(!StoreError::Unavailable("down".into()).is_unique_violation());
    }
}
