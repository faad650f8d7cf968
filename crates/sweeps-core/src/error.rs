//! # Validation Errors
//!
//! Every rejection carries the offending field name so the API layer can
//! surface a precise 422 message without re-inspecting the input.

use thiserror::Error;

/// Input validation failure for a single field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The field was empty or whitespace only.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the rejected field.
        field: &'static str,
    },

    /// The field exceeded its maximum length (in characters).
    #[error("{field} must be at most {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// The email address is not of the form `local@domain.tld`.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The referral code contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid referral code: {0}")]
    InvalidReferralCode(String),
}

impl ValidationError {
    /// Name of the rejected field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => *field,
            Self::InvalidEmail(_) => "email",
            Self::InvalidReferralCode(_) => "referral_code",
        }
    }
}
