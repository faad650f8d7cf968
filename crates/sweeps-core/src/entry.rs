//! # Entries
//!
//! Record types for sweepstakes entries at each point of their life:
//!
//! - [`EntrySubmission`]: raw request fields, as posted by the landing page.
//! - [`NewEntry`]: validated fields handed to the store for insertion.
//! - [`Entry`]: the stored row, including backend-generated `id` and
//!   `referral_code`.
//! - [`ExistingEntry`]: the slice of a stored row reported by the dedup guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::identity::{EmailAddress, PersonName};

/// Entry count every new entry starts with.
pub const INITIAL_ENTRY_COUNT: i32 = 1;

/// A stored sweepstakes entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Entry {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Unique code generated by the store; shared to attribute new entries.
    pub referral_code: String,
    /// Referral code of the entry that referred this one, if it was valid
    /// at write time.
    pub referred_by: Option<String>,
    /// Number of draws this entry holds. Starts at 1, grows with referrals.
    pub entry_count: i32,
    pub campaign_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields the store needs to insert an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Already-validated referrer code, or `None`.
    pub referred_by: Option<String>,
    pub entry_count: i32,
    pub campaign_id: Uuid,
}

/// What the dedup guard reports about an email that already has an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExistingEntry {
    pub referral_code: String,
    pub entry_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Diagnostic trail linking an email to the referral code it arrived with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralDebugRecord {
    pub email: String,
    /// The code the submitter supplied.
    pub referral_code_used: String,
    /// The code generated for the submitter's own new entry.
    pub new_referral_code: String,
}

/// An entry submission as received from the public form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EntrySubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub referred_by: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
}

/// Validated personal fields of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContact {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
}

impl EntrySubmission {
    /// Validate names and email. Referral code and campaign id are left to
    /// the orchestrator: neither can make a submission invalid.
    pub fn validate_contact(&self) -> Result<ValidatedContact, ValidationError> {
        Ok(ValidatedContact {
            first_name: PersonName::parse("first_name", &self.first_name)?,
            last_name: PersonName::parse("last_name", &self.last_name)?,
            email: EmailAddress::parse(&self.email)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(first: &str, last: &str, email: &str) -> EntrySubmission {
        EntrySubmission {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            referred_by: None,
            campaign_id: None,
        }
    }

    #[test]
    fn validate_contact_trims_fields() {
        let contact = submission(" Ada ", "Lovelace ", " ada@example.com")
            .validate_contact()
            .unwrap();
        assert_eq!(contact.first_name.as_str(), "Ada");
        assert_eq!(contact.last_name.as_str(), "Lovelace");
        assert_eq!(contact.email.as_str(), "ada@example.com");
    }

    #[test]
    fn validate_contact_reports_first_failing_field() {
        let err = submission("", "B", "a@b.com").validate_contact().unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "first_name" });

        let err = submission("A", "B", "not-an-email")
            .validate_contact()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail(_)));
    }

    #[test]
    fn submission_optional_fields_default_to_none() {
        let parsed: EntrySubmission = serde_json::from_str(
            r#"{"first_name":"A","last_name":"B","email":"a@b.com"}"#,
        )
        .unwrap();
        assert!(parsed.referred_by.is_none());
        assert!(parsed.campaign_id.is_none());
    }

    #[test]
    fn entry_serializes_missing_referrer_as_null() {
        let now = Utc::now();
        let entry = Entry {
            id: Uuid::new_v4(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.com".into(),
            referral_code: "ABCD1234".into(),
            referred_by: None,
            entry_count: INITIAL_ENTRY_COUNT,
            campaign_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["referred_by"].is_null());
        assert_eq!(json["entry_count"], 1);
    }
}
