//! # Validated Input Newtypes
//!
//! Newtype wrappers for the user-supplied strings that reach the entry
//! store. Construction always goes through `parse`, which trims
//! surrounding whitespace and enforces length and shape limits.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Maximum length of the local part of an email address.
const MAX_LOCAL_PART_LEN: usize = 64;

/// Maximum length of a first or last name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a referral code.
pub const MAX_REFERRAL_CODE_LEN: usize = 64;

/// A syntactically valid email address.
///
/// Case is preserved for display; only surrounding whitespace is removed.
/// Uniqueness is decided on [`EmailAddress::dedup_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and validate an email address.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }
        let len = value.chars().count();
        if len > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
                actual: len,
            });
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidEmail(value.to_string()));
        }

        let (local, domain) = value
            .split_once('@')
            .ok_or_else(|| ValidationError::InvalidEmail(value.to_string()))?;

        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains("..");
        if local.is_empty() || local.len() > MAX_LOCAL_PART_LEN || !domain_ok {
            return Err(ValidationError::InvalidEmail(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key two addresses are compared on when checking for duplicates.
    pub fn dedup_key(&self) -> String {
        email_dedup_key(&self.0)
    }

    /// Consume the newtype, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Case-folded, trimmed form of a stored or submitted email.
///
/// Matches `lower(email)` in the `entries_email_key` index.
pub fn email_dedup_key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A first or last name: non-blank, at most [`MAX_NAME_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Parse a name, reporting failures against `field`.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(ValidationError::Empty { field });
        }
        let len = value.chars().count();
        if len > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_NAME_LEN,
                actual: len,
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse("name", &value)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

/// A referral code as submitted by a visitor.
///
/// Parsing only checks shape. Whether the code belongs to an existing
/// entry is decided by the referral validator against the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferralCode(String);

impl ReferralCode {
    /// Parse a referral code. Blank input is [`ValidationError::Empty`].
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: "referral_code",
            });
        }
        if value.len() > MAX_REFERRAL_CODE_LEN {
            return Err(ValidationError::TooLong {
                field: "referral_code",
                max: MAX_REFERRAL_CODE_LEN,
                actual: value.len(),
            });
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::InvalidReferralCode(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ReferralCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReferralCode> for String {
    fn from(value: ReferralCode) -> Self {
        value.0
    }
}

impl std::fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
