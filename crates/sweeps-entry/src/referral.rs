//! # Referral Code Validator
//!
//! Decides whether a submitted referral code belongs to an existing entry.
//! Attribution is best-effort: a blank or malformed code is simply not
//! credited, and a query failure is logged and treated as "invalid". This
//! module never returns an error.

use sweeps_core::ReferralCode;

use crate::store::EntryStore;

/// Validate `code` against the store, returning the parsed code when it
/// matches an existing entry.
///
/// Blank or malformed input returns `None` without querying.
pub async fn validate_referral<S: EntryStore>(
    store: &S,
    code: Option<&str>,
) -> Option<ReferralCode> {
    let code = match ReferralCode::parse(code?) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = %e, "referral code rejected before lookup");
            return None;
        }
    };

    match store.referral_code_exists(code.as_str()).await {
        Ok(true) => Some(code),
        Ok(false) => {
            tracing::info!(referral_code = %code, "referral code does not match any entry");
            None
        }
        Err(e) => {
            tracing::warn!(
                referral_code = %code,
                error = %e,
                "referral code lookup failed; treating code as invalid"
            );
            None
        }
    }
}

/// Whether `code` corresponds to an existing entry.
pub async fn is_valid_referral_code<S: EntryStore>(store: &S, code: Option<&str>) -> bool {
    validate_referral(store, code).await.is_some()
}
