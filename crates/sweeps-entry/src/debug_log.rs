//! Referral debug logger: fire-and-forget record of which referral code an
//! email arrived with. Failures are logged and dropped, never retried.

use sweeps_core::ReferralDebugRecord;

use crate::store::EntryStore;

/// Append a referral debug record, swallowing any failure.
pub async fn log_referral_debug<S: EntryStore>(
    store: &S,
    email: &str,
    referral_code_used: &str,
    new_referral_code: &str,
) {
    let record = ReferralDebugRecord {
        email: email.to_string(),
        referral_code_used: referral_code_used.to_string(),
        new_referral_code: new_referral_code.to_string(),
    };

    if let Err(e) = store.insert_referral_debug(record).await {
        tracing::warn!(
            error = %e,
            referral_code_used,
            new_referral_code,
            "referral debug record dropped"
        );
    }
}
