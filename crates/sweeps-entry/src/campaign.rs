//! # Campaign Resolver
//!
//! Maps an optional campaign identifier to a campaign record. A missing or
//! blank identifier resolves to [`DEFAULT_CAMPAIGN_SLUG`]. An unknown
//! identifier is `Ok(None)`, not an error; only a failing query is.

use sweeps_core::{Campaign, DEFAULT_CAMPAIGN_SLUG};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::EntryStore;

/// Resolve a campaign from an optional identifier.
///
/// Identifiers that are not well-formed UUIDs cannot match any campaign
/// and resolve to `None` without touching the store.
pub async fn resolve_campaign<S: EntryStore>(
    store: &S,
    campaign_id: Option<&str>,
) -> Result<Option<Campaign>, StoreError> {
    match campaign_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => store.campaign_by_id(id).await,
            Err(_) => {
                tracing::debug!(campaign_id = %raw, "campaign id is not a UUID; unresolvable");
                Ok(None)
            }
        },
        None => store.campaign_by_slug(DEFAULT_CAMPAIGN_SLUG).await,
    }
}

/// Resolve a campaign and return only its slug.
pub async fn resolve_campaign_slug<S: EntryStore>(
    store: &S,
    campaign_id: Option<&str>,
) -> Result<Option<String>, StoreError> {
    Ok(resolve_campaign(store, campaign_id).await?.map(|c| c.slug))
}
