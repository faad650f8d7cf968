//! # Campaigns
//!
//! A campaign is a named sweepstakes instance. Entries belong to exactly
//! one campaign. This service reads campaigns but never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Slug of the campaign used when a submission names none.
pub const DEFAULT_CAMPAIGN_SLUG: &str = "default";

/// A sweepstakes campaign and its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Campaign {
    pub id: Uuid,
    /// Human-readable unique identifier, e.g. `"default"` or `"summer-2026"`.
    pub slug: String,
    pub title: String,
    pub prize: Option<String>,
    pub audience: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Whether this is the campaign used for submissions without an id.
    pub fn is_default(&self) -> bool {
        self.slug == DEFAULT_CAMPAIGN_SLUG
    }
}
