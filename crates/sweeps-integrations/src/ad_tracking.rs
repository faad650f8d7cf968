//! Ad-tracking conversion webhook.
//!
//! Posts a `Lead` event per accepted entry. The entrant's email is sent only
//! as a SHA-256 hash of its trimmed, lowercased form.

use serde::Serialize;
use sha2::{Digest, Sha256};
use sweeps_core::Entry;
use url::Url;

use crate::config::AdTrackingConfig;
use crate::{ensure_success, IntegrationError};

/// Header carrying the shared webhook secret.
pub const SECRET_HEADER: &str = "X-Webhook-Secret";

/// Conversion event name sent for every entry.
pub const LEAD_EVENT_NAME: &str = "Lead";

/// Hashed identifiers for the converting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    /// Hashed emails (hex SHA-256).
    pub em: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomData {
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub campaign_id: String,
}

/// A `Lead` conversion event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadEvent {
    pub event_name: &'static str,
    /// The entry id; receivers deduplicate on it.
    pub event_id: String,
    /// Unix seconds.
    pub event_time: i64,
    pub user_data: UserData,
    pub custom_data: CustomData,
}

impl LeadEvent {
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            event_name: LEAD_EVENT_NAME,
            event_id: entry.id.to_string(),
            event_time: entry.created_at.timestamp(),
            user_data: UserData {
                em: vec![hash_email(&entry.email)],
            },
            custom_data: CustomData {
                referral_code: entry.referral_code.clone(),
                referred_by: entry.referred_by.clone(),
                campaign_id: entry.campaign_id.to_string(),
            },
        }
    }
}

/// Lowercase hex SHA-256 of the trimmed, lowercased email.
pub fn hash_email(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}

/// Client for the ad-tracking webhook.
#[derive(Debug, Clone)]
pub struct AdTrackingClient {
    http: reqwest::Client,
    config: AdTrackingConfig,
}

impl AdTrackingClient {
    pub(crate) fn new(http: reqwest::Client, config: AdTrackingConfig) -> Self {
        Self { http, config }
    }

    pub fn webhook_url(&self) -> &Url {
        &self.config.webhook_url
    }

    /// Post `event` to the webhook. Any 2xx is success.
    pub async fn send_lead(&self, event: &LeadEvent) -> Result<(), IntegrationError> {
        let endpoint = "POST {webhook}";

        let resp = crate::retry::retry_send(endpoint, || {
            let mut req = self.http.post(self.config.webhook_url.clone()).json(event);
            if let Some(secret) = &self.config.secret {
                req = req.header(SECRET_HEADER, secret);
            }
            req.send()
        })
        .await
        .map_err(|e| IntegrationError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;

        ensure_success(endpoint, resp).await?;
        tracing::info!(event_id = %event.event_id, "lead event delivered");
        Ok(())
    }
}
