//! # sweeps-integrations -- Typed clients for third-party integrations
//!
//! Three optional integrations run after an entry is accepted:
//! - **Email list** subscribes the entrant to a mailing list audience
//! - **Spreadsheet** appends entries as rows for manual review and export
//! - **Ad tracking** posts a `Lead` conversion event to a webhook
//!
//! Each integration is configured independently (see [`IntegrationsConfig`]).
//! An unconfigured integration is reported as
//! [`IntegrationError::NotConfigured`] and never attempted.
//!
//! All clients share one `reqwest::Client` with the configured timeout and
//! retry transport failures with exponential backoff.

pub mod ad_tracking;
pub mod config;
pub mod email_list;
pub mod error;
pub(crate) mod retry;
pub mod sheets;

pub use ad_tracking::{AdTrackingClient, LeadEvent};
pub use config::{ConfigError, IntegrationsConfig};
pub use email_list::{EmailListClient, SubscribeOutcome, Subscriber};
pub use error::IntegrationError;
pub use sheets::{AppendSummary, SheetsClient};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// A third-party integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    EmailList,
    Spreadsheet,
    AdTracking,
}

impl Integration {
    pub const ALL: [Integration; 3] = [Self::EmailList, Self::Spreadsheet, Self::AdTracking];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailList => "email_list",
            Self::Spreadsheet => "spreadsheet",
            Self::AdTracking => "ad_tracking",
        }
    }
}

impl std::fmt::Display for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reachability of every integration, as seen by [`IntegrationsClient::health_check`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub reachable: Vec<Integration>,
    pub unreachable: Vec<Integration>,
    pub not_configured: Vec<Integration>,
}

impl HealthReport {
    /// True when no configured integration is unreachable.
    pub fn all_healthy(&self) -> bool {
        self.unreachable.is_empty()
    }
}

/// Top-level integrations client. Holds a sub-client per configured integration.
#[derive(Debug, Clone)]
pub struct IntegrationsClient {
    http: reqwest::Client,
    email_list: Option<EmailListClient>,
    sheets: Option<SheetsClient>,
    ad_tracking: Option<AdTrackingClient>,
}

impl IntegrationsClient {
    /// Build clients for every configured integration.
    pub fn new(config: IntegrationsConfig) -> Result<Self, IntegrationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("sweeps/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IntegrationError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            email_list: config
                .email_list
                .map(|cfg| EmailListClient::new(http.clone(), cfg)),
            sheets: config.sheets.map(|cfg| SheetsClient::new(http.clone(), cfg)),
            ad_tracking: config
                .ad_tracking
                .map(|cfg| AdTrackingClient::new(http.clone(), cfg)),
            http,
        })
    }

    /// A client with every integration disabled.
    pub fn disabled() -> Self {
        Self {
            http: reqwest::Client::new(),
            email_list: None,
            sheets: None,
            ad_tracking: None,
        }
    }

    /// The email list client, or `NotConfigured`.
    pub fn email_list(&self) -> Result<&EmailListClient, IntegrationError> {
        self.email_list
            .as_ref()
            .ok_or(IntegrationError::NotConfigured(Integration::EmailList))
    }

    /// The spreadsheet client, or `NotConfigured`.
    pub fn sheets(&self) -> Result<&SheetsClient, IntegrationError> {
        self.sheets
            .as_ref()
            .ok_or(IntegrationError::NotConfigured(Integration::Spreadsheet))
    }

    /// The ad-tracking client, or `NotConfigured`.
    pub fn ad_tracking(&self) -> Result<&AdTrackingClient, IntegrationError> {
        self.ad_tracking
            .as_ref()
            .ok_or(IntegrationError::NotConfigured(Integration::AdTracking))
    }

    pub fn is_configured(&self, integration: Integration) -> bool {
        match integration {
            Integration::EmailList => self.email_list.is_some(),
            Integration::Spreadsheet => self.sheets.is_some(),
            Integration::AdTracking => self.ad_tracking.is_some(),
        }
    }

    /// Send a GET to every configured integration's health URL.
    ///
    /// Any HTTP response counts as reachable; only transport failures
    /// (refused, timed out) mark an integration unreachable. Checks are not
    /// retried. For ad tracking the webhook's origin is checked, never the
    /// webhook itself.
    pub async fn health_check(&self) -> HealthReport {
        let mut report = HealthReport::default();

        for integration in Integration::ALL {
            let Some(url) = self.health_url(integration) else {
                report.not_configured.push(integration);
                continue;
            };

            match self.http.get(url).send().await {
                Ok(_) => report.reachable.push(integration),
                Err(e) => {
                    tracing::warn!(%integration, error = %e, "integration unreachable");
                    report.unreachable.push(integration);
                }
            }
        }

        report
    }

    fn health_url(&self, integration: Integration) -> Option<Url> {
        match integration {
            Integration::EmailList => self.email_list.as_ref().map(|c| c.base_url().clone()),
            Integration::Spreadsheet => self.sheets.as_ref().map(|c| c.base_url().clone()),
            Integration::AdTracking => self
                .ad_tracking
                .as_ref()
                .map(|c| origin_of(c.webhook_url())),
        }
    }
}

/// `url` with its path reset to `/` and query and fragment dropped.
fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

/// Append path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint_url(
    base: &Url,
    endpoint: &str,
    segments: &[&str],
) -> Result<Url, IntegrationError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| IntegrationError::InvalidUrl {
            endpoint: endpoint.to_string(),
            base_url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a non-success response into [`IntegrationError::Api`].
pub(crate) async fn ensure_success(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, IntegrationError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(IntegrationError::Api {
        endpoint: endpoint.to_string(),
        status,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_and_encodes_segments() {
        let base = Url::parse("https://api.example.com/3.0/").unwrap();
        let url = endpoint_url(&base, "test", &["lists", "a b", "members"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/3.0/lists/a%20b/members");

        let bare = Url::parse("https://api.example.com").unwrap();
        let url = endpoint_url(&bare, "test", &["v4", "spreadsheets"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v4/spreadsheets");
    }

    #[test]
    fn origin_drops_path_query_and_fragment() {
        let hook = Url::parse("https://ads.example.com:8443/hooks/lead?key=1#x").unwrap();
        assert_eq!(origin_of(&hook).as_str(), "https://ads.example.com:8443/");
    }

    #[test]
    fn disabled_client_reports_not_configured() {
        let client = IntegrationsClient::disabled();
        for integration in Integration::ALL {
            assert!(!client.is_configured(integration));
        }
        assert!(matches!(
            client.sheets(),
            Err(IntegrationError::NotConfigured(Integration::Spreadsheet))
        ));
    }

    #[tokio::test]
    async fn health_check_without_configuration_is_healthy() {
        let report = IntegrationsClient::disabled().health_check().await;
        assert!(report.all_healthy());
        assert_eq!(report.not_configured, Integration::ALL.to_vec());
    }

    #[test]
    fn integration_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Integration::AdTracking).unwrap(),
            "\"ad_tracking\""
        );
        assert_eq!(Integration::EmailList.to_string(), "email_list");
    }
}
