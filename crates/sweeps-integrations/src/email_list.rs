//! Typed client for the email list provider.
//!
//! Subscribes entrants to a list audience with their name and referral code
//! as merge fields. Auth is HTTP basic with the API key as password.

use serde::{Deserialize, Serialize};
use sweeps_core::Entry;
use url::Url;

use crate::config::EmailListConfig;
use crate::{endpoint_url, ensure_success, IntegrationError};

// -- Types matching the provider's member schema ------------------------------

/// Merge fields attached to a list member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeFields {
    #[serde(rename = "FNAME")]
    pub first_name: String,
    #[serde(rename = "LNAME")]
    pub last_name: String,
    #[serde(rename = "REFCODE")]
    pub referral_code: String,
}

/// Request body for `POST /lists/{list_id}/members`.
#[derive(Debug, Clone, Serialize)]
pub struct MemberRequest {
    pub email_address: String,
    pub status: &'static str,
    pub merge_fields: MergeFields,
}

/// The subset of the member resource the provider echoes back.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A person to subscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub referral_code: String,
}

impl From<&Entry> for Subscriber {
    fn from(entry: &Entry) -> Self {
        Self {
            email: entry.email.clone(),
            first_name: entry.first_name.clone(),
            last_name: entry.last_name.clone(),
            referral_code: entry.referral_code.clone(),
        }
    }
}

/// Result of a subscribe call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// The member was added. Carries the provider's member id when returned.
    Subscribed { member_id: Option<String> },
    /// The address was already on the list.
    AlreadySubscribed,
}

// -- Client -------------------------------------------------------------------

/// Client for the email list provider.
#[derive(Debug, Clone)]
pub struct EmailListClient {
    http: reqwest::Client,
    config: EmailListConfig,
}

impl EmailListClient {
    pub(crate) fn new(http: reqwest::Client, config: EmailListConfig) -> Self {
        Self { http, config }
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Subscribe `subscriber` to the configured list.
    ///
    /// Calls `POST {base_url}/lists/{list_id}/members`. A `409 Conflict`, or
    /// a `400` whose title is `Member Exists`, means the address is already
    /// subscribed and is not an error.
    pub async fn subscribe(
        &self,
        subscriber: &Subscriber,
    ) -> Result<SubscribeOutcome, IntegrationError> {
        let endpoint = "POST /lists/{list_id}/members";
        let url = endpoint_url(
            &self.config.base_url,
            endpoint,
            &["lists", &self.config.list_id, "members"],
        )?;
        let body = MemberRequest {
            email_address: subscriber.email.clone(),
            status: "subscribed",
            merge_fields: MergeFields {
                first_name: subscriber.first_name.clone(),
                last_name: subscriber.last_name.clone(),
                referral_code: subscriber.referral_code.clone(),
            },
        };

        let resp = crate::retry::retry_send(endpoint, || {
            self.http
                .post(url.clone())
                .basic_auth("sweeps", Some(&self.config.api_key))
                .json(&body)
                .send()
        })
        .await
        .map_err(|e| IntegrationError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;

        match ensure_success(endpoint, resp).await {
            Ok(resp) => {
                let member: MemberResponse =
                    resp.json()
                        .await
                        .map_err(|e| IntegrationError::Deserialization {
                            endpoint: endpoint.into(),
                            source: e,
                        })?;
                tracing::info!(list_id = %self.config.list_id, "email list member subscribed");
                Ok(SubscribeOutcome::Subscribed {
                    member_id: member.id,
                })
            }
            Err(IntegrationError::Api { status, body, .. }) if is_member_exists(status, &body) => {
                tracing::debug!(list_id = %self.config.list_id, "email already on list");
                Ok(SubscribeOutcome::AlreadySubscribed)
            }
            Err(e) => Err(e),
        }
    }
}

fn is_member_exists(status: u16, body: &str) -> bool {
    status == 409 || (status == 400 && body.contains("Member Exists"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_fields_use_provider_tags() {
        let body = MemberRequest {
            email_address: "ada@example.com".into(),
            status: "subscribed",
            merge_fields: MergeFields {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                referral_code: "1A2B3C4D".into(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["merge_fields"]["FNAME"], "Ada");
        assert_eq!(json["merge_fields"]["LNAME"], "Lovelace");
        assert_eq!(json["merge_fields"]["REFCODE"], "1A2B3C4D");
        assert_eq!(json["status"], "subscribed");
    }

    #[test]
    fn member_exists_detection() {
        assert!(is_member_exists(409, ""));
        assert!(is_member_exists(400, r#"{"title":"Member Exists"}"#));
        assert!(!is_member_exists(400, r#"{"title":"Invalid Resource"}"#));
        assert!(!is_member_exists(500, "Member Exists"));
    }
}
