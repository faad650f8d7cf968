//! # Post-Submission Dispatch
//!
//! After an entry is created the handler publishes an "entry received"
//! notification and hands the email-list subscribe and the ad-tracking
//! `Lead` event to the [`DeferredExecutor`]. Those calls never affect the
//! HTTP response: failures are logged, counted, recorded on the
//! [`IntegrationStatusBoard`] and published as error notifications.
//!
//! [`DeferredExecutor`]: crate::deferred::DeferredExecutor

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use sweeps_core::Entry;
use sweeps_integrations::{
    Integration, IntegrationError, IntegrationsClient, LeadEvent, SubscribeOutcome, Subscriber,
};
use utoipa::ToSchema;

use crate::notify::{NotificationLevel, Notifier};
use crate::state::AppState;

/// Result of the most recent call to one integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DispatchResult {
    Succeeded,
    Failed,
}

/// Running status of one integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DispatchStatus {
    pub last_result: DispatchResult,
    pub last_error: Option<String>,
    pub last_attempt_at: DateTime<Utc>,
    pub successes: u64,
    pub failures: u64,
}

/// Last dispatch outcome per integration, shared across handlers.
#[derive(Debug, Clone, Default)]
pub struct IntegrationStatusBoard {
    inner: Arc<RwLock<BTreeMap<Integration, DispatchStatus>>>,
}

impl IntegrationStatusBoard {
    pub fn record_success(&self, integration: Integration) {
        self.record(integration, None);
    }

    pub fn record_failure(&self, integration: Integration, error: &IntegrationError) {
        self.record(integration, Some(error.to_string()));
    }

    fn record(&self, integration: Integration, error: Option<String>) {
        let result = if error.is_some() {
            DispatchResult::Failed
        } else {
            DispatchResult::Succeeded
        };
        metrics::counter!(
            "integration_dispatch_total",
            "integration" => integration.as_str(),
            "result" => match result {
                DispatchResult::Succeeded => "succeeded",
                DispatchResult::Failed => "failed",
            }
        )
        .increment(1);

        let now = Utc::now();
        let mut board = self.inner.write();
        let status = board.entry(integration).or_insert(DispatchStatus {
            last_result: result,
            last_error: None,
            last_attempt_at: now,
            successes: 0,
            failures: 0,
        });
        status.last_result = result;
        status.last_attempt_at = now;
        match error {
            Some(e) => {
                status.failures += 1;
                status.last_error = Some(e);
            }
            None => {
                status.successes += 1;
                status.last_error = None;
            }
        }
    }

    pub fn get(&self, integration: Integration) -> Option<DispatchStatus> {
        self.inner.read().get(&integration).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<Integration, DispatchStatus> {
        self.inner.read().clone()
    }
}

/// Publish the "entry received" notification and defer integration calls
/// for a newly created entry.
pub fn dispatch_created(state: &AppState, entry: &Entry) {
    state.notifier.add(
        NotificationLevel::Success,
        "Entry received",
        format!("New entry with referral code {}", entry.referral_code),
    );

    if state.integrations.is_configured(Integration::EmailList) {
        let ctx = DispatchContext::from_state(state);
        let subscriber = Subscriber::from(entry);
        state.executor.defer(Box::pin(async move {
            ctx.sync_email(&subscriber).await;
        }));
    }

    if state.integrations.is_configured(Integration::AdTracking) {
        let ctx = DispatchContext::from_state(state);
        let event = LeadEvent::from_entry(entry);
        state.executor.defer(Box::pin(async move {
            ctx.send_lead(&event).await;
        }));
    }
}

/// What a deferred task needs, detached from the request.
#[derive(Clone)]
struct DispatchContext {
    integrations: IntegrationsClient,
    notifier: Notifier,
    board: IntegrationStatusBoard,
}

impl DispatchContext {
    fn from_state(state: &AppState) -> Self {
        Self {
            integrations: state.integrations.clone(),
            notifier: state.notifier.clone(),
            board: state.integration_status.clone(),
        }
    }

    async fn sync_email(&self, subscriber: &Subscriber) {
        let result = match self.integrations.email_list() {
            Ok(client) => client.subscribe(subscriber).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(outcome) => {
                tracing::debug!(
                    already = matches!(outcome, SubscribeOutcome::AlreadySubscribed),
                    "email list sync finished"
                );
                self.board.record_success(Integration::EmailList);
            }
            Err(e) => self.fail(Integration::EmailList, "Email list sync failed", &e),
        }
    }

    async fn send_lead(&self, event: &LeadEvent) {
        let result = match self.integrations.ad_tracking() {
            Ok(client) => client.send_lead(event).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => self.board.record_success(Integration::AdTracking),
            Err(e) => self.fail(Integration::AdTracking, "Ad tracking event failed", &e),
        }
    }

    fn fail(&self, integration: Integration, title: &str, error: &IntegrationError) {
        tracing::warn!(%integration, error = %error, "integration dispatch failed");
        self.board.record_failure(integration, error);
        self.notifier
            .add(NotificationLevel::Error, title, error.to_string());
    }
}
