//! # Admin Console
//!
//! Entry management and integration operations. Mounted behind the admin
//! bearer token (see [`crate::auth`]).

use std::collections::BTreeMap;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sweeps_core::Entry;
use sweeps_entry::{collect_all_entries, EntryStore, EXPORT_PAGE_SIZE};
use sweeps_integrations::{HealthReport, Integration, SubscribeOutcome, Subscriber};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::dispatch::DispatchStatus;
use crate::error::AppError;
use crate::extractors::{extract_validated_query, Validate};
use crate::state::AppState;

/// Default page size for entry listings.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 500;

// -- DTOs ---------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Page size, 1..=500 (default 50).
    pub limit: Option<i64>,
    /// Rows to skip (default 0).
    pub offset: Option<i64>,
}

impl ListQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

impl Validate for ListQuery {
    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.limit()) {
            return Err(format!("limit must be between 1 and {MAX_PAGE_SIZE}"));
        }
        if self.offset() < 0 {
            return Err("offset must not be negative".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EntryPage {
    pub entries: Vec<Entry>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailSyncResponse {
    pub entry_id: Uuid,
    /// `subscribed` or `already_subscribed`.
    pub outcome: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExportResponse {
    /// Entries sent, excluding the header row.
    pub exported: usize,
    /// Rows the spreadsheet reports as written, including the header.
    pub updated_rows: u64,
    pub updated_range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntegrationsReport {
    pub health: HealthReport,
    pub status: BTreeMap<Integration, DispatchStatus>,
}

// -- Router -------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/entries", get(list_entries))
        .route("/v1/admin/entries/{id}", delete(delete_entry))
        .route("/v1/admin/entries/{id}/email-sync", post(sync_entry_email))
        .route("/v1/admin/export/sheets", post(export_sheets))
        .route("/v1/admin/integrations", get(integrations_status))
}

fn entry_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

// -- Handlers -----------------------------------------------------------------

/// GET /v1/admin/entries: List entries, newest first.
#[utoipa::path(
    get,
    path = "/v1/admin/entries",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of entries", body = EntryPage),
        (status = 401, description = "Missing or invalid admin token", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid paging", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn list_entries(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<EntryPage>, AppError> {
    let query = extract_validated_query(query)?;
    let (limit, offset) = (query.limit(), query.offset());
    let entries = state.store.list_entries(limit, offset).await?;
    Ok(Json(EntryPage {
        entries,
        limit,
        offset,
    }))
}

/// DELETE /v1/admin/entries/{id}: Delete one entry.
#[utoipa::path(
    delete,
    path = "/v1/admin/entries/{id}",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = entry_id(path)?;
    match state.store.delete_entry(id).await? {
        0 => Err(AppError::NotFound(format!("entry {id}"))),
        _ => {
            tracing::info!(entry_id = %id, "entry deleted");
            Ok(StatusCode::NO_CONTENT)
        }
    }
}

/// POST /v1/admin/entries/{id}/email-sync: Subscribe one entry to the email list.
#[utoipa::path(
    post,
    path = "/v1/admin/entries/{id}/email-sync",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry synced", body = EmailSyncResponse),
        (status = 404, description = "Entry not found", body = crate::error::ErrorBody),
        (status = 502, description = "Email list provider error", body = crate::error::ErrorBody),
        (status = 503, description = "Email list not configured", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn sync_entry_email(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EmailSyncResponse>, AppError> {
    let id = entry_id(path)?;
    let entry = state
        .store
        .entry_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("entry {id}")))?;
    let client = state.integrations.email_list()?;

    match client.subscribe(&Subscriber::from(&entry)).await {
        Ok(outcome) => {
            state.integration_status.record_success(Integration::EmailList);
            let outcome = match outcome {
                SubscribeOutcome::Subscribed { .. } => "subscribed",
                SubscribeOutcome::AlreadySubscribed => "already_subscribed",
            };
            Ok(Json(EmailSyncResponse {
                entry_id: id,
                outcome: outcome.to_string(),
            }))
        }
        Err(e) => {
            state.integration_status.record_failure(Integration::EmailList, &e);
            Err(e.into())
        }
    }
}

/// POST /v1/admin/export/sheets: Replace the spreadsheet contents with
/// every entry, oldest first.
#[utoipa::path(
    post,
    path = "/v1/admin/export/sheets",
    responses(
        (status = 200, description = "Entries exported", body = ExportResponse),
        (status = 502, description = "Spreadsheet API error", body = crate::error::ErrorBody),
        (status = 503, description = "Spreadsheet not configured", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn export_sheets(State(state): State<AppState>) -> Result<Json<ExportResponse>, AppError> {
    let client = state.integrations.sheets()?;

    let entries = collect_all_entries(&state.store, EXPORT_PAGE_SIZE).await?;

    match client.export_entries(&entries).await {
        Ok(summary) => {
            state.integration_status.record_success(Integration::Spreadsheet);
            tracing::info!(exported = entries.len(), "entries exported to spreadsheet");
            Ok(Json(ExportResponse {
                exported: entries.len(),
                updated_rows: summary.updated_rows,
                updated_range: summary.updated_range,
            }))
        }
        Err(e) => {
            state.integration_status.record_failure(Integration::Spreadsheet, &e);
            Err(e.into())
        }
    }
}

/// GET /v1/admin/integrations: Probe integrations and report last dispatch status.
#[utoipa::path(
    get,
    path = "/v1/admin/integrations",
    responses(
        (status = 200, description = "Reachability and last dispatch result per integration"),
    ),
    tag = "admin"
)]
pub async fn integrations_status(State(state): State<AppState>) -> Json<IntegrationsReport> {
    let health = state.integrations.health_check().await;
    Json(IntegrationsReport {
        health,
        status: state.integration_status.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_defaults_are_valid() {
        let q = ListQuery {
            limit: None,
            offset: None,
        };
        assert!(q.validate().is_ok());
        assert_eq!(q.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn paging_bounds_are_enforced() {
        let too_big = ListQuery {
            limit: Some(MAX_PAGE_SIZE + 1),
            offset: None,
        };
        assert!(too_big.validate().is_err());
        let zero = ListQuery {
            limit: Some(0),
            offset: None,
        };
        assert!(zero.validate().is_err());
        let negative = ListQuery {
            limit: None,
            offset: Some(-1),
        };
        assert!(negative.validate().is_err());
    }
}
