//! Typed client for spreadsheet export.
//!
//! Appends rows to a configured range with the `values:append` call of the
//! Sheets v4 API. Values are written raw; the sheet applies no parsing.
//!
//! A full export is a snapshot: the target sheet is cleared with
//! `values:clear` first, so repeated exports never stack copies.

use serde::{Deserialize, Serialize};
use sweeps_core::Entry;
use url::Url;

use crate::config::SheetsConfig;
use crate::{endpoint_url, ensure_success, IntegrationError};

/// Column headers written as the first row of an export.
pub const EXPORT_HEADER: [&str; 9] = [
    "id",
    "first_name",
    "last_name",
    "email",
    "referral_code",
    "referred_by",
    "entry_count",
    "campaign_id",
    "created_at",
];

// -- Types matching the Sheets v4 schema --------------------------------------

/// Request body for `values:append`.
#[derive(Debug, Clone, Serialize)]
pub struct ValueRange<'a> {
    pub values: &'a [Vec<String>],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: Option<UpdateSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSummary {
    #[serde(default)]
    updated_range: Option<String>,
    #[serde(default)]
    updated_rows: u64,
}

/// What an append call wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendSummary {
    pub updated_range: Option<String>,
    pub updated_rows: u64,
}

/// Sheet part of an A1 range (`Entries!A1` → `Entries`). A range without
/// a sheet name is returned unchanged.
pub fn sheet_of_range(range: &str) -> &str {
    range.rsplit_once('!').map_or(range, |(sheet, _)| sheet)
}

/// One spreadsheet row for `entry`, in [`EXPORT_HEADER`] order.
pub fn entry_row(entry: &Entry) -> Vec<String> {
    vec![
        entry.id.to_string(),
        entry.first_name.clone(),
        entry.last_name.clone(),
        entry.email.clone(),
        entry.referral_code.clone(),
        entry.referred_by.clone().unwrap_or_default(),
        entry.entry_count.to_string(),
        entry.campaign_id.to_string(),
        entry.created_at.to_rfc3339(),
    ]
}

// -- Client -------------------------------------------------------------------

/// Client for the spreadsheet API.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    config: SheetsConfig,
}

impl SheetsClient {
    pub(crate) fn new(http: reqwest::Client, config: SheetsConfig) -> Self {
        Self { http, config }
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Append `rows` after the last row of the configured range.
    ///
    /// Calls `POST {base_url}/v4/spreadsheets/{id}/values/{range}:append?valueInputOption=RAW`.
    pub async fn append_rows(&self, rows: &[Vec<String>]) -> Result<AppendSummary, IntegrationError> {
        let endpoint = "POST /v4/spreadsheets/{id}/values/{range}:append";
        let append = format!("{}:append", self.config.range);
        let mut url = endpoint_url(
            &self.config.base_url,
            endpoint,
            &["v4", "spreadsheets", &self.config.spreadsheet_id, "values", &append],
        )?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = ValueRange { values: rows };

        let resp = crate::retry::retry_send(endpoint, || {
            self.http
                .post(url.clone())
                .bearer_auth(&self.config.api_token)
                .json(&body)
                .send()
        })
        .await
        .map_err(|e| IntegrationError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;

        let resp = ensure_success(endpoint, resp).await?;
        let parsed: AppendResponse =
            resp.json()
                .await
                .map_err(|e| IntegrationError::Deserialization {
                    endpoint: endpoint.into(),
                    source: e,
                })?;

        let summary = match parsed.updates {
            Some(updates) => AppendSummary {
                updated_range: updates.updated_range,
                updated_rows: updates.updated_rows,
            },
            None => AppendSummary {
                updated_range: None,
                updated_rows: 0,
            },
        };
        tracing::info!(
            spreadsheet_id = %self.config.spreadsheet_id,
            rows = summary.updated_rows,
            "spreadsheet rows appended"
        );
        Ok(summary)
    }

    /// Clear every value on the sheet the configured range points at.
    ///
    /// Calls `POST {base_url}/v4/spreadsheets/{id}/values/{sheet}:clear`.
    pub async fn clear_sheet(&self) -> Result<(), IntegrationError> {
        let endpoint = "POST /v4/spreadsheets/{id}/values/{range}:clear";
        let clear = format!("{}:clear", sheet_of_range(&self.config.range));
        let url = endpoint_url(
            &self.config.base_url,
            endpoint,
            &["v4", "spreadsheets", &self.config.spreadsheet_id, "values", &clear],
        )?;

        let resp = crate::retry::retry_send(endpoint, || {
            self.http
                .post(url.clone())
                .bearer_auth(&self.config.api_token)
                .json(&serde_json::json!({}))
                .send()
        })
        .await
        .map_err(|e| IntegrationError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;

        ensure_success(endpoint, resp).await?;
        tracing::debug!(spreadsheet_id = %self.config.spreadsheet_id, "spreadsheet cleared");
        Ok(())
    }

    /// Replace the sheet contents with a header row followed by one row
    /// per entry.
    pub async fn export_entries(&self, entries: &[Entry]) -> Result<AppendSummary, IntegrationError> {
        self.clear_sheet().await?;

        let mut rows = Vec::with_capacity(entries.len() + 1);
        rows.push(EXPORT_HEADER.iter().map(|h| h.to_string()).collect());
        rows.extend(entries.iter().map(entry_row));
        self.append_rows(&rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(referred_by: Option<&str>) -> Entry {
        let now = Utc::now();
        Entry {
            id: Uuid::new_v4(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            referral_code: "0BADF00D".into(),
            referred_by: referred_by.map(str::to_string),
            entry_count: 3,
            campaign_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_matches_header_order() {
        let e = entry(Some("CAFEBABE"));
        let row = entry_row(&e);
        assert_eq!(row.len(), EXPORT_HEADER.len());
        assert_eq!(row[3], "grace@example.com");
        assert_eq!(row[4], "0BADF00D");
        assert_eq!(row[5], "CAFEBABE");
        assert_eq!(row[6], "3");
    }

    #[test]
    fn sheet_name_is_taken_from_range() {
        assert_eq!(sheet_of_range("Entries!A1"), "Entries");
        assert_eq!(sheet_of_range("'Q3 Leads'!A1:I"), "'Q3 Leads'");
        assert_eq!(sheet_of_range("Entries"), "Entries");
    }

    #[test]
    fn missing_referrer_is_an_empty_cell() {
        let row = entry_row(&entry(None));
        assert_eq!(row[5], "");
    }
}
