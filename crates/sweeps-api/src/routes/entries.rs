//! # Entry Submission
//!
//! `POST /v1/entries` runs the entry submission flow and, for a new entry,
//! kicks off post-submission dispatch.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sweeps_core::{Entry, EntrySubmission};
use sweeps_entry::{submit_entry, SubmissionOutcome};
use utoipa::ToSchema;

use crate::dispatch::dispatch_created;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Response for an email that already has an entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlreadyEntered {
    /// Always `true`.
    pub already_entered: bool,
    pub email: String,
    pub referral_code: String,
    pub entry_count: i32,
    pub created_at: DateTime<Utc>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/entries", post(create_entry))
}

/// POST /v1/entries: Submit a sweepstakes entry.
#[utoipa::path(
    post,
    path = "/v1/entries",
    request_body = EntrySubmission,
    responses(
        (status = 201, description = "Entry created", body = Entry),
        (status = 200, description = "Email already entered", body = AlreadyEntered),
        (status = 404, description = "Campaign not found", body = crate::error::ErrorBody),
        (status = 409, description = "Concurrent duplicate submission", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "entries"
)]
pub async fn create_entry(
    State(state): State<AppState>,
    body: Result<Json<EntrySubmission>, JsonRejection>,
) -> Result<Response, AppError> {
    let submission = extract_json(body)?;

    let outcome = match submit_entry(&state.store, &submission).await {
        Ok(outcome) => outcome,
        Err(e) => {
            metrics::counter!("entries_submitted_total", "outcome" => "failed").increment(1);
            return Err(e.into());
        }
    };
    metrics::counter!("entries_submitted_total", "outcome" => outcome.label()).increment(1);

    match outcome {
        SubmissionOutcome::Created(entry) => {
            dispatch_created(&state, &entry);
            Ok((StatusCode::CREATED, Json(entry)).into_response())
        }
        SubmissionOutcome::Existing { email, entry } => {
            tracing::info!(referral_code = %entry.referral_code, "submission for existing entry");
            Ok((
                StatusCode::OK,
                Json(AlreadyEntered {
                    already_entered: true,
                    email,
                    referral_code: entry.referral_code,
                    entry_count: entry.entry_count,
                    created_at: entry.created_at,
                }),
            )
                .into_response())
        }
    }
}
