//! Referral code check used by the entry form to show attribution.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sweeps_entry::referral::is_valid_referral_code;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferralCheck {
    pub code: String,
    /// Whether an entry owns this code. Lookup failures report `false`.
    pub valid: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/referrals/{code}", get(check_referral))
}

/// GET /v1/referrals/{code}: Check whether a referral code is valid.
#[utoipa::path(
    get,
    path = "/v1/referrals/{code}",
    params(("code" = String, Path, description = "Referral code")),
    responses(
        (status = 200, description = "Check result", body = ReferralCheck),
    ),
    tag = "referrals"
)]
pub async fn check_referral(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Json<ReferralCheck> {
    let valid = is_valid_referral_code(&state.store, Some(&code)).await;
    Json(ReferralCheck { code, valid })
}
