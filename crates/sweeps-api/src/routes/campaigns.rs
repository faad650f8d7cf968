//! Campaign lookup for the public entry form.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use sweeps_core::Campaign;
use sweeps_entry::campaign::resolve_campaign;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::extractors::extract_query;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ResolveQuery {
    /// Campaign UUID. Omitted or blank selects the default campaign.
    pub campaign_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/campaigns/resolve", get(resolve))
}

/// GET /v1/campaigns/resolve: Resolve a campaign id (or the default).
#[utoipa::path(
    get,
    path = "/v1/campaigns/resolve",
    params(ResolveQuery),
    responses(
        (status = 200, description = "Campaign found", body = Campaign),
        (status = 404, description = "No such campaign", body = crate::error::ErrorBody),
    ),
    tag = "campaigns"
)]
pub async fn resolve(
    State(state): State<AppState>,
    query: Result<Query<ResolveQuery>, QueryRejection>,
) -> Result<Json<Campaign>, AppError> {
    let query = extract_query(query)?;
    resolve_campaign(&state.store, query.campaign_id.as_deref())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("campaign not found".into()))
}
