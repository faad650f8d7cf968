//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented handlers into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sweeps API",
        version = "0.1.0",
        description = "Sweepstakes entry submission with referral attribution, plus the admin console.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Public
        crate::routes::entries::create_entry,
        crate::routes::campaigns::resolve,
        crate::routes::referrals::check_referral,
        // Admin
        crate::routes::admin::list_entries,
        crate::routes::admin::delete_entry,
        crate::routes::admin::sync_entry_email,
        crate::routes::admin::export_sheets,
        crate::routes::admin::integrations_status,
        // Notifications
        crate::routes::notifications::list_notifications,
        crate::routes::notifications::dismiss_notification,
        crate::routes::notifications::stream_notifications,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        sweeps_core::Entry,
        sweeps_core::EntrySubmission,
        sweeps_core::Campaign,
        crate::routes::entries::AlreadyEntered,
        crate::routes::referrals::ReferralCheck,
        crate::routes::admin::EntryPage,
        crate::routes::admin::EmailSyncResponse,
        crate::routes::admin::ExportResponse,
        crate::notify::Notification,
        crate::notify::NotificationLevel,
    )),
    tags(
        (name = "entries", description = "Public entry submission"),
        (name = "campaigns", description = "Campaign resolution"),
        (name = "referrals", description = "Referral code checks"),
        (name = "admin", description = "Admin console (bearer token)"),
        (name = "notifications", description = "Operator notifications (bearer token)"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: The generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
