//! # sweeps-api: Axum API Service for the Sweepstakes Entry Flow
//!
//! ## API Surface
//!
//! | Prefix                        | Module                       | Auth  |
//! |-------------------------------|------------------------------|-------|
//! | `/v1/entries`                 | [`routes::entries`]          | none  |
//! | `/v1/campaigns/*`             | [`routes::campaigns`]        | none  |
//! | `/v1/referrals/*`             | [`routes::referrals`]        | none  |
//! | `/v1/admin/*`                 | [`routes::admin`]            | admin |
//! | `/v1/admin/notifications/*`   | [`routes::notifications`]    | admin |
//! | `/health/*`, `/metrics`, `/openapi.json` | this module       | none  |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! Cors → TraceLayer → Metrics → RateLimit (/v1) → AdminAuth (/v1/admin) → Handler
//! ```

pub mod auth;
pub mod db;
pub mod deferred;
pub mod dispatch;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod notify;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use sweeps_entry::EntryStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::error::{AppError, ErrorBody};
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Assemble the application router with all routes and middleware.
///
/// Health probes, `/metrics` and `/openapi.json` sit outside the rate limiter.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.admin_token.clone(),
    };
    let limiter = RateLimiter::new(RateLimitConfig::per_minute(
        state.config.rate_limit_per_minute,
    ));
    let cors = cors_layer(state.config.cors_allowed_origin.as_deref());

    let admin = Router::new()
        .merge(routes::admin::router())
        .merge(routes::notifications::router())
        .layer(from_fn(auth::admin_auth_middleware));

    let api = Router::new()
        .merge(routes::entries::router())
        .merge(routes::campaigns::router())
        .merge(routes::referrals::router())
        .merge(admin)
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(limiter));

    let ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(render_metrics))
        .merge(openapi::router());

    Router::new()
        .merge(ops)
        .merge(api)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = allowed_origin else {
        return CorsLayer::permissive();
    };
    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(_) => {
            tracing::warn!(origin, "invalid CORS_ALLOWED_ORIGIN, cross-origin requests disabled");
            CorsLayer::new()
        }
    }
}

/// Liveness probe: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 when the entry store answers.
async fn readiness(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => "ready".into_response(),
        Err(e) => {
            tracing::warn!(error = %e, store = state.store.kind(), "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody::new("NOT_READY", "entry store unavailable")),
            )
                .into_response()
        }
    }
}

/// Prometheus text exposition, when a recorder is installed.
async fn render_metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::NotFound("metrics recorder not installed".into()))
}
