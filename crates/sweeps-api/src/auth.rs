//! # Admin Authentication
//!
//! Static bearer token guarding `/v1/admin/*`:
//!
//! ```text
//! Authorization: Bearer {ADMIN_TOKEN}
//! ```
//!
//! When no token is configured the guard lets every request through; the
//! binary logs a warning at startup in that case.

use axum::extract::{Extension, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::typed_header::TypedHeaderRejection;
use axum_extra::TypedHeader;
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time token comparison.
fn token_matches(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Check `header` against `config`.
pub fn authorize(
    config: &AuthConfig,
    header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
) -> Result<(), AppError> {
    let Some(expected) = config.token.as_deref() else {
        return Ok(());
    };

    let TypedHeader(Authorization(bearer)) = header.map_err(|rejection| {
        if rejection.is_missing() {
            AppError::Unauthorized("missing bearer token".into())
        } else {
            AppError::Unauthorized("malformed authorization header".into())
        }
    })?;

    if token_matches(bearer.token(), expected) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("invalid bearer token".into()))
    }
}

/// Middleware rejecting requests without the admin token with `401`.
pub async fn admin_auth_middleware(
    Extension(config): Extension<AuthConfig>,
    header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    request: Request,
    next: Next,
) -> Response {
    match authorize(&config, header) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            tracing::debug!(path = %request.uri().path(), "admin request rejected");
            err.into_response()
        }
    }
}
