//! Error types for integration client calls.

use crate::config::ConfigError;
use crate::Integration;

/// Errors from third-party integration calls.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// The integration has no configuration; the call was not attempted.
    #[error("{0} integration is not configured")]
    NotConfigured(Integration),

    /// Transport failure (connection refused, timeout, TLS) after retries.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered with a non-success status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// A request URL could not be built from the configured base URL.
    #[error("cannot build request URL for {endpoint} from {base_url}")]
    InvalidUrl { endpoint: String, base_url: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl IntegrationError {
    /// Whether the failure was on the remote side (transport or non-2xx).
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Api { .. } | Self::Deserialization { .. })
    }

    /// HTTP status returned by the remote service, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_names_the_integration() {
        let err = IntegrationError::NotConfigured(Integration::Spreadsheet);
        assert_eq!(err.to_string(), "spreadsheet integration is not configured");
        assert!(!err.is_upstream());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn api_error_carries_status() {
        let err = IntegrationError::Api {
            endpoint: "POST /lists/{id}/members".into(),
            status: 503,
            body: "down".into(),
        };
        assert!(err.is_upstream());
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("503"));
    }
}
