//! Integration client configuration.
//!
//! Each integration is configured independently and is optional: a missing
//! base URL variable leaves that integration disabled. A present URL with a
//! missing credential is a configuration error.

use url::Url;

/// Email list provider settings.
#[derive(Clone)]
pub struct EmailListConfig {
    /// API root, e.g. `https://us21.api.mailchimp.com/3.0`.
    pub base_url: Url,
    pub api_key: String,
    /// Audience/list the entrants are subscribed to.
    pub list_id: String,
}

/// Spreadsheet export settings.
#[derive(Clone)]
pub struct SheetsConfig {
    /// API root, e.g. `https://sheets.googleapis.com`.
    pub base_url: Url,
    /// OAuth bearer token.
    pub api_token: String,
    pub spreadsheet_id: String,
    /// A1 range rows are appended to, e.g. `Entries!A1`.
    pub range: String,
}

/// Ad-tracking webhook settings.
#[derive(Clone)]
pub struct AdTrackingConfig {
    pub webhook_url: Url,
    /// Shared secret sent as `X-Webhook-Secret`, if the receiver wants one.
    pub secret: Option<String>,
}

/// Configuration for all third-party integrations.
#[derive(Debug, Clone)]
pub struct IntegrationsConfig {
    pub email_list: Option<EmailListConfig>,
    pub sheets: Option<SheetsConfig>,
    pub ad_tracking: Option<AdTrackingConfig>,
    /// Request timeout in seconds, shared by every client.
    pub timeout_secs: u64,
}

/// Default spreadsheet range when `SHEETS_RANGE` is unset.
pub const DEFAULT_SHEETS_RANGE: &str = "Entries!A1";

/// Default request timeout when `INTEGRATION_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

impl std::fmt::Debug for EmailListConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailListConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("list_id", &self.list_id)
            .finish()
    }
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("range", &self.range)
            .finish()
    }
}

impl std::fmt::Debug for AdTrackingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdTrackingConfig")
            .field("webhook_url", &self.webhook_url)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            email_list: None,
            sheets: None,
            ad_tracking: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl IntegrationsConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `EMAIL_LIST_API_URL`, `EMAIL_LIST_API_KEY`, `EMAIL_LIST_ID`
    /// - `SHEETS_API_URL`, `SHEETS_API_TOKEN`, `SHEETS_SPREADSHEET_ID`,
    ///   `SHEETS_RANGE` (default: `Entries!A1`)
    /// - `AD_TRACKING_WEBHOOK_URL`, `AD_TRACKING_SECRET` (optional)
    /// - `INTEGRATION_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::MissingVar(name));

        let email_list = match var("EMAIL_LIST_API_URL") {
            Some(raw) => Some(EmailListConfig {
                base_url: parse_url("EMAIL_LIST_API_URL", &raw)?,
                api_key: required("EMAIL_LIST_API_KEY")?,
                list_id: required("EMAIL_LIST_ID")?,
            }),
            None => None,
        };

        let sheets = match var("SHEETS_API_URL") {
            Some(raw) => Some(SheetsConfig {
                base_url: parse_url("SHEETS_API_URL", &raw)?,
                api_token: required("SHEETS_API_TOKEN")?,
                spreadsheet_id: required("SHEETS_SPREADSHEET_ID")?,
                range: var("SHEETS_RANGE").unwrap_or_else(|| DEFAULT_SHEETS_RANGE.to_string()),
            }),
            None => None,
        };

        let ad_tracking = match var("AD_TRACKING_WEBHOOK_URL") {
            Some(raw) => Some(AdTrackingConfig {
                webhook_url: parse_url("AD_TRACKING_WEBHOOK_URL", &raw)?,
                secret: var("AD_TRACKING_SECRET"),
            }),
            None => None,
        };

        let timeout_secs = match var("INTEGRATION_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("INTEGRATION_TIMEOUT_SECS", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            email_list,
            sheets,
            ad_tracking,
            timeout_secs,
        })
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(var, e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(&'static str, String),
    #[error("{0} must be a non-negative integer, got {1:?}")]
    InvalidNumber(&'static str, String),
}
