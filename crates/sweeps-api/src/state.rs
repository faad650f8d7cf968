//! # Application State
//!
//! Shared state passed to every handler: configuration, the entry store
//! backend, integration clients, the notifier, the deferred executor and
//! the integration status board.
//!
//! The store is an enum over the two backends so handlers stay monomorphic:
//! Postgres when `DATABASE_URL` is set, in-memory otherwise.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sweeps_core::{Campaign, Entry, ExistingEntry, NewEntry, ReferralDebugRecord};
use sweeps_entry::{EntryCursor, EntryStore, MemoryEntryStore, StoreError};
use sweeps_integrations::IntegrationsClient;
use uuid::Uuid;

use crate::db::PgEntryStore;
use crate::deferred::{select_executor, DeferredExecutor};
use crate::dispatch::IntegrationStatusBoard;
use crate::notify::Notifier;

/// Default per-client request budget for one minute.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u64 = 60;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application configuration, read once at startup.
///
/// Custom `Debug` redacts the admin token and database URL.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Static bearer token for `/v1/admin/*`. `None` disables admin auth.
    pub admin_token: Option<String>,
    /// Allowed CORS origin. `None` allows any origin.
    pub cors_allowed_origin: Option<String>,
    pub rate_limit_per_minute: u64,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("admin_token", &self.admin_token.as_ref().map(|_| "[REDACTED]"))
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            admin_token: None,
            cors_allowed_origin: None,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            log_format: LogFormat::Text,
        }
    }
}

/// Errors reading [`AppConfig`] from the environment.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("LOG_FORMAT must be \"text\" or \"json\", got {0:?}")]
    InvalidLogFormat(String),
}

impl AppConfig {
    /// Load from `PORT`, `DATABASE_URL`, `ADMIN_TOKEN`, `CORS_ALLOWED_ORIGIN`,
    /// `RATE_LIMIT_PER_MINUTE` and `LOG_FORMAT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { var: "PORT", value })?,
            None => defaults.port,
        };

        let rate_limit_per_minute = match var("RATE_LIMIT_PER_MINUTE") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: "RATE_LIMIT_PER_MINUTE",
                value,
            })?,
            None => defaults.rate_limit_per_minute,
        };

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        Ok(Self {
            port,
            database_url: var("DATABASE_URL"),
            admin_token: var("ADMIN_TOKEN"),
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN"),
            rate_limit_per_minute,
            log_format,
        })
    }
}

// -- Store backend ------------------------------------------------------------

/// The configured entry store.
#[derive(Debug, Clone)]
pub enum EntryBackend {
    Postgres(PgEntryStore),
    Memory(MemoryEntryStore),
}

impl EntryBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

impl EntryStore for EntryBackend {
    async fn campaign_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        match self {
            Self::Postgres(s) => s.campaign_by_id(id).await,
            Self::Memory(s) => s.campaign_by_id(id).await,
        }
    }

    async fn campaign_by_slug(&self, slug: &str) -> Result<Option<Campaign>, StoreError> {
        match self {
            Self::Postgres(s) => s.campaign_by_slug(slug).await,
            Self::Memory(s) => s.campaign_by_slug(slug).await,
        }
    }

    async fn existing_entry(&self, email: &str) -> Result<Option<ExistingEntry>, StoreError> {
        match self {
            Self::Postgres(s) => s.existing_entry(email).await,
            Self::Memory(s) => s.existing_entry(email).await,
        }
    }

    async fn referral_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        match self {
            Self::Postgres(s) => s.referral_code_exists(code).await,
            Self::Memory(s) => s.referral_code_exists(code).await,
        }
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        match self {
            Self::Postgres(s) => s.insert_entry(entry).await,
            Self::Memory(s) => s.insert_entry(entry).await,
        }
    }

    async fn insert_referral_debug(&self, record: ReferralDebugRecord) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.insert_referral_debug(record).await,
            Self::Memory(s) => s.insert_referral_debug(record).await,
        }
    }

    async fn entry_by_id(&self, id: Uuid) -> Result<Option<Entry>, StoreError> {
        match self {
            Self::Postgres(s) => s.entry_by_id(id).await,
            Self::Memory(s) => s.entry_by_id(id).await,
        }
    }

    async fn list_entries(&self, limit: i64, offset: i64) -> Result<Vec<Entry>, StoreError> {
        match self {
            Self::Postgres(s) => s.list_entries(limit, offset).await,
            Self::Memory(s) => s.list_entries(limit, offset).await,
        }
    }

    async fn entries_after(
        &self,
        after: Option<EntryCursor>,
        limit: i64,
    ) -> Result<Vec<Entry>, StoreError> {
        match self {
            Self::Postgres(s) => s.entries_after(after, limit).await,
            Self::Memory(s) => s.entries_after(after, limit).await,
        }
    }

    async fn delete_entry(&self, id: Uuid) -> Result<u64, StoreError> {
        match self {
            Self::Postgres(s) => s.delete_entry(id).await,
            Self::Memory(s) => s.delete_entry(id).await,
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.ping().await,
            Self::Memory(s) => s.ping().await,
        }
    }
}

// -- AppState -----------------------------------------------------------------

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: EntryBackend,
    pub integrations: IntegrationsClient,
    pub notifier: Notifier,
    pub executor: Arc<dyn DeferredExecutor>,
    pub integration_status: IntegrationStatusBoard,
    /// Prometheus render handle. `None` when no recorder was installed.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store.kind())
            .field("executor", &self.executor.name())
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State with a fresh notifier and status board and a runtime-selected
    /// deferred executor.
    pub fn new(config: AppConfig, store: EntryBackend, integrations: IntegrationsClient) -> Self {
        Self {
            config: Arc::new(config),
            store,
            integrations,
            notifier: Notifier::default(),
            executor: select_executor(),
            integration_status: IntegrationStatusBoard::default(),
            metrics: None,
        }
    }

    /// In-memory store, no integrations, default config.
    pub fn in_memory() -> Self {
        Self::new(
            AppConfig::default(),
            EntryBackend::Memory(MemoryEntryStore::new()),
            IntegrationsClient::disabled(),
        )
    }

    pub fn with_executor(mut self, executor: Arc<dyn DeferredExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
