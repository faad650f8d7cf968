//! Entry, campaign and referral debug persistence.
//!
//! [`PgEntryStore`] implements [`EntryStore`] over the `entries`,
//! `campaigns` and `referral_debug_log` tables. Every method is a single
//! statement; there are no transactions.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sweeps_core::{Campaign, Entry, ExistingEntry, NewEntry, ReferralDebugRecord};
use sweeps_entry::{EntryCursor, EntryStore, StoreError};
use uuid::Uuid;

const ENTRY_COLUMNS: &str = "id, first_name, last_name, email, referral_code, referred_by, \
                             entry_count, campaign_id, created_at, updated_at";

const CAMPAIGN_COLUMNS: &str = "id, slug, title, prize, audience, created_at";

/// Postgres-backed entry store.
#[derive(Debug, Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translate a SQLx error into the store's error vocabulary.
///
/// Unique violations keep the constraint name so callers can tell a
/// duplicate email from a referral code collision.
fn store_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation {
                constraint: db_err.constraint().unwrap_or("unknown").to_string(),
            };
        }
    }
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

impl EntryStore for PgEntryStore {
    async fn campaign_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        let row = sqlx::query_as::<_, CampaignRow>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(CampaignRow::into_record))
    }

    async fn campaign_by_slug(&self, slug: &str) -> Result<Option<Campaign>, StoreError> {
        let row = sqlx::query_as::<_, CampaignRow>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(CampaignRow::into_record))
    }

    async fn existing_entry(&self, email: &str) -> Result<Option<ExistingEntry>, StoreError> {
        let row = sqlx::query_as::<_, ExistingRow>(
            "SELECT referral_code, entry_count, created_at FROM entries WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(|r| ExistingEntry {
            referral_code: r.referral_code,
            entry_count: r.entry_count,
            created_at: r.created_at,
        }))
    }

    async fn referral_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM entries WHERE referral_code = $1)",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "INSERT INTO entries (first_name, last_name, email, referred_by, entry_count, campaign_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(&entry.first_name)
        .bind(&entry.last_name)
        .bind(&entry.email)
        .bind(&entry.referred_by)
        .bind(entry.entry_count)
        .bind(entry.campaign_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.into_record())
    }

    async fn insert_referral_debug(&self, record: ReferralDebugRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO referral_debug_log (email, referral_code_used, new_referral_code)
             VALUES ($1, $2, $3)",
        )
        .bind(&record.email)
        .bind(&record.referral_code_used)
        .bind(&record.new_referral_code)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn entry_by_id(&self, id: Uuid) -> Result<Option<Entry>, StoreError> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(EntryRow::into_record))
    }

    async fn list_entries(&self, limit: i64, offset: i64) -> Result<Vec<Entry>, StoreError> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(EntryRow::into_record).collect())
    }

    async fn entries_after(
        &self,
        after: Option<EntryCursor>,
        limit: i64,
    ) -> Result<Vec<Entry>, StoreError> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries
             WHERE $1::timestamptz IS NULL OR (created_at, id) > ($1::timestamptz, $2::uuid)
             ORDER BY created_at, id
             LIMIT $3"
        ))
        .bind(after.map(|c| c.created_at))
        .bind(after.map(|c| c.id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(EntryRow::into_record).collect())
    }

    async fn delete_entry(&self, id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

// -- Row types ----------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    referral_code: String,
    referred_by: Option<String>,
    entry_count: i32,
    campaign_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EntryRow {
    fn into_record(self) -> Entry {
        Entry {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            referral_code: self.referral_code,
            referred_by: self.referred_by,
            entry_count: self.entry_count,
            campaign_id: self.campaign_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CampaignRow {
    id: Uuid,
    slug: String,
    title: String,
    prize: Option<String>,
    audience: Option<String>,
    created_at: DateTime<Utc>,
}

impl CampaignRow {
    fn into_record(self) -> Campaign {
        Campaign {
            id: self.id,
            slug: self.slug,
            title: self.title,
            prize: self.prize,
            audience: self.audience,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ExistingRow {
    referral_code: String,
    entry_count: i32,
    created_at: DateTime<Utc>,
}
