//! # Database Persistence Layer
//!
//! Postgres backend for the entry flow via SQLx.
//!
//! The database is **optional**. With `DATABASE_URL` set, entries, campaigns
//! and referral debug records live in PostgreSQL. Without it the API runs on
//! the in-memory store (development and tests); nothing survives a restart.
//!
//! The schema (see `migrations/`) generates referral codes and credits the
//! referrer's `entry_count` in a trigger, so the application never updates
//! another entry's row.

pub mod entries;

pub use entries::PgEntryStore;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect to `url` and run embedded migrations.
pub async fn init_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
