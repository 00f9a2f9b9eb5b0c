use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::{KeyValueStore, MIGRATION_001_INITIAL};

/// SQLite-backed key-value store.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &str) -> Result<Self> {
        Self::init(&format!("sqlite:{}?mode=rwc", path)).await
    }

    /// Close every pooled connection. Later calls fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl KeyValueStore for Repository {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read key '{}'", key))?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(*key)
            .bind(value)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to write key '{}'", key))?;
        }

        tx.commit().await.context("Failed to commit write")?;
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        for key in keys {
            sqlx::query("DELETE FROM kv_store WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to remove key '{}'", key))?;
        }

        tx.commit().await.context("Failed to commit removal")?;
        Ok(())
    }
}
