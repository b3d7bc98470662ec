use crate::models::{Link, Visit};
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

fn unix_now() -> Result<i64> {
    Ok(std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs() as i64)
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                short_code TEXT NOT NULL UNIQUE,
                original_url TEXT NOT NULL UNIQUE,
                short_url TEXT NOT NULL,
                clicks INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_links_short_code ON links(short_code)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                short_code TEXT NOT NULL,
                ip_address TEXT,
                user_agent TEXT,
                referrer TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_visits_code_time ON visits(short_code, created_at)",
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create(
        &self,
        short_code: &str,
        original_url: &str,
        short_url: &str,
    ) -> StorageResult<Link> {
        let now = unix_now().map_err(StorageError::Other)?;

        let result = sqlx::query(
            r#"
            INSERT INTO links (short_code, original_url, short_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(short_code) DO NOTHING
            "#,
        )
        .bind(short_code)
        .bind(original_url)
        .bind(short_url)
        .bind(now)
        .bind(now)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| {
            // The ON CONFLICT target only covers short_code; a duplicate
            // destination still surfaces as a unique violation here.
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                StorageError::DuplicateDestination
            } else {
                StorageError::Other(e.into())
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::DuplicateCode);
        }

        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, short_code, original_url, short_url, clicks, created_at, updated_at
            FROM links
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        Ok(link)
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, short_code, original_url, short_url, clicks, created_at, updated_at
            FROM links
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn find_by_destination(&self, original_url: &str) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, short_code, original_url, short_url, clicks, created_at, updated_at
            FROM links
            WHERE original_url = ?
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn increment_clicks(&self, short_code: &str) -> Result<Option<Link>> {
        let now = unix_now()?;

        // Single statement so concurrent redirects of the same code
        // cannot lose updates.
        let link = sqlx::query_as::<_, Link>(
            r#"
            UPDATE links
            SET clicks = clicks + 1, updated_at = ?
            WHERE short_code = ?
            RETURNING id, short_code, original_url, short_url, clicks, created_at, updated_at
            "#,
        )
        .bind(now)
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn list(&self) -> Result<Vec<Link>> {
        let links = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, short_code, original_url, short_url, clicks, created_at, updated_at
            FROM links
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn record_visit(
        &self,
        short_code: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
    ) -> Result<Visit> {
        let now = unix_now()?;

        let visit = sqlx::query_as::<_, Visit>(
            r#"
            INSERT INTO visits (short_code, ip_address, user_agent, referrer, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, short_code, ip_address, user_agent, referrer, created_at
            "#,
        )
        .bind(short_code)
        .bind(ip_address)
        .bind(user_agent)
        .bind(referrer)
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(visit)
    }

    async fn visits_for_code(&self, short_code: &str) -> Result<Vec<Visit>> {
        let visits = sqlx::query_as::<_, Visit>(
            r#"
            SELECT id, short_code, ip_address, user_agent, referrer, created_at
            FROM visits
            WHERE short_code = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(short_code)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(visits)
    }
}
