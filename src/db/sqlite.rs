use crate::db::models::CachedFileRecord;
use crate::db::schema::SQLITE_INIT;
use crate::error::SyncError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

const UPSERT_SQL: &str = r#"
    INSERT OR REPLACE INTO file_cache (id, name, mime_type, size, last_modified)
    VALUES (?, ?, ?, ?, ?)
"#;

/// Write-through mirror of Drive file metadata.
#[derive(Clone)]
pub struct FileCache {
    pool: SqlitePool,
}

impl FileCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database file, creating it with the bundled schema when it
    /// does not exist yet. An existing file is used as-is.
    pub async fn connect(database_url: &str) -> Result<Self, SyncError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let fresh = !connect_opts.get_filename().exists();
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let cache = Self::new(pool);
        if fresh {
            cache.init_schema().await?;
            info!(database_url, "database initialized");
        } else {
            info!(database_url, "database already exists");
        }
        Ok(cache)
    }

    /// Private in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self, SyncError> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // A single long-lived connection keeps the in-memory database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?;
        let cache = Self::new(pool);
        cache.init_schema().await?;
        Ok(cache)
    }

    #[cfg(test)]
    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    async fn init_schema(&self) -> Result<(), SyncError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert or replace rows keyed by remote id, in a single transaction.
    pub async fn upsert_many(&self, records: &[CachedFileRecord]) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(UPSERT_SQL)
                .bind(&record.remote_id)
                .bind(&record.name)
                .bind(&record.mime_type)
                .bind(record.size)
                .bind(&record.last_modified)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    #[cfg(test)]
    async fn get(&self, remote_id: &str) -> Result<Option<CachedFileRecord>, SyncError> {
        let row = sqlx::query_as::<_, CachedFileRecord>(
            "SELECT id, name, mime_type, size, last_modified FROM file_cache WHERE id = ?",
        )
        .bind(remote_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<CachedFileRecord>, SyncError> {
        let rows = sqlx::query_as::<_, CachedFileRecord>(
            "SELECT id, name, mime_type, size, last_modified FROM file_cache ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
