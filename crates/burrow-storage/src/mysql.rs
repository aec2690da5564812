use async_trait::async_trait;
use burrow_core::repository::{Repository, Result, UrlRecord};
use burrow_core::{ShortCode, StorageError};
use jiff::Timestamp;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::debug;

/// DDL for the `short_urls` table.
pub const SCHEMA: &str = include_str!("../ddl/mysql/short_urls.sql");

/// MySQL implementation of the repository contract.
///
/// `short_code` is the primary key, so the database rejects a second insert
/// of the same code even when two writers both saw it as available. The
/// column uses a binary collation: `abcd` and `ABCD` are distinct codes. Deletes
/// are physical; expired rows stay until [`Repository::purge_expired`]
/// removes them and keep holding their code until then.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `short_urls` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn parse_expire_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid expire_at timestamp '{}': {e}", seconds))
    })
}

fn row_to_record(row: &MySqlRow) -> Result<UrlRecord> {
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let expire_at: i64 = row.try_get("expire_at").map_err(map_sqlx_error)?;
    let is_custom: bool = row.try_get("is_custom").map_err(map_sqlx_error)?;

    Ok(UrlRecord {
        short_code: ShortCode::new_unchecked(short_code),
        original_url,
        expire_at: parse_expire_at(expire_at)?,
        is_custom,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, record: UrlRecord) -> Result<UrlRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_urls (short_code, original_url, expire_at, is_custom)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(record.short_code.as_str())
        .bind(&record.original_url)
        .bind(record.expire_at.as_second())
        .bind(record.is_custom)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(record.short_code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let row = sqlx::query(
            r#"
            SELECT short_code, original_url, expire_at, is_custom
            FROM short_urls
            WHERE short_code = ?
              AND expire_at > ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .bind(Timestamp::now().as_second())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn is_available(&self, code: &ShortCode) -> Result<bool> {
        let taken = sqlx::query(
            r#"
            SELECT 1
            FROM short_urls
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(!taken)
    }

    async fn delete(&self, code: &ShortCode) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM short_urls
            WHERE short_code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM short_urls
            WHERE expire_at <= ?
            "#,
        )
        .bind(now.as_second())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(purged = result.rows_affected(), "purged expired short urls");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_seconds() {
        let ts = parse_expire_at(1_700_000_000).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
    }

    #[test]
    fn rejects_out_of_range_seconds() {
        let err = parse_expire_at(i64::MAX).unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[test]
    fn classifies_pool_errors() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StorageError::Timeout(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StorageError::InvalidData(_)
        ));
    }

    #[test]
    fn schema_keys_table_by_short_code() {
        assert!(SCHEMA.contains("PRIMARY KEY (short_code)"));
    }

    #[test]
    fn schema_compares_codes_case_sensitively() {
        let column = SCHEMA
            .lines()
            .find(|line| line.trim_start().starts_with("short_code "))
            .unwrap();
        assert!(column.contains("COLLATE ascii_bin"));
    }
}
