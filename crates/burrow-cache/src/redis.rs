use async_trait::async_trait;
use burrow_core::{CacheError, ShortCode, UrlCache, UrlRecord};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

pub const DEFAULT_KEY_PREFIX: &str = "burrow:url:";

/// A Redis-based implementation of [`UrlCache`].
///
/// This implementation stores URL records as JSON strings in Redis,
/// using a configurable key prefix. Writes use `PSETEX`, so Redis itself
/// evicts each entry when its TTL runs out.
#[derive(Debug, Clone)]
pub struct RedisUrlCache {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        CacheError::Timeout(message)
    } else {
        CacheError::Operation(message)
    }
}

/// Generates the cache key for a short code.
fn cache_key(prefix: &str, code: &ShortCode) -> String {
    format!("{}{}", prefix, code.as_str())
}

/// Redis expiry in milliseconds. Rounds up so a sub-millisecond TTL still
/// yields a valid `PSETEX` argument.
fn ttl_millis(ttl: Duration) -> u64 {
    let millis = ttl.as_millis().max(1);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis URL cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for cache keys (e.g., "myapp:url:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a client for `redis_url` and creates a cache on top of it.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Unavailable(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let key = cache_key(&self.key_prefix, code);
        trace!(code = %code, "Fetching URL record from Redis cache");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(cached)) => {
                debug!(code = %code, "Cache hit in Redis");
                match serde_json::from_str::<UrlRecord>(&cached) {
                    Ok(record) => Ok(Some(record)),
                    Err(e) => {
                        warn!(code = %code, error = %e, "Failed to deserialize cached record");
                        Err(CacheError::InvalidData(format!(
                            "invalid cached value for key '{key}': {e}"
                        )))
                    }
                }
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set_url(&self, record: &UrlRecord, ttl: Duration) -> Result<()> {
        let code = &record.short_code;
        let key = cache_key(&self.key_prefix, code);
        trace!(code = %code, ttl_ms = ttl_millis(ttl), "Storing URL record in Redis cache");

        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to serialize record for caching");
                return Err(CacheError::Serialization(format!(
                    "failed to serialize cache value: {e}"
                )));
            }
        };

        let mut conn = self.conn.clone();
        match conn.pset_ex::<_, _, ()>(&key, json, ttl_millis(ttl)).await {
            Ok(()) => {
                debug!(code = %code, "Cached record in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to cache record in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        let key = cache_key(&self.key_prefix, code);
        trace!(code = %code, "Removing URL record from Redis cache");

        let mut conn = self.conn.clone();
        match conn.del::<_, ()>(&key).await {
            Ok(()) => {
                debug!(code = %code, "Removed record from Redis cache");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to remove record from Redis cache");
                Err(map_redis_error("failed to delete value from Redis", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::{SignedDuration, Timestamp};

    #[test]
    fn key_uses_prefix() {
        let code = ShortCode::new_unchecked("abc123");
        assert_eq!(cache_key(DEFAULT_KEY_PREFIX, &code), "burrow:url:abc123");
        assert_eq!(cache_key("app:", &code), "app:abc123");
    }

    #[test]
    fn ttl_is_converted_to_millis() {
        assert_eq!(ttl_millis(Duration::from_secs(2)), 2000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
    }

    #[test]
    fn cached_value_round_trips_through_json() {
        let record = UrlRecord {
            short_code: ShortCode::new_unchecked("abc123"),
            original_url: "https://example.com".to_string(),
            expire_at: Timestamp::now() + SignedDuration::from_hours(1),
            is_custom: true,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"short_code\":\"abc123\""));
        assert_eq!(serde_json::from_str::<UrlRecord>(&json).unwrap(), record);
    }

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let err = RedisUrlCache::connect("not a redis url").await.unwrap_err();
        assert!(matches!(err, CacheError::Unavailable(_)));
    }
}
