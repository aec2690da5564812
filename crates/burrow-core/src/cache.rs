use crate::error::CacheError;
use crate::repository::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, CacheError>;

/// A cache for URL records.
///
/// This trait provides a domain-specific caching abstraction for [`UrlRecord`]s,
/// using [`ShortCode`] as the key. Implementations can use Redis, in-memory
/// caches, or other storage backends. The cache is an accelerant in front
/// of the [`Repository`](crate::Repository), never a source of truth.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get URL record from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Store URL record in cache, keyed by its short code.
    ///
    /// The entry must disappear no later than `ttl` after the write.
    async fn set_url(&self, record: &UrlRecord, ttl: Duration) -> Result<()>;

    /// Remove URL record from cache.
    ///
    /// It is not an error if the key does not exist.
    async fn del(&self, code: &ShortCode) -> Result<()>;
}

/// Time remaining from `now` until `expire_at`.
///
/// Returns `None` when the record is already expired, in which case it
/// must not be cached at all.
pub fn ttl_until(expire_at: Timestamp, now: Timestamp) -> Option<Duration> {
    let remaining = expire_at.duration_since(now);
    if !remaining.is_positive() {
        return None;
    }
    Duration::try_from(remaining).ok()
}
