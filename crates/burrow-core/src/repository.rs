use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL record.
///
/// Records are immutable once created. The same shape is written to the
/// durable store and to the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The short code, unique across the store.
    pub short_code: ShortCode,
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the record stops being valid for redirection.
    pub expire_at: Timestamp,
    /// Whether the code was chosen by the requester.
    pub is_custom: bool,
}

impl UrlRecord {
    /// Returns `true` once `now` has reached `expire_at`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expire_at
    }

    /// Returns `true` if the record has already expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }
}

/// The durable store for URL records.
///
/// Implementations must be safe for concurrent use and must enforce code
/// uniqueness on [`insert`](Repository::insert) itself, independently of
/// [`is_available`](Repository::is_available).
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Inserts a new URL record and returns it.
    /// Returns `Err(Conflict)` if the code is already held.
    async fn insert(&self, record: UrlRecord) -> Result<UrlRecord>;

    /// Retrieves the URL record for a given short code.
    /// Returns `None` if the code does not exist or has expired.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Checks whether no record currently holds the code.
    ///
    /// Expired records that have not been purged still hold their code.
    async fn is_available(&self, code: &ShortCode) -> Result<bool>;

    /// Deletes the URL record for a given short code.
    /// Returns the number of removed records.
    async fn delete(&self, code: &ShortCode) -> Result<u64>;

    /// Physically removes every record that expired at or before `now`.
    async fn purge_expired(&self, now: Timestamp) -> Result<u64>;
}
