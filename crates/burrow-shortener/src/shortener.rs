use crate::error::ShortenerError;
use async_trait::async_trait;
use burrow_core::ShortCode;
use jiff::{SignedDuration, Timestamp};

type Result<T> = std::result::Result<T, ShortenerError>;

/// Expiration policy for a shortened URL.
#[derive(Debug, Clone, Default)]
pub enum ExpirationPolicy {
    /// Expires after the service's configured default duration.
    #[default]
    Default,
    /// Expires after a certain duration from now.
    AfterDuration(SignedDuration),
    /// Expires at a specific timestamp.
    AtTimestamp(Timestamp),
}

impl ExpirationPolicy {
    /// Expires the given number of hours from now.
    pub fn after_hours(hours: u32) -> Self {
        Self::AfterDuration(SignedDuration::from_hours(i64::from(hours)))
    }
}

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// The expiration policy for the shortened URL.
    pub expiration: ExpirationPolicy,
    /// Optional custom alias for the shortened URL.
    pub custom_alias: Option<ShortCode>,
}

impl ShortenParams {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            expiration: ExpirationPolicy::Default,
            custom_alias: None,
        }
    }

    pub fn with_alias(mut self, alias: ShortCode) -> Self {
        self.custom_alias = Some(alias);
        self
    }

    pub fn with_expiration(mut self, expiration: ExpirationPolicy) -> Self {
        self.expiration = expiration;
        self
    }
}

/// The result of a successful shorten call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedUrl {
    pub short_code: ShortCode,
    /// `base_url + "/" + short_code`.
    pub short_url: String,
    pub expire_at: Timestamp,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL.
    async fn shorten(&self, params: ShortenParams) -> Result<CreatedUrl>;

    /// Resolves a short code to its original URL.
    /// Fails with `NotFound` if the code does not exist or has expired.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Deletes a shortened URL and evicts it from the cache.
    /// Fails with `NotFound` if nothing was deleted.
    async fn delete(&self, code: &ShortCode) -> Result<()>;
}
