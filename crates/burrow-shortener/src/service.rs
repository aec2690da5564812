use crate::config::ShortenerConfig;
use crate::error::ShortenerError;
use crate::shortener::{CreatedUrl, ExpirationPolicy, ShortenParams, Shortener};
use async_trait::async_trait;
use burrow_core::{
    ttl_until, CacheError, Repository, ShortCode, StorageError, UrlCache, UrlRecord,
};
use burrow_generator::Generator;
use jiff::Timestamp;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository`, a `UrlCache` and a `Generator` to handle:
/// - Short code allocation (generated with bounded retries, or custom)
/// - Expiration policy conversion
/// - Write-through to the cache on create, cache-aside on resolve
/// - Synchronous cache eviction on delete
///
/// The repository is the source of truth. Its `insert` must reject a
/// duplicate code; the service treats that rejection as a lost race and
/// either draws a new code or reports the alias as taken.
#[derive(Debug)]
pub struct ShortenerService<R, C, G> {
    repository: Arc<R>,
    cache: Arc<C>,
    generator: Arc<G>,
    config: ShortenerConfig,
}

impl<R, C, G> Clone for ShortenerService<R, C, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            generator: Arc::clone(&self.generator),
            config: self.config.clone(),
        }
    }
}

impl<R: Repository, C: UrlCache, G: Generator> ShortenerService<R, C, G> {
    pub fn new(repository: R, cache: C, generator: G, config: ShortenerConfig) -> Self {
        Self::from_shared(Arc::new(repository), Arc::new(cache), generator, config)
    }

    /// Creates a service over a repository and cache that are also used
    /// elsewhere (e.g. by a purge task).
    pub fn from_shared(
        repository: Arc<R>,
        cache: Arc<C>,
        generator: G,
        config: ShortenerConfig,
    ) -> Self {
        Self {
            repository,
            cache,
            generator: Arc::new(generator),
            config,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    pub fn config(&self) -> &ShortenerConfig {
        &self.config
    }

    /// Validates that the URL has a valid format (has a scheme and host).
    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidRequest(
                "URL cannot be empty".to_string(),
            ));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(ShortenerError::InvalidRequest(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        };
        if scheme.is_empty() || rest.is_empty() {
            return Err(ShortenerError::InvalidRequest(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        }

        let scheme = scheme.to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ShortenerError::InvalidRequest(format!(
                "URL scheme must be http or https: {}",
                scheme
            )));
        }

        Ok(())
    }

    fn expire_at(
        &self,
        policy: &ExpirationPolicy,
        now: Timestamp,
    ) -> Result<Timestamp, ShortenerError> {
        let duration = match policy {
            ExpirationPolicy::Default => self.config.default_duration,
            ExpirationPolicy::AfterDuration(duration) => *duration,
            ExpirationPolicy::AtTimestamp(timestamp) => return Ok(*timestamp),
        };

        now.checked_add(duration)
            .map_err(|e| ShortenerError::InvalidRequest(format!("invalid duration: {e}")))
    }

    /// Persists a record under a caller-chosen code.
    async fn claim_alias(
        &self,
        alias: ShortCode,
        original_url: String,
        expire_at: Timestamp,
    ) -> Result<UrlRecord, ShortenerError> {
        if self.config.is_reserved(alias.as_str()) {
            debug!(code = %alias, "custom alias is reserved");
            return Err(ShortenerError::AliasTaken(alias.to_string()));
        }

        if !self.repository.is_available(&alias).await? {
            debug!(code = %alias, "custom alias already taken");
            return Err(ShortenerError::AliasTaken(alias.to_string()));
        }

        let record = UrlRecord {
            short_code: alias,
            original_url,
            expire_at,
            is_custom: true,
        };

        match self.repository.insert(record).await {
            Ok(record) => Ok(record),
            // Another request claimed the alias between the check and the insert.
            Err(StorageError::Conflict(code)) => {
                debug!(code = %code, "custom alias claimed concurrently");
                Err(ShortenerError::AliasTaken(code))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Draws candidates until one is persisted or the attempt bound is hit.
    async fn allocate(
        &self,
        original_url: String,
        expire_at: Timestamp,
    ) -> Result<UrlRecord, ShortenerError> {
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            let candidate: ShortCode = self.generator.generate().into();

            if self.config.is_reserved(candidate.as_str()) {
                debug!(code = %candidate, attempt, "generated code is reserved");
                continue;
            }

            if !self.repository.is_available(&candidate).await? {
                debug!(code = %candidate, attempt, "generated code already taken");
                continue;
            }

            let record = UrlRecord {
                short_code: candidate,
                original_url: original_url.clone(),
                expire_at,
                is_custom: false,
            };

            match self.repository.insert(record).await {
                Ok(record) => {
                    trace!(code = %record.short_code, attempt, "allocated short code");
                    return Ok(record);
                }
                Err(StorageError::Conflict(code)) => {
                    debug!(code = %code, attempt, "generated code claimed concurrently");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(attempts = max_attempts, "short code allocation exhausted");
        Err(ShortenerError::AllocationExhausted {
            attempts: max_attempts,
        })
    }

    /// Writes the record to the cache with a TTL that ends at `expire_at`.
    /// Already-expired records are not cached.
    async fn fill_cache(&self, record: &UrlRecord) -> Result<(), CacheError> {
        let Some(ttl) = ttl_until(record.expire_at, Timestamp::now()) else {
            debug!(code = %record.short_code, "record already expired, skipping cache write");
            return Ok(());
        };

        self.cache.set_url(record, ttl).await
    }
}

#[async_trait]
impl<R: Repository, C: UrlCache, G: Generator> Shortener for ShortenerService<R, C, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<CreatedUrl, ShortenerError> {
        Self::validate_url(&params.original_url)?;

        let expire_at = self.expire_at(&params.expiration, Timestamp::now())?;

        let record = match params.custom_alias {
            Some(alias) => {
                self.claim_alias(alias, params.original_url, expire_at)
                    .await?
            }
            None => self.allocate(params.original_url, expire_at).await?,
        };

        // The record is already durable; a failed cache write is still reported
        // so the caller knows the cache and store have diverged.
        if let Err(e) = self.fill_cache(&record).await {
            warn!(code = %record.short_code, error = %e, "failed to cache new record");
            return Err(e.into());
        }

        info!(
            code = %record.short_code,
            custom = record.is_custom,
            expire_at = %record.expire_at,
            "created short url"
        );

        Ok(CreatedUrl {
            short_url: record.short_code.to_url(&self.config.base_url),
            short_code: record.short_code,
            expire_at: record.expire_at,
        })
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String, ShortenerError> {
        trace!(code = %code, "resolving short code");

        if let Some(record) = self.cache.get_url(code).await? {
            debug!(code = %code, "resolved from cache");
            return Ok(record.original_url);
        }

        let Some(record) = self.repository.get(code).await? else {
            trace!(code = %code, "short code not found");
            return Err(ShortenerError::NotFound(code.to_string()));
        };

        if record.is_expired() {
            debug!(code = %code, "record has expired");
            return Err(ShortenerError::NotFound(code.to_string()));
        }

        if let Err(e) = self.fill_cache(&record).await {
            warn!(code = %code, error = %e, "failed to backfill cache");
        }

        debug!(code = %code, url = %record.original_url, "resolved from repository");
        Ok(record.original_url)
    }

    async fn delete(&self, code: &ShortCode) -> Result<(), ShortenerError> {
        let removed = self.repository.delete(code).await?;
        if removed == 0 {
            return Err(ShortenerError::NotFound(code.to_string()));
        }

        // A stale cache entry would keep redirecting until its TTL runs out.
        if let Err(e) = self.cache.del(code).await {
            warn!(code = %code, error = %e, "failed to evict deleted record from cache");
            return Err(e.into());
        }

        info!(code = %code, "deleted short url");
        Ok(())
    }
}
