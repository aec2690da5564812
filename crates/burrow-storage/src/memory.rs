use async_trait::async_trait;
use burrow_core::repository::{Repository, Result, UrlRecord};
use burrow_core::{ShortCode, StorageError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Inserts go through the entry API, so the
/// uniqueness check and the write happen under the same shard lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, UrlRecord>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    /// Number of records physically held, expired ones included.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, record: UrlRecord) -> Result<UrlRecord> {
        match self.storage.entry(record.short_code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(record.short_code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let Some(entry) = self.storage.get(code.as_str()) else {
            return Ok(None);
        };

        if entry.is_expired() {
            return Ok(None);
        }

        Ok(Some(entry.clone()))
    }

    async fn is_available(&self, code: &ShortCode) -> Result<bool> {
        Ok(!self.storage.contains_key(code.as_str()))
    }

    async fn delete(&self, code: &ShortCode) -> Result<u64> {
        Ok(u64::from(self.storage.remove(code.as_str()).is_some()))
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<u64> {
        let before = self.storage.len();
        self.storage.retain(|_, record| !record.is_expired_at(now));
        Ok(before.saturating_sub(self.storage.len()) as u64)
    }
}
