pub mod memory;

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::readings::Reading;

pub use memory::MemoryReadingStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for readings.
///
/// Reads are independent snapshots: nothing ties two calls together, so a
/// concurrent `save` may or may not be visible to the next read.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Persist `reading` and return it with the store-assigned `id`.
    async fn save(&self, reading: Reading) -> StoreResult<Reading>;

    async fn find_all(&self) -> StoreResult<Vec<Reading>>;

    /// Readings with `start <= timestamp <= end`, oldest first.
    async fn find_by_timestamp_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Reading>>;

    /// Most recent reading for `context`. Equal timestamps resolve to the
    /// one saved last.
    async fn find_latest_by_context(&self, context: &str) -> StoreResult<Option<Reading>>;

    /// All readings for `context`, oldest first.
    async fn find_by_context(&self, context: &str) -> StoreResult<Vec<Reading>>;

    /// Readings for `context` with `start <= timestamp <= end`, oldest first.
    async fn find_by_context_between(
        &self,
        context: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Reading>>;

    /// All readings submitted with device credential `token`, oldest first.
    async fn find_by_token(&self, token: &str) -> StoreResult<Vec<Reading>>;

    async fn find_distinct_contexts(&self) -> StoreResult<BTreeSet<String>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .map(|r| r.context)
            .collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.find_all().await?.len() as u64)
    }

    async fn latest_timestamp(&self) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self.find_all().await?.iter().map(|r| r.timestamp).max())
    }
}
