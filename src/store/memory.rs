use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ReadingStore, StoreResult};
use crate::readings::Reading;

/// In-process reading store, kept in insertion order.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
/// Uses `tokio::sync::RwLock` so concurrent readers never block each other.
/// Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryReadingStore {
    inner: Arc<RwLock<Vec<Reading>>>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, keep: impl Fn(&Reading) -> bool) -> Vec<Reading> {
        let mut rows: Vec<Reading> = self
            .inner
            .read()
            .await
            .iter()
            .filter(|r| keep(r))
            .cloned()
            .collect();
        // Stable: equal timestamps keep insertion order.
        rows.sort_by_key(|r| r.timestamp);
        rows
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn save(&self, reading: Reading) -> StoreResult<Reading> {
        let saved = Reading {
            id: Some(Uuid::new_v4()),
            ..reading
        };
        self.inner.write().await.push(saved.clone());
        Ok(saved)
    }

    async fn find_all(&self) -> StoreResult<Vec<Reading>> {
        Ok(self.inner.read().await.clone())
    }

    async fn find_by_timestamp_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Reading>> {
        Ok(self
            .select(|r| r.timestamp >= start && r.timestamp <= end)
            .await)
    }

    async fn find_latest_by_context(&self, context: &str) -> StoreResult<Option<Reading>> {
        // `max_by_key` returns the last of several equal maxima, i.e. the
        // most recently inserted.
        Ok(self
            .inner
            .read()
            .await
            .iter()
            .filter(|r| r.context == context)
            .max_by_key(|r| r.timestamp)
            .cloned())
    }

    async fn find_by_context(&self, context: &str) -> StoreResult<Vec<Reading>> {
        Ok(self.select(|r| r.context == context).await)
    }

    async fn find_by_context_between(
        &self,
        context: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Reading>> {
        Ok(self
            .select(|r| r.context == context && r.timestamp >= start && r.timestamp <= end)
            .await)
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Vec<Reading>> {
        Ok(self.select(|r| r.token == token).await)
    }
}
