use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::error;

use super::model::Reading;
use crate::store::{ReadingStore, StoreResult};

/// Dashboard headline figures, recomputed on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_records: u64,
    /// Number of distinct contexts that have at least one reading.
    pub active_contexts: u64,
    pub records_last_24h: u64,
    pub alerts_last_24h: u64,
    pub last_update: Option<DateTime<Utc>>,
}

impl Summary {
    pub fn has_last_update(&self) -> bool {
        self.last_update.is_some()
    }
}

/// Read-only queries behind the dashboard.
#[derive(Clone)]
pub struct SummaryAggregator {
    store: Arc<dyn ReadingStore>,
}

impl SummaryAggregator {
    pub const DEFAULT_WINDOW_HOURS: i64 = 24;
    pub const DEFAULT_READINGS_LIMIT: usize = 50;
    pub const DEFAULT_ALERTS_LIMIT: usize = 20;
    /// Longest window any caller may ask for.
    pub const MAX_WINDOW_HOURS: i64 = 24 * 366 * 10;

    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// The most recent reading of every context, ordered by context name.
    pub async fn latest_readings(&self) -> StoreResult<Vec<Reading>> {
        let contexts = self.store.find_distinct_contexts().await?;
        let mut latest = Vec::with_capacity(contexts.len());
        for context in &contexts {
            if let Some(r) = self.store.find_latest_by_context(context).await? {
                latest.push(r);
            }
        }
        Ok(latest)
    }

    /// Readings from the last `window`, newest first, at most `limit`.
    pub async fn recent_readings(&self, window: Duration, limit: usize) -> StoreResult<Vec<Reading>> {
        let mut rows = self.window(window).await?;
        rows.truncate(limit);
        Ok(rows)
    }

    /// Readings carrying an alert from the last `window`, newest first, at
    /// most `limit`.
    pub async fn recent_alerts(&self, window: Duration, limit: usize) -> StoreResult<Vec<Reading>> {
        Ok(self
            .window(window)
            .await?
            .into_iter()
            .filter(Reading::has_alert)
            .take(limit)
            .collect())
    }

    /// Headline counts. A store failure is logged and yields the zeroed
    /// summary so the dashboard still renders.
    pub async fn summary(&self) -> Summary {
        match self.try_summary().await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Failed to compute dashboard summary");
                Summary::default()
            }
        }
    }

    async fn try_summary(&self) -> StoreResult<Summary> {
        let total_records = self.store.count().await?;
        let active_contexts = self.store.find_distinct_contexts().await?.len() as u64;
        let day = self.window(Duration::hours(Self::DEFAULT_WINDOW_HOURS)).await?;
        let alerts_last_24h = day.iter().filter(|r| r.has_alert()).count() as u64;
        let last_update = self.store.latest_timestamp().await?;

        Ok(Summary {
            total_records,
            active_contexts,
            records_last_24h: day.len() as u64,
            alerts_last_24h,
            last_update,
        })
    }

    /// Everything in `[now - window, now]`, newest first. The window is
    /// clamped to `0..=MAX_WINDOW_HOURS`.
    async fn window(&self, window: Duration) -> StoreResult<Vec<Reading>> {
        let end = Utc::now();
        let window = window.clamp(Duration::zero(), Duration::hours(Self::MAX_WINDOW_HOURS));
        let Some(start) = end.checked_sub_signed(window) else {
            return Ok(Vec::new());
        };
        let mut rows = self.store.find_by_timestamp_range(start, end).await?;
        // Stable sort: equal timestamps keep the store's order, reversed below.
        rows.sort_by_key(|r| r.timestamp);
        rows.reverse();
        Ok(rows)
    }
}
