use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::ReadingRow;
use crate::{
    readings::Reading,
    store::{ReadingStore, StoreResult},
};

const COLUMNS: &str = "id, context, temperature, humidity, co_level, co2_level, air_quality, \
                       light_level, pressure, signal_strength, alert, level, token, recorded_at";

/// `ReadingStore` backed by the Postgres `readings` table.
#[derive(Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, sql: &str) -> StoreResult<Vec<Reading>> {
        let rows = sqlx::query_as::<_, ReadingRow>(sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ReadingRow::into_reading).collect())
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn save(&self, reading: Reading) -> StoreResult<Reading> {
        let row = ReadingRow::from_reading(Uuid::new_v4(), reading);
        let sql = format!(
            r#"
            INSERT INTO readings
                (id, context, temperature, humidity, co_level, co2_level, air_quality,
                 light_level, pressure, signal_strength, alert, level, token, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {COLUMNS}
            "#
        );
        let saved = sqlx::query_as::<_, ReadingRow>(&sql)
            .bind(row.id)
            .bind(&row.context)
            .bind(row.temperature)
            .bind(row.humidity)
            .bind(row.co_level)
            .bind(row.co2_level)
            .bind(row.air_quality)
            .bind(row.light_level)
            .bind(row.pressure)
            .bind(row.signal_strength)
            .bind(&row.alert)
            .bind(&row.level)
            .bind(&row.token)
            .bind(row.recorded_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved.into_reading())
    }

    async fn find_all(&self) -> StoreResult<Vec<Reading>> {
        let sql = format!("SELECT {COLUMNS} FROM readings ORDER BY seq ASC");
        self.fetch(&sql).await
    }

    async fn find_by_timestamp_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Reading>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM readings
            WHERE recorded_at >= $1
              AND recorded_at <= $2
            ORDER BY recorded_at ASC, seq ASC
            "#
        );
        let rows = sqlx::query_as::<_, ReadingRow>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ReadingRow::into_reading).collect())
    }

    async fn find_latest_by_context(&self, context: &str) -> StoreResult<Option<Reading>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM readings
            WHERE context = $1
            ORDER BY recorded_at DESC, seq DESC
            LIMIT 1
            "#
        );
        let row = sqlx::query_as::<_, ReadingRow>(&sql)
            .bind(context)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ReadingRow::into_reading))
    }

    async fn find_by_context(&self, context: &str) -> StoreResult<Vec<Reading>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM readings
            WHERE context = $1
            ORDER BY recorded_at ASC, seq ASC
            "#
        );
        let rows = sqlx::query_as::<_, ReadingRow>(&sql)
            .bind(context)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ReadingRow::into_reading).collect())
    }

    async fn find_by_context_between(
        &self,
        context: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Reading>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM readings
            WHERE context = $1
              AND recorded_at >= $2
              AND recorded_at <= $3
            ORDER BY recorded_at ASC, seq ASC
            "#
        );
        let rows = sqlx::query_as::<_, ReadingRow>(&sql)
            .bind(context)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ReadingRow::into_reading).collect())
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Vec<Reading>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM readings
            WHERE token = $1
            ORDER BY recorded_at ASC, seq ASC
            "#
        );
        let rows = sqlx::query_as::<_, ReadingRow>(&sql)
            .bind(token)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ReadingRow::into_reading).collect())
    }

    async fn find_distinct_contexts(&self) -> StoreResult<BTreeSet<String>> {
        let contexts: Vec<String> = sqlx::query_scalar("SELECT DISTINCT context FROM readings")
            .fetch_all(&self.pool)
            .await?;
        Ok(contexts.into_iter().collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM readings")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    async fn latest_timestamp(&self) -> StoreResult<Option<DateTime<Utc>>> {
        let ts: Option<DateTime<Utc>> = sqlx::query_scalar("SELECT MAX(recorded_at) FROM readings")
            .fetch_one(&self.pool)
            .await?;
        Ok(ts)
    }
}

// ---------------------------------------------------------------------------
// Tests (need a Postgres reachable through DATABASE_URL)
// ---------------------------------------------------------------------------
