use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::readings::Reading;

/// One row of the `readings` table.
///
/// Column names follow the internal field names, not the device wire names;
/// `timestamp` is stored as `recorded_at`.
#[derive(Debug, Clone, FromRow)]
pub struct ReadingRow {
    pub id: Uuid,
    pub context: String,
    pub temperature: f64,
    pub humidity: f64,
    pub co_level: i32,
    pub co2_level: i32,
    pub air_quality: i32,
    pub light_level: i32,
    pub pressure: f64,
    pub signal_strength: i32,
    pub alert: String,
    pub level: String,
    pub token: String,
    pub recorded_at: DateTime<Utc>,
}

impl ReadingRow {
    /// Row for a reading about to be inserted under `id`.
    pub fn from_reading(id: Uuid, r: Reading) -> Self {
        Self {
            id,
            context: r.context,
            temperature: r.temperature,
            humidity: r.humidity,
            co_level: r.co_level,
            co2_level: r.co2_level,
            air_quality: r.air_quality,
            light_level: r.light_level,
            pressure: r.pressure,
            signal_strength: r.signal_strength,
            alert: r.alert,
            level: r.level,
            token: r.token,
            recorded_at: r.timestamp,
        }
    }

    pub fn into_reading(self) -> Reading {
        Reading {
            id: Some(self.id),
            context: self.context,
            temperature: self.temperature,
            humidity: self.humidity,
            co_level: self.co_level,
            co2_level: self.co2_level,
            air_quality: self.air_quality,
            light_level: self.light_level,
            pressure: self.pressure,
            signal_strength: self.signal_strength,
            alert: self.alert,
            level: self.level,
            token: self.token,
            timestamp: self.recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readings::model::fixtures;

    #[test]
    fn row_mapping_preserves_every_field() {
        let id = Uuid::new_v4();
        let reading = fixtures::alert("garden", Utc::now(), "Smoke");

        let row = ReadingRow::from_reading(id, reading.clone());
        assert_eq!(row.recorded_at, reading.timestamp);
        assert_eq!(row.alert, "Smoke");

        let back = row.into_reading();
        assert_eq!(back, Reading { id: Some(id), ..reading });
    }
}
