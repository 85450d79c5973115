use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::readings::{Reading, Summary};

/// Acknowledgment returned by `POST /submit`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl SubmitResponse {
    pub fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A stored reading as served by the read API. The device token is not
/// exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingDto {
    pub id: Option<Uuid>,
    pub context: String,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    pub co_level: i32,
    pub co2_level: i32,
    pub air_quality: i32,
    pub light_level: i32,
    /// hPa
    pub pressure: f64,
    /// dBm
    pub signal_strength: i32,
    /// Empty when the device raised no alert.
    pub alert: String,
    pub level: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        Self {
            id: r.id,
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
            timestamp: r.timestamp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryDto {
    pub total_records: u64,
    pub active_contexts: u64,
    pub records_last_24h: u64,
    pub alerts_last_24h: u64,
    pub last_update: Option<DateTime<Utc>>,
    pub has_last_update: bool,
}

impl From<Summary> for SummaryDto {
    fn from(s: Summary) -> Self {
        Self {
            has_last_update: s.has_last_update(),
            total_records: s.total_records,
            active_contexts: s.active_contexts,
            records_last_24h: s.records_last_24h,
            alerts_last_24h: s.alerts_last_24h,
            last_update: s.last_update,
        }
    }
}
