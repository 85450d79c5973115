use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One telemetry submission from a sensor device.
///
/// Values built by the ingestion pipeline are never mutated afterwards:
/// normalization produces a fresh `Reading` and the store hands back a copy
/// with `id` filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Assigned by the store on save; `None` before persistence.
    pub id: Option<Uuid>,
    /// Free-text label of the originating device/location.
    pub context: String,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity percentage.
    pub humidity: f64,
    pub co_level: i32,
    pub co2_level: i32,
    /// Air-quality / smoke index.
    pub air_quality: i32,
    pub light_level: i32,
    /// hPa
    pub pressure: f64,
    /// dBm, typically negative.
    pub signal_strength: i32,
    /// Set by the device; empty means no alert.
    pub alert: String,
    /// Severity label, only meaningful when `alert` is non-empty.
    pub level: String,
    /// Opaque device credential. Not verified here.
    pub token: String,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    pub fn has_alert(&self) -> bool {
        !self.alert.is_empty()
    }
}

/// Body of `POST /submit` exactly as devices send it.
///
/// Every field is optional at this level so that a payload with missing
/// fields still parses and reaches the validator, which reports all of them
/// at once. Wrong JSON types fail parsing instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SubmitReading {
    /// Context label.
    #[serde(rename = "ctx")]
    pub context: Option<String>,
    /// Temperature, °C.
    #[serde(rename = "t")]
    pub temperature: Option<f64>,
    /// Humidity, %.
    #[serde(rename = "h")]
    pub humidity: Option<f64>,
    /// Carbon-monoxide level.
    #[serde(rename = "co")]
    pub co_level: Option<i32>,
    /// Carbon-dioxide level.
    #[serde(rename = "c2")]
    pub co2_level: Option<i32>,
    /// Air-quality (smoke) index.
    #[serde(rename = "aq")]
    pub air_quality: Option<i32>,
    /// Light sensor reading.
    #[serde(rename = "ldr")]
    pub light_level: Option<i32>,
    /// Barometric pressure, hPa.
    #[serde(rename = "prs")]
    pub pressure: Option<f64>,
    /// Signal strength, dBm.
    #[serde(rename = "sig")]
    pub signal_strength: Option<i32>,
    /// Alert text, empty when absent.
    #[serde(rename = "al")]
    pub alert: Option<String>,
    /// Alert level, empty when absent.
    #[serde(rename = "lvl")]
    pub level: Option<String>,
    /// Device token.
    #[serde(rename = "tok")]
    pub token: Option<String>,
    /// Submission time (RFC3339). Server time is used when absent.
    pub timestamp: Option<DateTime<Utc>>,
}
