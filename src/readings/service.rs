use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use super::{
    classify::{classify, describe},
    model::{Reading, SubmitReading},
    normalize::normalize,
    validation::{validate, ValidationError},
};
use crate::store::{ReadingStore, StoreError};

/// Why a submission was not stored.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Body could not be parsed into the submission shape at all.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to store reading: {0}")]
    Store(#[from] StoreError),
}

/// Validate → normalize → store, logging each step.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn ReadingStore>,
}

impl IngestService {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// Runs one submission through the pipeline and returns the stored
    /// reading.
    ///
    /// Failures are logged together with the full payload, so a rejected or
    /// lost submission can be rebuilt from the logs.
    pub async fn ingest(&self, payload: &SubmitReading) -> Result<Reading, IngestError> {
        info!(
            context = ?payload.context,
            temperature = ?payload.temperature,
            humidity = ?payload.humidity,
            "Received reading"
        );

        let reading = validate(payload, Utc::now()).map_err(|e| {
            error!(errors = %e, payload = %payload_json(payload), "Reading rejected");
            e
        })?;

        let normalized = normalize(&reading);
        for field in &normalized.substitutions {
            warn!(
                context = %reading.context,
                field = %field,
                "Zero value treated as sensor failure; using regional fallback"
            );
        }
        let reading = normalized.reading;

        log_reading(&reading);

        if reading.has_alert() {
            warn!(
                context = %reading.context,
                alert = %reading.alert,
                level = %reading.level,
                "Device raised an alert"
            );
        }

        match self.store.save(reading).await {
            Ok(saved) => {
                info!(
                    context = %saved.context,
                    id = ?saved.id,
                    "Reading saved"
                );
                Ok(saved)
            }
            Err(e) => {
                error!(error = %e, payload = %payload_json(payload), "Failed to save reading");
                Err(e.into())
            }
        }
    }
}

fn log_reading(r: &Reading) {
    info!(
        context = %r.context,
        temperature_c = r.temperature,
        humidity_pct = r.humidity,
        co = r.co_level,
        co2 = r.co2_level,
        air_quality = r.air_quality,
        light = r.light_level,
        pressure_hpa = r.pressure,
        signal_dbm = r.signal_strength,
        timestamp = %r.timestamp,
        conditions = %describe(&classify(r)),
        "Reading details"
    );
}

/// Payload as JSON for log lines; falls back to `Debug` output.
pub(crate) fn payload_json(payload: &SubmitReading) -> String {
    serde_json::to_string(payload).unwrap_or_else(|_| format!("{payload:?}"))
}
