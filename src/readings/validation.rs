use std::fmt;

use chrono::{DateTime, Utc};

use super::model::{Reading, SubmitReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationReason {
    /// Field absent or `null`.
    Missing,
    /// String field present but empty or whitespace only.
    Blank,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViolationReason::Missing => "missing",
            ViolationReason::Blank => "blank",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: ViolationReason,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Every field-level problem found in a submission, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.violations.iter().map(|v| v.field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation failed: ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collects violations while pulling typed values out of a submission.
#[derive(Default)]
struct Checker {
    violations: Vec<FieldViolation>,
}

impl Checker {
    fn text(&mut self, field: &'static str, value: Option<&str>) -> String {
        match value {
            None => self.push(field, ViolationReason::Missing),
            Some(s) if s.trim().is_empty() => self.push(field, ViolationReason::Blank),
            Some(s) => return s.to_owned(),
        }
        String::new()
    }

    fn present<T: Copy + Default>(&mut self, field: &'static str, value: Option<T>) -> T {
        value.unwrap_or_else(|| {
            self.push(field, ViolationReason::Missing);
            T::default()
        })
    }

    fn push(&mut self, field: &'static str, reason: ViolationReason) {
        self.violations.push(FieldViolation { field, reason });
    }
}

/// Check a submission and turn it into a `Reading`.
///
/// `context` and `token` must be non-blank and all eight numeric fields must
/// be present. Numeric ranges are not checked. `now` becomes the timestamp
/// when the payload carries none.
pub fn validate(payload: &SubmitReading, now: DateTime<Utc>) -> Result<Reading, ValidationError> {
    let mut c = Checker::default();

    let context = c.text("context", payload.context.as_deref());
    let temperature = c.present("temperature", payload.temperature);
    let humidity = c.present("humidity", payload.humidity);
    let co_level = c.present("co_level", payload.co_level);
    let co2_level = c.present("co2_level", payload.co2_level);
    let air_quality = c.present("air_quality", payload.air_quality);
    let light_level = c.present("light_level", payload.light_level);
    let pressure = c.present("pressure", payload.pressure);
    let signal_strength = c.present("signal_strength", payload.signal_strength);
    let token = c.text("token", payload.token.as_deref());

    if !c.violations.is_empty() {
        return Err(ValidationError { violations: c.violations });
    }

    Ok(Reading {
        id: None,
        context,
        temperature,
        humidity,
        co_level,
        co2_level,
        air_quality,
        light_level,
        pressure,
        signal_strength,
        alert: payload.alert.clone().unwrap_or_default(),
        level: payload.level.clone().unwrap_or_default(),
        token,
        timestamp: payload.timestamp.unwrap_or(now),
    })
}
