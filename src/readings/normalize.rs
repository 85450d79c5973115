//! Fallback substitution for sensor-failure sentinels.
//!
//! The devices report an exact `0` for temperature or humidity when the
//! sensor fails, so an exact zero is replaced with a long-run regional
//! average. A genuine 0 °C or 0 % reading cannot be told apart from a
//! failure and is overwritten too.

use std::fmt;

use super::model::Reading;

/// Long-run regional average temperature, °C.
pub const FALLBACK_TEMPERATURE_C: f64 = 20.0;
/// Long-run regional average relative humidity, %.
pub const FALLBACK_HUMIDITY_PCT: f64 = 65.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    Temperature,
    Humidity,
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Substitution::Temperature => "temperature",
            Substitution::Humidity => "humidity",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub reading: Reading,
    /// Which fallbacks were applied, temperature first.
    pub substitutions: Vec<Substitution>,
}

/// Return a copy of `reading` with zero temperature/humidity replaced.
///
/// The two substitutions are independent of each other.
pub fn normalize(reading: &Reading) -> Normalized {
    let mut substitutions = Vec::new();

    let temperature = if reading.temperature == 0.0 {
        substitutions.push(Substitution::Temperature);
        FALLBACK_TEMPERATURE_C
    } else {
        reading.temperature
    };

    let humidity = if reading.humidity == 0.0 {
        substitutions.push(Substitution::Humidity);
        FALLBACK_HUMIDITY_PCT
    } else {
        reading.humidity
    };

    Normalized {
        reading: Reading {
            temperature,
            humidity,
            ..reading.clone()
        },
        substitutions,
    }
}
