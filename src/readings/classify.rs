//! Threshold bands used to describe a reading in the logs.
//!
//! Nothing here is persisted or returned to the device.

use std::fmt;

use super::model::Reading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Temperature(Band),
    Humidity(Band),
    AirQuality(AirConcern),
    Signal(SignalQuality),
}

/// Temperature and humidity share the low/normal/high shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirConcern {
    DangerousCo,
    ElevatedCo,
    HighCo2,
    PoorAirQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalQuality {
    Good,
    Fair,
    Poor,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Temperature(Band::Low) => "Cold",
            Classification::Temperature(Band::Normal) => "Normal",
            Classification::Temperature(Band::High) => "Hot",
            Classification::Humidity(Band::Low) => "Low",
            Classification::Humidity(Band::Normal) => "Normal",
            Classification::Humidity(Band::High) => "High",
            Classification::AirQuality(AirConcern::DangerousCo) => "Dangerous CO",
            Classification::AirQuality(AirConcern::ElevatedCo) => "Elevated CO",
            Classification::AirQuality(AirConcern::HighCo2) => "High CO2",
            Classification::AirQuality(AirConcern::PoorAirQuality) => "Poor air quality",
            Classification::Signal(SignalQuality::Good) => "Good",
            Classification::Signal(SignalQuality::Fair) => "Fair",
            Classification::Signal(SignalQuality::Poor) => "Poor",
        }
    }

    fn category(&self) -> Option<&'static str> {
        match self {
            Classification::Temperature(_) => Some("temperature"),
            Classification::Humidity(_) => Some("humidity"),
            Classification::AirQuality(_) => None,
            Classification::Signal(_) => Some("signal"),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category() {
            Some(category) => write!(f, "{} {category}", self.label()),
            None => f.write_str(self.label()),
        }
    }
}

/// Classify a reading: temperature, humidity, at most one air-quality
/// concern, then signal strength.
pub fn classify(reading: &Reading) -> Vec<Classification> {
    let mut out = Vec::with_capacity(4);

    out.push(Classification::Temperature(if reading.temperature < 10.0 {
        Band::Low
    } else if reading.temperature > 35.0 {
        Band::High
    } else {
        Band::Normal
    }));

    out.push(Classification::Humidity(if reading.humidity < 30.0 {
        Band::Low
    } else if reading.humidity > 70.0 {
        Band::High
    } else {
        Band::Normal
    }));

    // First match only, most severe first.
    let air = if reading.co_level > 400 {
        Some(AirConcern::DangerousCo)
    } else if reading.co_level > 250 {
        Some(AirConcern::ElevatedCo)
    } else if reading.co2_level > 600 {
        Some(AirConcern::HighCo2)
    } else if reading.air_quality > 300 {
        Some(AirConcern::PoorAirQuality)
    } else {
        None
    };
    out.extend(air.map(Classification::AirQuality));

    out.push(Classification::Signal(if reading.signal_strength > -70 {
        SignalQuality::Good
    } else if reading.signal_strength > -85 {
        SignalQuality::Fair
    } else {
        SignalQuality::Poor
    }));

    out
}

/// Comma-separated description for a log line.
pub fn describe(classes: &[Classification]) -> String {
    classes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::readings::model::fixtures;

    fn base() -> Reading {
        fixtures::reading("garden", Utc::now())
    }

    fn temperature_labels(r: &Reading) -> Vec<&'static str> {
        classify(r)
            .iter()
            .filter(|c| matches!(c, Classification::Temperature(_)))
            .map(Classification::label)
            .collect()
    }

    fn air(r: &Reading) -> Option<AirConcern> {
        classify(r).into_iter().find_map(|c| match c {
            Classification::AirQuality(a) => Some(a),
            _ => None,
        })
    }

    #[test]
    fn temperature_bands() {
        for (t, label) in [(5.0, "Cold"), (40.0, "Hot"), (20.0, "Normal"), (10.0, "Normal"), (35.0, "Normal")] {
            let r = Reading { temperature: t, ..base() };
            assert_eq!(temperature_labels(&r), vec![label], "temperature {t}");
        }
    }

    #[test]
    fn humidity_bands() {
        let label = |h: f64| classify(&Reading { humidity: h, ..base() })[1].label();
        assert_eq!(label(29.9), "Low");
        assert_eq!(label(30.0), "Normal");
        assert_eq!(label(70.0), "Normal");
        assert_eq!(label(70.1), "High");
    }

    #[test]
    fn air_quality_is_first_match() {
        let r = Reading { co_level: 450, co2_level: 900, air_quality: 500, ..base() };
        assert_eq!(air(&r), Some(AirConcern::DangerousCo));

        let r = Reading { co_level: 300, co2_level: 900, ..base() };
        assert_eq!(air(&r), Some(AirConcern::ElevatedCo));

        let r = Reading { co2_level: 601, air_quality: 500, ..base() };
        assert_eq!(air(&r), Some(AirConcern::HighCo2));

        let r = Reading { air_quality: 301, ..base() };
        assert_eq!(air(&r), Some(AirConcern::PoorAirQuality));
    }

    #[test]
    fn clean_air_emits_no_entry() {
        let classes = classify(&base());
        assert_eq!(classes.len(), 3);
        assert_eq!(air(&base()), None);
    }

    #[test]
    fn signal_bands() {
        let label = |s: i32| classify(&Reading { signal_strength: s, ..base() }).last().unwrap().label();
        assert_eq!(label(-60), "Good");
        assert_eq!(label(-70), "Fair");
        assert_eq!(label(-84), "Fair");
        assert_eq!(label(-85), "Poor");
    }

    #[test]
    fn output_order_is_fixed() {
        let r = Reading { temperature: 40.0, humidity: 80.0, co_level: 500, signal_strength: -90, ..base() };
        let labels: Vec<_> = classify(&r).iter().map(Classification::label).collect();
        assert_eq!(labels, vec!["Hot", "High", "Dangerous CO", "Poor"]);
    }

    #[test]
    fn describe_joins_with_category() {
        let text = describe(&classify(&base()));
        assert_eq!(text, "Normal temperature, Normal humidity, Good signal");

        let r = Reading { co_level: 300, ..base() };
        assert!(describe(&classify(&r)).contains(", Elevated CO, "));
    }
}
