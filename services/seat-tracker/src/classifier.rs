//! Occupancy classification of raw pressure samples

use crate::config::{ClassifierConfig, OccupancyRule};
use crate::reading::PressureMap;
use crate::SeatError;

/// Parse `sensor_id=value` pairs into a pressure map.
///
/// A repeated sensor id keeps its first value.
pub fn parse_pressures<I, K, V>(pairs: I) -> crate::Result<PressureMap>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pressures = PressureMap::new();
    for (sensor_id, raw) in pairs {
        let sensor_id = sensor_id.as_ref();
        if pressures.contains_key(sensor_id) {
            continue;
        }
        let raw = raw.as_ref();
        let value: f64 = raw.trim().parse().map_err(|_| {
            SeatError::InvalidInput(format!(
                "pressure for sensor {:?} is not a number: {:?}",
                sensor_id, raw
            ))
        })?;
        if !value.is_finite() {
            return Err(SeatError::InvalidInput(format!(
                "pressure for sensor {:?} must be finite, got {:?}",
                sensor_id, raw
            )));
        }
        pressures.insert(sensor_id.to_string(), value);
    }
    Ok(pressures)
}

/// Decides whether a set of sensor values means the seat is empty
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyClassifier {
    rule: OccupancyRule,
    threshold: f64,
}

impl OccupancyClassifier {
    pub fn new(rule: OccupancyRule, threshold: f64) -> Self {
        Self { rule, threshold }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.rule, config.threshold)
    }

    pub fn rule(&self) -> OccupancyRule {
        self.rule
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns `is_zero_pressure` for the sample. An empty sample is unoccupied.
    pub fn classify(&self, pressures: &PressureMap) -> bool {
        match self.rule {
            OccupancyRule::AboveThreshold => pressures.values().all(|&v| v > self.threshold),
            OccupancyRule::AllZero => pressures.values().all(|&v| v == 0.0),
        }
    }
}

impl Default for OccupancyClassifier {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}
