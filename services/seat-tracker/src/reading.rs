//! Pressure reading data model

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pressure value per sensor id
pub type PressureMap = BTreeMap<String, f64>;

/// One timestamped sample of every sensor plus its occupancy classification.
///
/// `is_zero_pressure` is decided once, at ingestion, and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub pressure_reading: PressureMap,
    pub is_zero_pressure: bool,
}

impl Reading {
    pub fn new(
        timestamp: DateTime<Utc>,
        pressure_reading: PressureMap,
        is_zero_pressure: bool,
    ) -> Self {
        Self {
            timestamp,
            pressure_reading,
            is_zero_pressure,
        }
    }

    /// True when the reading says someone is on the seat
    pub fn is_occupied(&self) -> bool {
        !self.is_zero_pressure
    }
}
