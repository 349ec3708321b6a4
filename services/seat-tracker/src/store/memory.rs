//! In-process reading store

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::ReadingStore;
use crate::reading::Reading;
use crate::SeatError;

/// Ephemeral store keyed by timestamp; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: RwLock<BTreeMap<DateTime<Utc>, Reading>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(reading: &Reading) -> SeatError {
    SeatError::Persistence(format!(
        "a reading with timestamp {} already exists",
        reading.timestamp.to_rfc3339()
    ))
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn insert(&self, reading: &Reading) -> crate::Result<()> {
        let mut readings = self.readings.write().await;
        if readings.contains_key(&reading.timestamp) {
            return Err(duplicate(reading));
        }
        readings.insert(reading.timestamp, reading.clone());
        Ok(())
    }

    async fn clear(&self) -> crate::Result<()> {
        self.readings.write().await.clear();
        Ok(())
    }

    async fn replace_all(&self, reading: &Reading) -> crate::Result<()> {
        let mut readings = self.readings.write().await;
        readings.clear();
        readings.insert(reading.timestamp, reading.clone());
        Ok(())
    }

    async fn latest(&self) -> crate::Result<Option<Reading>> {
        Ok(self.readings.read().await.values().next_back().cloned())
    }

    async fn earliest(&self) -> crate::Result<Option<Reading>> {
        Ok(self.readings.read().await.values().next().cloned())
    }

    async fn count(&self) -> crate::Result<usize> {
        Ok(self.readings.read().await.len())
    }
}
