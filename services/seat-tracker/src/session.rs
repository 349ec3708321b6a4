//! Sitting session tracking
//!
//! A session is the run of occupied readings since the store was last
//! cleared. Any unoccupied reading, incoming or already at the tail of the
//! store, ends it: history is discarded and the new reading starts over.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use crate::classifier::{parse_pressures, OccupancyClassifier};
use crate::reading::Reading;
use crate::store::ReadingStore;
use crate::SeatError;

/// Source of the current time
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whether the seat currently hosts a sitting session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotSitting,
    Sitting,
}

/// Seconds elapsed since the session that starts with `start`.
///
/// Zero when there is no session or it starts with an unoccupied reading.
pub fn elapsed_seconds(start: Option<&Reading>, now: DateTime<Utc>) -> f64 {
    match start {
        Some(reading) if reading.is_occupied() => {
            let elapsed = (now - reading.timestamp).to_std().unwrap_or_default();
            elapsed.as_secs_f64()
        }
        _ => 0.0,
    }
}

/// Timestamp for a new reading: `now`, but always strictly after the tail.
///
/// Keeps insert order and timestamp order identical when the wall clock
/// steps backwards or two samples land on the same instant.
pub fn next_timestamp(now: DateTime<Utc>, latest: Option<&Reading>) -> DateTime<Utc> {
    match latest {
        Some(tail) if now <= tail.timestamp => {
            let bumped = tail.timestamp + TimeDelta::nanoseconds(1);
            tracing::warn!(
                "Clock at {} is not after latest reading {}, stamping {}",
                now,
                tail.timestamp,
                bumped
            );
            bumped
        }
        _ => now,
    }
}

/// Process-wide tracker turning ingested samples into sitting sessions
pub struct SessionTracker {
    store: Arc<dyn ReadingStore>,
    classifier: OccupancyClassifier,
    clock: Arc<dyn Clock>,
    ingest_lock: Mutex<()>,
}

impl fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTracker")
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

impl SessionTracker {
    pub fn new(store: Arc<dyn ReadingStore>, classifier: OccupancyClassifier) -> Self {
        Self::with_clock(store, classifier, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn ReadingStore>,
        classifier: OccupancyClassifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            classifier,
            clock,
            ingest_lock: Mutex::new(()),
        }
    }

    /// Record a sample given as `sensor_id=value` pairs.
    ///
    /// The tail check and the write happen under one lock, and a session
    /// boundary is written with a single atomic clear-and-insert.
    pub async fn ingest<I, K, V>(&self, pairs: I) -> crate::Result<Reading>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pressures = parse_pressures(pairs).inspect_err(|e| {
            tracing::warn!("Rejected pressure sample: {}", e);
        })?;
        let is_zero_pressure = self.classifier.classify(&pressures);
        tracing::debug!(
            "Classified {} sensor values: is_zero_pressure={}",
            pressures.len(),
            is_zero_pressure
        );

        let _guard = self.ingest_lock.lock().await;

        let latest = self.store.latest().await?;
        let timestamp = next_timestamp(self.clock.now(), latest.as_ref());
        let tail_unoccupied = latest.is_some_and(|latest| latest.is_zero_pressure);
        let reading = Reading::new(timestamp, pressures, is_zero_pressure);

        if is_zero_pressure || tail_unoccupied {
            self.store.replace_all(&reading).await?;
            if is_zero_pressure {
                tracing::info!("Seat unoccupied, session history cleared");
            } else {
                tracing::info!("Sitting session started at {}", reading.timestamp);
            }
        } else {
            self.store.insert(&reading).await?;
        }

        Ok(reading)
    }

    /// Seconds the user has been sitting without interruption
    pub async fn time_since(&self) -> crate::Result<f64> {
        let start = self.store.earliest().await?;
        Ok(elapsed_seconds(start.as_ref(), self.clock.now()))
    }

    /// Most recently recorded reading
    pub async fn latest(&self) -> crate::Result<Reading> {
        self.store
            .latest()
            .await?
            .ok_or_else(|| SeatError::NotFound("no pressure readings recorded yet".to_string()))
    }

    pub async fn state(&self) -> crate::Result<SessionState> {
        Ok(match self.store.earliest().await? {
            Some(start) if start.is_occupied() => SessionState::Sitting,
            _ => SessionState::NotSitting,
        })
    }
}
