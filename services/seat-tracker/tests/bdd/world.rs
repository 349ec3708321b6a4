//! BDD test world for seat tracker service

use std::fmt;
use std::sync::{Arc, Mutex};

use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use cucumber::World;
use seat_tracker::classifier::OccupancyClassifier;
use seat_tracker::session::Clock;
use seat_tracker::store::ReadingStore;

/// Clock the scenarios advance by hand
#[derive(Debug)]
pub struct TestClock(Mutex<DateTime<Utc>>);

impl Default for TestClock {
    fn default() -> Self {
        Self(Mutex::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ))
    }
}

impl TestClock {
    pub fn advance(&self, secs: i64) {
        *self.0.lock().unwrap() += Duration::seconds(secs);
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[derive(Default, World)]
pub struct SeatTrackerWorld {
    pub clock: Arc<TestClock>,
    pub classifier: Option<OccupancyClassifier>,
    pub store: Option<Arc<dyn ReadingStore>>,
    pub router: Option<Router>,
    pub data_dir: Option<tempfile::TempDir>,

    // Classification testing
    pub classification: Option<bool>,

    // HTTP testing
    pub last_status: Option<u16>,
    pub last_body: Option<serde_json::Value>,
}

impl fmt::Debug for SeatTrackerWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeatTrackerWorld")
            .field("clock", &self.clock)
            .field("classifier", &self.classifier)
            .field("has_store", &self.store.is_some())
            .field("classification", &self.classification)
            .field("last_status", &self.last_status)
            .field("last_body", &self.last_body)
            .finish()
    }
}
