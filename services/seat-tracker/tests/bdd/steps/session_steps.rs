//! BDD step definitions for ingestion and sitting-time features

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use cucumber::{given, then, when};
use tower::ServiceExt;

use seat_tracker::api::build_router;
use seat_tracker::session::SessionTracker;
use seat_tracker::store::{MemoryStore, ReadingStore, SqliteStore};

use crate::world::SeatTrackerWorld;

fn build(world: &mut SeatTrackerWorld, store: Arc<dyn ReadingStore>) {
    let classifier = world.classifier.clone().unwrap_or_default();
    let tracker = SessionTracker::with_clock(Arc::clone(&store), classifier, world.clock.clone());
    world.router = Some(build_router(Arc::new(tracker)));
    world.store = Some(store);
}

async fn request(world: &mut SeatTrackerWorld, method: Method, uri: &str) {
    let app = world.router.clone().expect("seat tracker not started");
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    world.last_status = Some(response.status().as_u16());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.last_body = Some(serde_json::from_slice(&body).expect("response should be JSON"));
}

fn body(world: &SeatTrackerWorld) -> &serde_json::Value {
    world.last_body.as_ref().expect("no response body")
}

#[given("a seat tracker with in-memory storage")]
fn memory_tracker(world: &mut SeatTrackerWorld) {
    build(world, Arc::new(MemoryStore::new()));
}

#[given("a seat tracker with SQLite storage")]
fn sqlite_tracker(world: &mut SeatTrackerWorld) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("readings.db")).unwrap();
    world.data_dir = Some(dir);
    build(world, Arc::new(store));
}

#[when(expr = "the sensors report {string}")]
async fn sensors_report(world: &mut SeatTrackerWorld, sample: String) {
    let uri = if sample.is_empty() {
        "/pressure".to_string()
    } else {
        format!("/pressure?{}", sample)
    };
    request(world, Method::POST, &uri).await;
}

#[when(expr = "{int} seconds pass")]
fn seconds_pass(world: &mut SeatTrackerWorld, secs: i64) {
    world.clock.advance(secs);
}

#[when("the sitting time is requested")]
async fn sitting_time_requested(world: &mut SeatTrackerWorld) {
    request(world, Method::GET, "/time_since").await;
}

#[when("the most recent reading is requested")]
async fn latest_requested(world: &mut SeatTrackerWorld) {
    request(world, Method::GET, "/pressure").await;
}

#[when("the health endpoint is requested")]
async fn health_requested(world: &mut SeatTrackerWorld) {
    request(world, Method::GET, "/").await;
}

#[then(expr = "the response status should be {int}")]
fn response_status(world: &mut SeatTrackerWorld, status: u16) {
    assert_eq!(world.last_status, Some(status), "body: {:?}", world.last_body);
}

#[then("the reading should be unoccupied")]
fn reading_unoccupied(world: &mut SeatTrackerWorld) {
    assert_eq!(body(world)["is_zero_pressure"], true);
}

#[then("the reading should be occupied")]
fn reading_occupied(world: &mut SeatTrackerWorld) {
    assert_eq!(body(world)["is_zero_pressure"], false);
}

#[then(expr = "the reading should have sensor {string} at {float}")]
fn reading_has_sensor(world: &mut SeatTrackerWorld, sensor: String, value: f64) {
    assert_eq!(body(world)["pressure_reading"][sensor.as_str()], value);
}

#[then(expr = "the store should hold {int} reading(s)")]
async fn store_holds(world: &mut SeatTrackerWorld, count: usize) {
    let store = world.store.as_ref().expect("seat tracker not started");
    assert_eq!(store.count().await.unwrap(), count);
}

#[then(expr = "the sitting time should be {float} seconds")]
fn sitting_time_is(world: &mut SeatTrackerWorld, seconds: f64) {
    let time_since = body(world)["time_since"]
        .as_f64()
        .expect("time_since should be a number");
    assert!(
        (time_since - seconds).abs() < 1e-9,
        "expected {} seconds, got {}",
        seconds,
        time_since
    );
}

#[then(expr = "the error kind should be {string}")]
fn error_kind(world: &mut SeatTrackerWorld, kind: String) {
    assert_eq!(body(world)["error"], kind.as_str());
}

#[then(expr = "the status should be {string}")]
fn status_is(world: &mut SeatTrackerWorld, status: String) {
    assert_eq!(body(world)["status"], status.as_str());
}
