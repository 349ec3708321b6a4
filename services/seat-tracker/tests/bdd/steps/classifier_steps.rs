//! BDD step definitions for occupancy classification feature

use cucumber::{given, then, when};

use seat_tracker::classifier::{parse_pressures, OccupancyClassifier};
use seat_tracker::config::OccupancyRule;

use crate::world::SeatTrackerWorld;

/// Split a query-string style sample ("s1=10&s2=2") into pairs
pub fn sample_pairs(sample: &str) -> Vec<(String, String)> {
    sample
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((id, value)) => (id.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

#[given(expr = "the occupancy threshold rule with threshold {float}")]
fn threshold_rule(world: &mut SeatTrackerWorld, threshold: f64) {
    world.classifier = Some(OccupancyClassifier::new(
        OccupancyRule::AboveThreshold,
        threshold,
    ));
}

#[given("the all-zero occupancy rule")]
fn zero_rule(world: &mut SeatTrackerWorld) {
    world.classifier = Some(OccupancyClassifier::new(OccupancyRule::AllZero, 0.0));
}

#[when(expr = "the sample {string} is classified")]
fn classify_sample(world: &mut SeatTrackerWorld, sample: String) {
    let classifier = world.classifier.clone().unwrap_or_default();
    let pressures = parse_pressures(sample_pairs(&sample)).expect("sample should parse");
    world.classification = Some(classifier.classify(&pressures));
}

#[then("the seat should be classified as unoccupied")]
fn classified_unoccupied(world: &mut SeatTrackerWorld) {
    assert_eq!(world.classification, Some(true));
}

#[then("the seat should be classified as occupied")]
fn classified_occupied(world: &mut SeatTrackerWorld) {
    assert_eq!(world.classification, Some(false));
}
