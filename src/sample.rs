//! Embedded sample spot: a small heads-up 100bb tree used by the demo
//! command and the test suite.

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;

use crate::settings::{normalize_settings, GameSettings};
use crate::tree::Tree;

static SAMPLE_SPOT_JSON: &str = include_str!("../data/sample_spot.json");

#[derive(Deserialize)]
struct SampleSpot {
    name: String,
    settings: Value,
    tree: Tree,
}

static SAMPLE_SPOT: Lazy<SampleSpot> = Lazy::new(|| {
    serde_json::from_str(SAMPLE_SPOT_JSON).expect("Failed to parse bundled sample spot")
});

pub fn sample_name() -> &'static str {
    &SAMPLE_SPOT.name
}

pub fn sample_tree() -> Tree {
    SAMPLE_SPOT.tree.clone()
}

pub fn sample_settings() -> GameSettings {
    normalize_settings(&SAMPLE_SPOT.settings)
}
