//! Helper functions for integration and property tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use septic_monitor::{
    Readings, SoilType, TankConfig, TankSnapshot, alerts::AlertSink, error::PublishError,
    rules::UnknownSoilPolicy,
};

pub const TOPIC: &str = "septic/alerts";

/// Remembers every published `(topic, payload)` pair
#[derive(Debug, Default)]
pub struct RecordingSink {
    published: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

/// Refuses every message
#[derive(Debug, Default)]
pub struct RejectingSink {
    attempts: Mutex<usize>,
}

impl RejectingSink {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl AlertSink for RejectingSink {
    fn publish(&self, _topic: &str, _payload: &str) -> Result<(), PublishError> {
        *self.attempts.lock().unwrap() += 1;
        Err(PublishError::Rejected("broker unavailable".to_string()))
    }
}

/// Every reading inside its window, water 10.8 inches from the top
pub fn create_nominal_snapshot() -> TankSnapshot {
    TankSnapshot {
        config: TankConfig {
            depth: 10.0,
            soil_type: SoilType::Loam,
            unknown_soil_policy: UnknownSoilPolicy::AlwaysPass,
        },
        data: Readings {
            water_level: 9.1,
            temperature: 25.0,
            soil_moisture: 20.0,
            ph: 7.0,
            methane: 10.0,
            hydrogen_sulfide: 5.0,
            ammonia: 5.0,
            sludge_depth: 1.0,
        },
    }
}

/// Every rule violated, eight issues in total
pub const FAILING_DOCUMENT: &str = "
config:
  depth: 10
  soil-type: sandy
data:
  water-level: 8.9
  temperature: 45
  soil-moisture: 20
  ph: 9.0
  methane: 1000
  hydrogen-sulfide: 25
  ammonia: 60
  sludge-depth: 5
";

pub fn write_document(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    std::fs::write(&path, content).unwrap();
    path
}
