//! Full passes from the tank document to the log, the sink and the summary

use std::sync::Arc;

use pretty_assertions::assert_eq;
use septic_monitor::{
    checker::HealthChecker,
    config::ConfigStore,
    report::Severity,
    sensors::{StubSensorReader, sync_readings},
};

use crate::helpers::*;

const EXPECTED_MESSAGES: [&str; 8] = [
    "Water Level is 13.20 inches from top. Ideal range: 8-12 inches.",
    "Temperature is out of optimal range 20-40°C.",
    "Soil Moisture for Sandy Soil is out of optimal range 5-12%.",
    "pH is out of optimal range 6.5-8.5.",
    "Methane Levels are above safe levels (1000 ppm).",
    "Hydrogen Sulfide Levels are above safe levels (20 ppm).",
    "Ammonia Levels are above safe levels (50 ppm).",
    "Sludge Depth exceeds 1/3 of tank depth.",
];

#[test]
fn test_every_rule_violated_is_logged_published_and_summarized() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_document(dir.path(), FAILING_DOCUMENT);
    let log_path = dir.path().join("log.txt");

    let snapshot = ConfigStore::load(&config_path).unwrap().snapshot().unwrap();
    let sink = Arc::new(RecordingSink::default());

    let report = {
        let mut checker = HealthChecker::open(&log_path, Box::new(sink.clone()), TOPIC).unwrap();
        checker.check_health(&snapshot).unwrap()
    };

    let messages: Vec<&str> = report.issues().iter().map(|i| i.message.as_str()).collect();
    assert_eq!(messages, EXPECTED_MESSAGES.to_vec());

    let severities: Vec<Severity> = report.issues().iter().map(|i| i.severity).collect();
    assert_eq!(
        severities,
        vec![
            Severity::Warning,
            Severity::Warning,
            Severity::Warning,
            Severity::Warning,
            Severity::Error,
            Severity::Error,
            Severity::Error,
            Severity::Warning,
        ]
    );

    let published = sink.published();
    assert_eq!(published.len(), 8);
    assert!(published.iter().all(|(topic, _)| topic == TOPIC));
    assert_eq!(
        published.iter().map(|(_, m)| m.as_str()).collect::<Vec<_>>(),
        EXPECTED_MESSAGES.to_vec()
    );

    let log = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 8);
    for (line, message) in lines.iter().zip(EXPECTED_MESSAGES) {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].len(), "2024-01-01 00:00:00".len());
        assert!(fields[1] == "Warning:" || fields[1] == "Error:");
        assert_eq!(fields[2], message);
    }

    let summary = report.to_string();
    assert!(summary.starts_with("Septic Tank Health Issues Identified:\n"));
    assert_eq!(summary.lines().count(), 9);
}

#[test]
fn test_nominal_pass_prints_healthy_and_publishes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("log.txt");
    let sink = Arc::new(RecordingSink::default());

    let mut checker = HealthChecker::open(&log_path, Box::new(sink.clone()), TOPIC).unwrap();
    let report = checker.check_health(&create_nominal_snapshot()).unwrap();
    drop(checker);

    assert!(report.is_healthy());
    assert_eq!(report.to_string(), "Septic Tank is Healthy!\n");
    assert!(sink.published().is_empty());
    assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "");
}

#[test]
fn test_log_accumulates_across_passes() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("log.txt");
    let mut snapshot = create_nominal_snapshot();
    snapshot.data.ammonia = 75.0;

    let mut checker =
        HealthChecker::open(&log_path, Box::new(RecordingSink::default()), TOPIC).unwrap();
    let first = checker.check_health(&snapshot).unwrap();
    let second = checker.check_health(&snapshot).unwrap();
    drop(checker);

    assert_eq!(first.issues().len(), 1);
    assert_eq!(second.issues().len(), 1);
    assert_eq!(std::fs::read_to_string(&log_path).unwrap().lines().count(), 2);
}

#[test]
fn test_stub_sensor_sync_then_check() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_document(dir.path(), FAILING_DOCUMENT);

    let mut store = ConfigStore::load(&config_path).unwrap();
    sync_readings(&mut store, &mut StubSensorReader::default()).unwrap();
    store.save().unwrap();

    // every reading is now 10
    let snapshot = ConfigStore::load(&config_path).unwrap().snapshot().unwrap();
    let sink = Arc::new(RecordingSink::default());
    let mut checker = HealthChecker::new(
        septic_monitor::report::IssueLog::new(Vec::new()),
        Box::new(sink.clone()),
        TOPIC,
    );
    let report = checker.check_health(&snapshot).unwrap();

    let messages: Vec<String> = report.issues().iter().map(|i| i.message.clone()).collect();
    assert_eq!(
        messages,
        vec![
            "Water Level is 0.00 inches from top. Ideal range: 8-12 inches.".to_string(),
            "Temperature is out of optimal range 20-40°C.".to_string(),
            "pH is out of optimal range 6.5-8.5.".to_string(),
            "Sludge Depth exceeds 1/3 of tank depth.".to_string(),
        ]
    );
    assert_eq!(sink.published().len(), 4);
}
