//! Failure tests for the health check pipeline
//!
//! - Broker refusing alerts
//! - Incomplete or malformed tank documents
//! - Unwritable issue log

use std::sync::Arc;

use assert_matches::assert_matches;
use septic_monitor::{
    alerts::NoopSink,
    checker::HealthChecker,
    config::ConfigStore,
    error::{CheckError, ConfigError},
};

use crate::helpers::*;

#[test]
fn test_rejected_publish_does_not_stop_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_document(dir.path(), FAILING_DOCUMENT);
    let log_path = dir.path().join("log.txt");
    let snapshot = ConfigStore::load(&config_path).unwrap().snapshot().unwrap();
    let sink = Arc::new(RejectingSink::default());

    let mut checker = HealthChecker::open(&log_path, Box::new(sink.clone()), TOPIC).unwrap();
    let report = checker.check_health(&snapshot).unwrap();
    drop(checker);

    assert_eq!(report.issues().len(), 8);
    assert_eq!(sink.attempts(), 8);
    assert_eq!(std::fs::read_to_string(&log_path).unwrap().lines().count(), 8);
}

#[test]
fn test_missing_reading_fails_before_evaluation() {
    let without_methane = FAILING_DOCUMENT.replace("  methane: 1000\n", "");
    let store = ConfigStore::parse("config.yaml", &without_methane).unwrap();

    let err = store.snapshot().unwrap_err();
    assert_matches!(err, ConfigError::Parse(_));
    assert!(err.to_string().contains("methane"));
}

#[test]
fn test_missing_config_section() {
    let store = ConfigStore::parse("config.yaml", "data:\n  ph: 7\n").unwrap();

    assert_matches!(
        store.snapshot(),
        Err(ConfigError::MissingSection(section)) if section == "config"
    );
}

#[test]
fn test_unreadable_document() {
    let dir = tempfile::tempdir().unwrap();

    assert_matches!(
        ConfigStore::load(dir.path().join("missing.yaml")),
        Err(ConfigError::Io(_))
    );
}

#[test]
fn test_log_in_missing_directory_cannot_be_opened() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("no-such-dir").join("log.txt");

    let result = HealthChecker::open(&log_path, Box::new(NoopSink), TOPIC);
    assert_matches!(result.err(), Some(CheckError::LogWrite(_)));
}

#[test]
fn test_non_finite_snapshot_is_rejected_by_checker() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("log.txt");
    let sink = Arc::new(RecordingSink::default());
    let mut snapshot = create_nominal_snapshot();
    snapshot.config.depth = f64::NAN;

    let mut checker = HealthChecker::open(&log_path, Box::new(sink.clone()), TOPIC).unwrap();

    assert_matches!(
        checker.check_health(&snapshot),
        Err(CheckError::Config(ConfigError::NonFinite { .. }))
    );
    drop(checker);

    assert!(sink.published().is_empty());
    assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "");
}
