//! HealthChecker - runs the rule battery and dispatches every issue
//!
//! ## Per-issue dispatch
//!
//! Rules run one at a time. Each issue a rule produces is handled before the
//! next rule runs:
//!
//! ```text
//! rule → issue ─┬─ 1. append to issue log   (failure aborts the pass)
//!               ├─ 2. publish to alert sink (failure is logged, pass continues)
//!               └─ 3. push into HealthReport
//! ```
//!
//! An aborted pass therefore leaves every issue found so far in the log.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use tracing::{debug, instrument, warn};

use crate::{
    TankSnapshot,
    alerts::AlertSink,
    error::CheckError,
    report::{HealthReport, Issue, IssueLog},
    rules::{Rule, RuleEngine},
};

pub struct HealthChecker<W: Write> {
    engine: RuleEngine,
    log: IssueLog<W>,
    sink: Box<dyn AlertSink>,
    topic: String,
}

impl HealthChecker<File> {
    /// Open the issue log at `log_path` for the lifetime of the checker.
    pub fn open(
        log_path: impl AsRef<Path>,
        sink: Box<dyn AlertSink>,
        topic: impl Into<String>,
    ) -> Result<Self, CheckError> {
        let log = IssueLog::open(log_path).map_err(CheckError::LogWrite)?;
        Ok(Self::new(log, sink, topic))
    }
}

impl<W: Write> HealthChecker<W> {
    pub fn new(log: IssueLog<W>, sink: Box<dyn AlertSink>, topic: impl Into<String>) -> Self {
        Self {
            engine: RuleEngine::new(),
            log,
            sink,
            topic: topic.into(),
        }
    }

    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn log(&self) -> &IssueLog<W> {
        &self.log
    }

    /// Run one evaluation pass over `snapshot`.
    #[instrument(skip_all)]
    pub fn check_health(&mut self, snapshot: &TankSnapshot) -> Result<HealthReport, CheckError> {
        snapshot.validate()?;

        let mut report = HealthReport::new();

        for rule in Rule::ALL {
            for issue in self.engine.evaluate_rule(rule, snapshot, Local::now()) {
                self.dispatch(&issue)?;
                report.push(issue);
            }
        }

        debug!("health check finished with {} issue(s)", report.issues().len());
        Ok(report)
    }

    fn dispatch(&mut self, issue: &Issue) -> Result<(), CheckError> {
        self.log.append(issue).map_err(CheckError::LogWrite)?;

        if let Err(e) = self.sink.publish(&self.topic, &issue.message) {
            warn!("failed to publish alert to {}: {e}", self.topic);
        }

        Ok(())
    }
}
