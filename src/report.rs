//! Issues, the per-pass health report and the append-only issue log

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use tracing::trace;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "Warning"),
            Severity::Error => write!(f, "Error"),
        }
    }
}

/// A single detected rule violation
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl Issue {
    pub fn new(severity: Severity, message: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            severity,
            message: message.into(),
            timestamp,
        }
    }

    /// `<timestamp>\t<severity>:\t<message>\n`
    pub fn log_line(&self) -> String {
        format!(
            "{}\t{}:\t{}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.severity,
            self.message
        )
    }
}

/// Issues collected during one health check pass, in rule order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthReport {
    issues: Vec<Issue>,
}

impl HealthReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.issues.iter().map(Issue::log_line).collect()
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Septic Tank is Healthy!");
        }

        writeln!(f, "Septic Tank Health Issues Identified:")?;
        for issue in &self.issues {
            writeln!(f, "- {}", issue.message)?;
        }
        Ok(())
    }
}

/// Append-only issue log.
///
/// The underlying handle is owned by this value and closed when it is dropped,
/// so every exit path of the owner releases it.
#[derive(Debug)]
pub struct IssueLog<W: Write> {
    writer: W,
}

impl IssueLog<File> {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        trace!("opened issue log {}", path.display());
        Ok(Self::new(file))
    }
}

impl<W: Write> IssueLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write one issue and flush it before returning.
    pub fn append(&mut self, issue: &Issue) -> io::Result<()> {
        self.writer.write_all(issue.log_line().as_bytes())?;
        self.writer.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
