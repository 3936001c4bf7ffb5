//! Error types for loading snapshots, publishing alerts and running a health check

use std::fmt;

/// Errors raised while reading or validating the tank document
#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing the document failed
    Io(std::io::Error),

    /// The document is not valid YAML or a required field is missing/malformed
    Parse(serde_yaml::Error),

    /// A required top-level section is absent
    MissingSection(String),

    /// A numeric field is NaN or infinite
    NonFinite { field: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error: {}", err),
            ConfigError::Parse(err) => write!(f, "invalid tank document: {}", err),
            ConfigError::MissingSection(section) => {
                write!(f, "missing required section `{}`", section)
            }
            ConfigError::NonFinite { field } => {
                write!(f, "field `{}` must be a finite number", field)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Errors an [`AlertSink`](crate::alerts::AlertSink) may report for a single publish
#[derive(Debug)]
pub enum PublishError {
    /// The transport is gone (event loop stopped, client dropped)
    NotConnected,

    /// The transport refused the message
    Rejected(String),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::NotConnected => write!(f, "alert sink is not connected"),
            PublishError::Rejected(msg) => write!(f, "alert rejected: {}", msg),
        }
    }
}

impl std::error::Error for PublishError {}

/// Errors that abort a health check pass
#[derive(Debug)]
pub enum CheckError {
    /// The snapshot could not be used
    Config(ConfigError),

    /// An issue could not be appended to the log
    LogWrite(std::io::Error),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Config(err) => write!(f, "configuration error: {}", err),
            CheckError::LogWrite(err) => write!(f, "failed to write issue log: {}", err),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckError::Config(err) => Some(err),
            CheckError::LogWrite(err) => Some(err),
        }
    }
}

impl From<ConfigError> for CheckError {
    fn from(err: ConfigError) -> Self {
        CheckError::Config(err)
    }
}
