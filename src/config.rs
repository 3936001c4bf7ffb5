use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::trace;

use crate::{Readings, TankConfig, TankSnapshot, error::ConfigError};

const CONFIG_SECTION: &str = "config";
const DATA_SECTION: &str = "data";
const MQTT_SECTION: &str = "MQTT";

/// Broker settings from the optional `MQTT` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MqttConfig {
    pub server: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    pub topic: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive: u64,
    #[serde(default = "default_tls")]
    pub tls: bool,
}

impl MqttConfig {
    /// Username and password, only when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some((user.as_str(), pass.as_str()))
            }
            _ => None,
        }
    }
}

fn default_mqtt_port() -> u16 {
    8883
}

fn default_client_id() -> String {
    String::from("septic-monitor")
}

fn default_keep_alive() -> u64 {
    60
}

fn default_tls() -> bool {
    true
}

/// The tank document on disk.
///
/// The document is kept untyped so keys this crate does not know about survive
/// a load/save round trip.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    document: Value,
}

impl ConfigStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Build a store from already read content; `save` writes to `path`.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_yaml::from_str(content)?;
        let path = path.into();
        trace!("loaded tank document {}", path.display());
        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn section(&self, name: &str) -> Result<&Value, ConfigError> {
        self.document
            .get(name)
            .filter(|section| !section.is_null())
            .ok_or_else(|| ConfigError::MissingSection(name.to_string()))
    }

    /// Extract and validate the snapshot used for one evaluation pass.
    pub fn snapshot(&self) -> Result<TankSnapshot, ConfigError> {
        let config: TankConfig = serde_yaml::from_value(self.section(CONFIG_SECTION)?.clone())?;
        let data: Readings = serde_yaml::from_value(self.section(DATA_SECTION)?.clone())?;

        let snapshot = TankSnapshot { config, data };
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn mqtt(&self) -> Result<Option<MqttConfig>, ConfigError> {
        match self.document.get(MQTT_SECTION) {
            None | Some(Value::Null) => Ok(None),
            Some(section) => Ok(Some(serde_yaml::from_value(section.clone())?)),
        }
    }

    /// Set `data.<sensor>`, creating the key if needed.
    pub fn set_reading(&mut self, sensor: &str, value: f64) -> Result<(), ConfigError> {
        let data = self
            .document
            .get_mut(DATA_SECTION)
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| ConfigError::MissingSection(DATA_SECTION.to_string()))?;

        data.insert(Value::from(sensor), Value::from(value));
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(&self.document)?;
        std::fs::write(&self.path, content)?;
        trace!("saved tank document {}", self.path.display());
        Ok(())
    }

    pub fn data(&self) -> Option<&Mapping> {
        self.document.get(DATA_SECTION).and_then(Value::as_mapping)
    }
}
