pub mod alerts;
pub mod checker;
pub mod config;
pub mod error;
pub mod mqtt;
pub mod report;
pub mod rules;
pub mod sensors;
pub mod util;

use serde::Deserialize;

use crate::{error::ConfigError, rules::UnknownSoilPolicy};

/// One consistent read of the tank configuration and its current sensor values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TankSnapshot {
    pub config: TankConfig,
    pub data: Readings,
}

impl TankSnapshot {
    /// Reject snapshots carrying NaN or infinite values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.config.depth.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "config.depth".to_string(),
            });
        }

        for (name, value) in self.data.fields() {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: format!("data.{name}"),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TankConfig {
    /// Tank depth in feet
    pub depth: f64,
    pub soil_type: SoilType,
    #[serde(default)]
    pub unknown_soil_policy: UnknownSoilPolicy,
}

/// Current sensor readings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Readings {
    /// feet
    pub water_level: f64,
    /// °C
    pub temperature: f64,
    /// percent
    pub soil_moisture: f64,
    pub ph: f64,
    /// ppm
    pub methane: f64,
    /// ppm
    pub hydrogen_sulfide: f64,
    /// ppm
    pub ammonia: f64,
    /// feet
    pub sludge_depth: f64,
}

impl Readings {
    /// All readings keyed by their document name.
    pub fn fields(&self) -> [(&'static str, f64); 8] {
        [
            ("water-level", self.water_level),
            ("temperature", self.temperature),
            ("soil-moisture", self.soil_moisture),
            ("ph", self.ph),
            ("methane", self.methane),
            ("hydrogen-sulfide", self.hydrogen_sulfide),
            ("ammonia", self.ammonia),
            ("sludge-depth", self.sludge_depth),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SoilType {
    Sandy,
    Loam,
    Clay,
    Other(String),
}

impl SoilType {
    /// Capitalised name as it appears in alert messages.
    pub fn display_name(&self) -> String {
        match self {
            SoilType::Sandy => "Sandy".to_string(),
            SoilType::Loam => "Loam".to_string(),
            SoilType::Clay => "Clay".to_string(),
            SoilType::Other(raw) => {
                let mut chars = raw.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            }
        }
    }
}

impl From<String> for SoilType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "sandy" => SoilType::Sandy,
            "loam" => SoilType::Loam,
            "clay" => SoilType::Clay,
            _ => SoilType::Other(value),
        }
    }
}
