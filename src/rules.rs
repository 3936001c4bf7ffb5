//! Threshold rules evaluated against a [`TankSnapshot`]
//!
//! Every rule is a pure function of the snapshot. The range rules pass on their
//! boundaries, while the gas rules fire once a reading reaches its limit:
//!
//! ```text
//! water level   8 <= (depth - level) * 12 <= 12   else Warning
//! temperature   20 <= t <= 40                     else Warning
//! soil moisture range by soil type                else Warning
//! pH            6.5 <= ph <= 8.5                  else Warning
//! gases         methane >= 1000, H2S >= 20,
//!               ammonia >= 50                     each an Error
//! sludge        sludge >= depth / 3               Warning
//! ```

use std::fmt;

use chrono::{DateTime, Local};
use serde::Deserialize;
use tracing::{instrument, trace};

use crate::{
    SoilType, TankSnapshot,
    report::{Issue, Severity},
};

/// Inclusive numeric range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

pub const WATER_LEVEL_FROM_TOP_IN: Range = Range::new(8.0, 12.0);
pub const TEMPERATURE_C: Range = Range::new(20.0, 40.0);
pub const PH: Range = Range::new(6.5, 8.5);

pub const SANDY_MOISTURE: Range = Range::new(5.0, 12.0);
pub const LOAM_MOISTURE: Range = Range::new(10.0, 30.0);
pub const CLAY_MOISTURE: Range = Range::new(25.0, 40.0);
pub const FALLBACK_MOISTURE: Range = Range::new(0.0, 100.0);

pub const METHANE_LIMIT_PPM: f64 = 1000.0;
pub const HYDROGEN_SULFIDE_LIMIT_PPM: f64 = 20.0;
pub const AMMONIA_LIMIT_PPM: f64 = 50.0;

/// Sludge must stay below `depth / SLUDGE_DEPTH_DIVISOR`.
pub const SLUDGE_DEPTH_DIVISOR: f64 = 3.0;

const INCHES_PER_FOOT: f64 = 12.0;

/// How the soil moisture rule treats soil types without a known range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownSoilPolicy {
    /// Check against the full 0-100% range, which any valid percentage passes.
    #[default]
    AlwaysPass,

    /// Report a warning that the soil type cannot be checked.
    Warn,
}

/// Rules in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    WaterLevel,
    Temperature,
    SoilMoisture,
    Ph,
    Gases,
    SludgeDepth,
}

impl Rule {
    pub const ALL: [Rule; 6] = [
        Rule::WaterLevel,
        Rule::Temperature,
        Rule::SoilMoisture,
        Rule::Ph,
        Rule::Gases,
        Rule::SludgeDepth,
    ];

    fn check(
        self,
        snapshot: &TankSnapshot,
        policy: UnknownSoilPolicy,
    ) -> Vec<(Severity, String)> {
        let TankSnapshot { config, data } = snapshot;

        match self {
            Rule::WaterLevel => {
                let from_top_in = (config.depth - data.water_level) * INCHES_PER_FOOT;
                if WATER_LEVEL_FROM_TOP_IN.contains(from_top_in) {
                    return vec![];
                }
                vec![(
                    Severity::Warning,
                    format!(
                        "Water Level is {from_top_in:.2} inches from top. Ideal range: {WATER_LEVEL_FROM_TOP_IN} inches."
                    ),
                )]
            }
            Rule::Temperature => {
                if TEMPERATURE_C.contains(data.temperature) {
                    return vec![];
                }
                vec![(
                    Severity::Warning,
                    format!("Temperature is out of optimal range {TEMPERATURE_C}°C."),
                )]
            }
            Rule::SoilMoisture => {
                let soil = &config.soil_type;
                let range = match soil_moisture_range(soil) {
                    Some(range) => range,
                    None => match policy {
                        UnknownSoilPolicy::AlwaysPass => FALLBACK_MOISTURE,
                        UnknownSoilPolicy::Warn => {
                            return vec![(
                                Severity::Warning,
                                format!(
                                    "Soil type {} has no known moisture range.",
                                    soil.display_name()
                                ),
                            )];
                        }
                    },
                };

                if range.contains(data.soil_moisture) {
                    return vec![];
                }
                vec![(
                    Severity::Warning,
                    format!(
                        "Soil Moisture for {} Soil is out of optimal range {range}%.",
                        soil.display_name()
                    ),
                )]
            }
            Rule::Ph => {
                if PH.contains(data.ph) {
                    return vec![];
                }
                vec![(
                    Severity::Warning,
                    format!("pH is out of optimal range {PH}."),
                )]
            }
            Rule::Gases => {
                let mut found = vec![];
                if data.methane >= METHANE_LIMIT_PPM {
                    found.push((
                        Severity::Error,
                        format!("Methane Levels are above safe levels ({METHANE_LIMIT_PPM} ppm)."),
                    ));
                }
                if data.hydrogen_sulfide >= HYDROGEN_SULFIDE_LIMIT_PPM {
                    found.push((
                        Severity::Error,
                        format!(
                            "Hydrogen Sulfide Levels are above safe levels ({HYDROGEN_SULFIDE_LIMIT_PPM} ppm)."
                        ),
                    ));
                }
                if data.ammonia >= AMMONIA_LIMIT_PPM {
                    found.push((
                        Severity::Error,
                        format!("Ammonia Levels are above safe levels ({AMMONIA_LIMIT_PPM} ppm)."),
                    ));
                }
                found
            }
            Rule::SludgeDepth => {
                if data.sludge_depth < config.depth / SLUDGE_DEPTH_DIVISOR {
                    return vec![];
                }
                vec![(
                    Severity::Warning,
                    "Sludge Depth exceeds 1/3 of tank depth.".to_string(),
                )]
            }
        }
    }
}

/// Acceptable moisture range for the known soil types.
pub fn soil_moisture_range(soil: &SoilType) -> Option<Range> {
    match soil {
        SoilType::Sandy => Some(SANDY_MOISTURE),
        SoilType::Loam => Some(LOAM_MOISTURE),
        SoilType::Clay => Some(CLAY_MOISTURE),
        SoilType::Other(_) => None,
    }
}

/// Evaluates the fixed rule battery. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine {
    unknown_soil_policy: Option<UnknownSoilPolicy>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the policy configured in the snapshot.
    pub fn with_unknown_soil_policy(mut self, policy: UnknownSoilPolicy) -> Self {
        self.unknown_soil_policy = Some(policy);
        self
    }

    pub fn evaluate(&self, snapshot: &TankSnapshot) -> Vec<Issue> {
        self.evaluate_at(snapshot, Local::now())
    }

    /// Evaluate every rule in order, stamping issues with `at`.
    pub fn evaluate_at(&self, snapshot: &TankSnapshot, at: DateTime<Local>) -> Vec<Issue> {
        Rule::ALL
            .iter()
            .flat_map(|rule| self.evaluate_rule(*rule, snapshot, at))
            .collect()
    }

    #[instrument(skip(self, snapshot, at))]
    pub fn evaluate_rule(
        &self,
        rule: Rule,
        snapshot: &TankSnapshot,
        at: DateTime<Local>,
    ) -> Vec<Issue> {
        let policy = self
            .unknown_soil_policy
            .unwrap_or(snapshot.config.unknown_soil_policy);

        let issues: Vec<Issue> = rule
            .check(snapshot, policy)
            .into_iter()
            .map(|(severity, message)| Issue::new(severity, message, at))
            .collect();

        trace!("{rule:?} -> {} issue(s)", issues.len());
        issues
    }
}
