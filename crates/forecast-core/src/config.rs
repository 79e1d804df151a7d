//! YAML configuration: strategies, their scenarios, and an optional blend.

use crate::{
    validate_horizon, validate_scenario, validate_strategy, ScenarioModel, StrategyParameters,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Label prefix used for period columns when none is configured.
pub const DEFAULT_PERIOD_LABEL: &str = "Year";

fn default_horizon() -> u32 {
    crate::presets::DEFAULT_HORIZON
}

fn default_period_label() -> String {
    DEFAULT_PERIOD_LABEL.to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid config: {0}")]
    Parse(String),
    #[error("strategy {strategy}: {source}")]
    Invalid {
        strategy: String,
        #[source]
        source: ValidationError,
    },
    #[error("invalid horizon: {0}")]
    Horizon(#[source] ValidationError),
    #[error("duplicate strategy: {0}")]
    DuplicateStrategy(String),
    #[error("strategy {strategy}: duplicate scenario {scenario}")]
    DuplicateScenario { strategy: String, scenario: String },
    #[error("blend refers to unknown strategy: {0}")]
    UnknownStrategy(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// One strategy and the demand scenarios it is projected under.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub parameters: StrategyParameters,
    pub scenarios: Vec<ScenarioModel>,
}

/// Blend two strategies into a combined forecast under `name`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlendConfig {
    pub name: String,
    pub left: String,
    pub right: String,
}

/// Top-level forecast run configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of periods beyond period 0.
    #[serde(default = "default_horizon")]
    pub horizon: u32,
    /// Prefix for period labels, e.g. "Year" gives "Year 0".."Year N".
    #[serde(default = "default_period_label")]
    pub period_label: String,
    pub strategies: Vec<StrategyConfig>,
    #[serde(default)]
    pub blend: Option<BlendConfig>,
}

impl ForecastConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: ForecastConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading forecast config");
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn strategy(&self, name: &str) -> Option<&StrategyConfig> {
        self.strategies.iter().find(|s| s.parameters.name == name)
    }

    /// Validate every strategy, scenario and cross-reference.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_horizon(i64::from(self.horizon)).map_err(ConfigError::Horizon)?;
        let mut names = BTreeSet::new();
        for s in &self.strategies {
            let strategy = s.parameters.name.clone();
            validate_strategy(&s.parameters).map_err(|source| ConfigError::Invalid {
                strategy: strategy.clone(),
                source,
            })?;
            if !names.insert(s.parameters.name.as_str()) {
                return Err(ConfigError::DuplicateStrategy(strategy));
            }
            let mut scenarios = BTreeSet::new();
            for sc in &s.scenarios {
                validate_scenario(sc).map_err(|source| ConfigError::Invalid {
                    strategy: strategy.clone(),
                    source,
                })?;
                if !scenarios.insert(sc.name.as_str()) {
                    return Err(ConfigError::DuplicateScenario {
                        strategy: strategy.clone(),
                        scenario: sc.name.clone(),
                    });
                }
            }
        }
        if let Some(b) = &self.blend {
            for side in [&b.left, &b.right] {
                if !names.contains(side.as_str()) {
                    return Err(ConfigError::UnknownStrategy(side.clone()));
                }
            }
        }
        Ok(())
    }
}
