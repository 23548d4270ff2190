//! Batch analysis configuration (TOML).
//!
//! ```toml
//! candle_limit = 200
//! parallel = true
//!
//! [data]
//! kind = "csv"
//! dir = "data/candles"
//!
//! [[units]]
//! pair = "BTCUSDT"
//! timeframes = ["1h", "4h", "1d"]
//!
//! [[indicators]]
//! name = "rsi"
//! params = { length = 14 }
//!
//! [risk]
//! min_patterns = 2
//! ```

use std::path::{Path, PathBuf};

use chartsignal_core::components::IndicatorRequest;
use chartsignal_core::domain::{Pair, Timeframe};
use chartsignal_core::signals::{RiskError, RiskParameters};
use chartsignal_core::AnalysisUnit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content-addressable hash of a configuration.
pub type ConfigHash = String;

pub const DEFAULT_CANDLE_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid [risk] section: {0}")]
    Risk(#[from] RiskError),
}

/// One trading pair analysed on one or more timeframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub pair: Pair,
    pub timeframes: Vec<Timeframe>,
}

/// Where candles come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSourceConfig {
    /// `{dir}/{PAIR}_{timeframe}.csv` files.
    Csv { dir: PathBuf },
    /// Deterministic random walk. Developer-only.
    Synthetic {
        #[serde(default)]
        seed: u64,
    },
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        DataSourceConfig::Synthetic { seed: 0 }
    }
}

fn default_candle_limit() -> usize {
    DEFAULT_CANDLE_LIMIT
}

fn default_parallel() -> bool {
    true
}

/// Full batch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub units: Vec<UnitConfig>,

    #[serde(default)]
    pub indicators: Vec<IndicatorRequest>,

    #[serde(default)]
    pub risk: RiskParameters,

    #[serde(default)]
    pub data: DataSourceConfig,

    /// Most recent N candles per unit.
    #[serde(default = "default_candle_limit")]
    pub candle_limit: usize,

    /// Fan units out over the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            units: Vec::new(),
            indicators: Vec::new(),
            risk: RiskParameters::default(),
            data: DataSourceConfig::default(),
            candle_limit: DEFAULT_CANDLE_LIMIT,
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let toml_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&toml_str)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.units.is_empty() {
            return Err(ConfigError::Invalid("at least one [[units]] entry is required".into()));
        }
        for unit in &self.units {
            if unit.pair.trim().is_empty() {
                return Err(ConfigError::Invalid("unit pair must not be empty".into()));
            }
            if unit.timeframes.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "unit {} has no timeframes",
                    unit.pair
                )));
            }
        }
        if self.indicators.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[indicators]] entry is required".into(),
            ));
        }
        if self.candle_limit == 0 {
            return Err(ConfigError::Invalid("candle_limit must be >= 1".into()));
        }
        self.risk.validate()?;
        Ok(())
    }

    /// Every `(pair, timeframe)` combination, in declaration order.
    pub fn analysis_units(&self) -> Vec<AnalysisUnit> {
        self.units
            .iter()
            .flat_map(|u| {
                u.timeframes
                    .iter()
                    .map(move |tf| AnalysisUnit::new(u.pair.clone(), *tf))
            })
            .collect()
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two batches with identical configs share the same hash.
    pub fn config_hash(&self) -> ConfigHash {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}
