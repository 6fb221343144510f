//! Experiment configuration (TOML).
//!
//! One file describes a whole study: the universe, where processed series
//! live, portfolio sizing, the strategies and execution models to cross,
//! evaluation periods, bootstrap settings, and where to write outputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use eventlab_core::{ExecConfig, PortfolioConfig, StrategyConfig};

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
}

// ─── Sections ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseConfig {
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding one `<SYMBOL>.csv` per symbol.
    pub processed_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            processed_dir: PathBuf::from("data/processed"),
        }
    }
}

/// A named execution model: one rung of the cost ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionModel {
    pub name: String,
    #[serde(default)]
    pub params: ExecConfig,
}

impl ExecutionModel {
    pub fn new(name: impl Into<String>, params: ExecConfig) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Inclusive evaluation window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodConfig {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodConfig {
    /// The whole history.
    pub fn full() -> Self {
        Self {
            name: "full".to_string(),
            start: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2100, 1, 1).unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub n_samples: usize,
    pub block_size: usize,
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_samples: 500,
            block_size: 10,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Record every dequeued event of each full-period run and write it to CSV.
    pub enable_event_log: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub out_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("results"),
        }
    }
}

/// Impact-coefficient sweep. Every other cost parameter is held at a fixed ladder value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    pub impact_k_values: Vec<f64>,
    pub fee_bps: f64,
    pub half_spread_bps: f64,
    pub vol_k: f64,
    pub delay_days: usize,
    pub participation_rate: f64,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            impact_k_values: vec![0.0, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0],
            fee_bps: 5.0,
            half_spread_bps: 5.0,
            vol_k: 10.0,
            delay_days: 1,
            participation_rate: 0.05,
        }
    }
}

impl SensitivityConfig {
    /// Execution config for one point of the sweep.
    pub fn exec_for(&self, impact_k: f64) -> ExecConfig {
        ExecConfig {
            fee_bps: self.fee_bps,
            half_spread_bps: self.half_spread_bps,
            vol_k: self.vol_k,
            impact_k,
            delay_days: self.delay_days,
            participation_rate: self.participation_rate,
            ..ExecConfig::default()
        }
    }
}

// ─── Experiment ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub universe: UniverseConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    pub strategies: Vec<StrategyConfig>,
    #[serde(default = "default_execution_models")]
    pub execution_models: Vec<ExecutionModel>,
    #[serde(default = "default_periods")]
    pub periods: Vec<PeriodConfig>,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub outputs: OutputConfig,
    #[serde(default)]
    pub sensitivity: SensitivityConfig,
    /// Execution model the inflation ratios are measured against.
    #[serde(default = "default_baseline")]
    pub baseline_exec_model: String,
}

fn default_execution_models() -> Vec<ExecutionModel> {
    vec![ExecutionModel::new("naive", ExecConfig::naive())]
}

fn default_periods() -> Vec<PeriodConfig> {
    vec![PeriodConfig::full()]
}

fn default_baseline() -> String {
    "naive".to_string()
}

impl ExperimentConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic checks serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.universe.symbols.is_empty() {
            return Err(ConfigError::Invalid("universe.symbols is empty".into()));
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::Invalid("no [[strategies]] configured".into()));
        }
        if self.execution_models.is_empty() {
            return Err(ConfigError::Invalid("no [[execution_models]] configured".into()));
        }
        if let Some(name) = first_duplicate(self.strategies.iter().map(|s| s.name.as_str())) {
            return Err(ConfigError::Invalid(format!("duplicate strategy name '{name}'")));
        }
        if let Some(name) = first_duplicate(self.execution_models.iter().map(|e| e.name.as_str())) {
            return Err(ConfigError::Invalid(format!("duplicate execution model name '{name}'")));
        }
        if let Some(p) = self.periods.iter().find(|p| p.start > p.end) {
            return Err(ConfigError::Invalid(format!(
                "period '{}' starts after it ends ({} > {})",
                p.name, p.start, p.end
            )));
        }
        if self.bootstrap.block_size == 0 {
            return Err(ConfigError::Invalid("bootstrap.block_size must be at least 1".into()));
        }
        if self.portfolio.initial_cash <= 0.0 {
            return Err(ConfigError::Invalid("portfolio.initial_cash must be positive".into()));
        }
        Ok(())
    }

    pub fn strategy(&self, name: &str) -> Option<&StrategyConfig> {
        self.strategies.iter().find(|s| s.name == name)
    }

    pub fn execution_model(&self, name: &str) -> Option<&ExecutionModel> {
        self.execution_models.iter().find(|e| e.name == name)
    }

    pub fn period(&self, name: &str) -> Option<&PeriodConfig> {
        self.periods.iter().find(|p| p.name == name)
    }
}

fn first_duplicate<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = BTreeSet::new();
    names.into_iter().find(|name| !seen.insert(*name))
}
