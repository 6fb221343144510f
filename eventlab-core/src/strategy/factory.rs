//! Factory — converts a `StrategyConfig` into a runtime trait object.
//!
//! The factory is an explicit map built at startup and passed by reference
//! to whoever needs to construct strategies. There is no process-wide registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{MeanReversionZ, Strategy, TimeSeriesMomentum};

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("Unknown strategy type: {0}")]
    UnknownStrategy(String),
    #[error("Invalid parameter '{param}' for {strategy}: {value}")]
    InvalidParam {
        strategy: String,
        param: String,
        value: f64,
    },
}

// ─── Config ──────────────────────────────────────────────────────────

/// Serializable strategy description: a display name, a registered type, and
/// numeric parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl StrategyConfig {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Named f64 parameter, falling back to `default`.
    fn param(&self, name: &str, default: f64) -> f64 {
        self.params.get(name).copied().unwrap_or(default)
    }

    /// Named non-negative integer parameter, falling back to `default`.
    fn param_usize(&self, name: &str, default: usize) -> Result<usize, FactoryError> {
        match self.params.get(name).copied() {
            None => Ok(default),
            Some(v) if v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
            Some(value) => Err(FactoryError::InvalidParam {
                strategy: self.kind.clone(),
                param: name.to_string(),
                value,
            }),
        }
    }
}

// ─── Factory ─────────────────────────────────────────────────────────

type Constructor = fn(&StrategyConfig) -> Result<Box<dyn Strategy>, FactoryError>;

/// Map from strategy type name to constructor.
#[derive(Clone)]
pub struct StrategyFactory {
    constructors: BTreeMap<String, Constructor>,
}

impl StrategyFactory {
    /// An empty factory. Most callers want [`with_defaults`](Self::with_defaults).
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Factory preloaded with the reference policies.
    pub fn with_defaults() -> Self {
        let mut factory = Self::empty();
        factory.register("TimeSeriesMomentum", build_momentum);
        factory.register("MeanReversionZ", build_mean_reversion);
        factory
    }

    pub fn register(&mut self, kind: impl Into<String>, constructor: Constructor) {
        self.constructors.insert(kind.into(), constructor);
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Build a fresh strategy instance for one run.
    pub fn create(&self, config: &StrategyConfig) -> Result<Box<dyn Strategy>, FactoryError> {
        let constructor = self
            .constructors
            .get(&config.kind)
            .ok_or_else(|| FactoryError::UnknownStrategy(config.kind.clone()))?;
        constructor(config)
    }
}

impl Default for StrategyFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for StrategyFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyFactory")
            .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn build_momentum(config: &StrategyConfig) -> Result<Box<dyn Strategy>, FactoryError> {
    let lookback = config.param_usize("lookback", 60)?;
    Ok(Box::new(TimeSeriesMomentum::new(lookback)))
}

fn build_mean_reversion(config: &StrategyConfig) -> Result<Box<dyn Strategy>, FactoryError> {
    let window = config.param_usize("window", 20)?;
    let z_enter = config.param("z_enter", 1.0);
    Ok(Box::new(MeanReversionZ::new(window, z_enter)))
}
