use serde::{Deserialize, Serialize};

/// Sizing and capital parameters. Immutable for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub initial_cash: f64,
    /// Fraction of equity a Buy signal targets.
    pub target_weight: f64,
    /// Carried for configuration compatibility. Sizing is long-only regardless.
    pub allow_short: bool,
    /// Smallest order, in shares, worth sending.
    pub min_qty: u64,
    /// Hard ceiling on one position as a fraction of equity.
    pub max_weight: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            target_weight: 1.0,
            allow_short: false,
            min_qty: 1,
            max_weight: 1.0,
        }
    }
}

impl PortfolioConfig {
    pub fn with_cash(initial_cash: f64) -> Self {
        Self {
            initial_cash,
            ..Self::default()
        }
    }
}
