//! Execution model parameters.

use serde::{Deserialize, Serialize};

/// Cost and timing parameters for one execution model. Immutable for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Commission in basis points of the effective notional.
    pub fee_bps: f64,
    pub half_spread_bps: f64,
    /// Slippage bps per unit of annualized volatility.
    pub vol_k: f64,
    /// Square-root impact coefficient.
    pub impact_k: f64,
    /// Trading bars between the decision bar and the execution bar.
    pub delay_days: usize,
    pub vol_lookback: usize,
    pub adv_lookback: usize,
    /// Fraction of trailing average share volume one fill may take. `>= 1` disables the cap.
    pub participation_rate: f64,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            fee_bps: 0.0,
            half_spread_bps: 0.0,
            vol_k: 0.0,
            impact_k: 0.0,
            delay_days: 1,
            vol_lookback: 20,
            adv_lookback: 20,
            participation_rate: 1.0,
        }
    }
}

impl ExecConfig {
    /// Zero-cost execution at the next bar's open.
    pub fn naive() -> Self {
        Self::default()
    }

    /// Fixed fee and spread, everything else frictionless.
    pub fn with_costs(fee_bps: f64, half_spread_bps: f64) -> Self {
        Self {
            fee_bps,
            half_spread_bps,
            ..Self::default()
        }
    }
}
