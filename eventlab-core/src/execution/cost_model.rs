//! Cost model — spread, slippage, impact and fee calculation.
//!
//! Every adjustment is directional: buyers pay more (higher price), sellers
//! receive less (lower price). The half-spread is applied first, then the
//! combined slippage + impact, multiplicatively.

use crate::domain::Side;

use super::config::ExecConfig;

const BPS: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub fee_bps: f64,
    pub half_spread_bps: f64,
    pub vol_k: f64,
    pub impact_k: f64,
}

impl CostModel {
    pub fn new(fee_bps: f64, half_spread_bps: f64, vol_k: f64, impact_k: f64) -> Self {
        Self {
            fee_bps,
            half_spread_bps,
            vol_k,
            impact_k,
        }
    }

    pub fn from_config(config: &ExecConfig) -> Self {
        Self::new(
            config.fee_bps,
            config.half_spread_bps,
            config.vol_k,
            config.impact_k,
        )
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Volatility-scaled slippage in bps: `vol_k * annualized_vol`.
    pub fn slip_bps(&self, vol_ann: f64) -> f64 {
        self.vol_k * vol_ann
    }

    /// Square-root impact in bps: `impact_k * sqrt(trade_value / adv_dollar) * 1e4`.
    ///
    /// Zero when there is no dollar-volume history or no impact coefficient.
    pub fn impact_bps(&self, trade_value: f64, adv_dollar: f64) -> f64 {
        if adv_dollar > 0.0 && self.impact_k > 0.0 {
            self.impact_k * (trade_value / adv_dollar).sqrt() * BPS
        } else {
            0.0
        }
    }

    /// Effective execution price after the spread and the slippage + impact legs.
    pub fn effective_price(&self, side: Side, base_price: f64, slip_bps: f64, impact_bps: f64) -> f64 {
        let sign = side.sign();
        let after_spread = base_price * (1.0 + sign * self.half_spread_bps / BPS);
        after_spread * (1.0 + sign * (slip_bps + impact_bps) / BPS)
    }

    /// Commission on the effective notional.
    pub fn fee(&self, price: f64, quantity: u64) -> f64 {
        self.fee_bps / BPS * price * quantity as f64
    }
}
