//! Performance metrics — pure functions that reduce a run to summary statistics.
//!
//! Every metric is a pure function: equity (and turnover) in, scalar out.
//! The small statistics helpers here are shared by strategies and the execution
//! simulator so that every component uses the same sample conventions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trading days per year, used to annualize daily statistics.
pub const TRADING_DAYS: f64 = 252.0;

/// Calendar days per year, used for CAGR.
pub const CALENDAR_DAYS: f64 = 365.25;

/// Added to the Sharpe denominator so a flat curve yields 0 instead of NaN.
pub const SHARPE_EPSILON: f64 = 1e-12;

/// Summary statistics of one backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub cagr: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub vol_ann: f64,
    pub turnover: f64,
}

impl Metrics {
    /// Reduce an equity series and an aligned turnover series.
    ///
    /// With fewer than two return observations every ratio is 0; turnover is
    /// always the plain sum.
    pub fn compute(equity: &[(NaiveDate, f64)], turnover: &[f64]) -> Self {
        let total_turnover: f64 = turnover.iter().sum();
        let values: Vec<f64> = equity.iter().map(|&(_, v)| v).collect();
        let returns = simple_returns(&values);
        if returns.len() < 2 {
            return Self {
                turnover: total_turnover,
                ..Self::default()
            };
        }

        let first = equity[0];
        let last = equity[equity.len() - 1];
        let days = (last.0 - first.0).num_days() as f64;

        Self {
            cagr: cagr(first.1, last.1, days),
            sharpe: sharpe_ratio(&returns),
            max_drawdown: max_drawdown(&values),
            vol_ann: annualized_vol(&returns),
            turnover: total_turnover,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Compound annual growth rate over `calendar_days`.
///
/// The year count is floored at 1e-9 so a same-day curve does not divide by zero.
pub fn cagr(first: f64, last: f64, calendar_days: f64) -> f64 {
    let years = (calendar_days / CALENDAR_DAYS).max(1e-9);
    (last / first).powf(1.0 / years) - 1.0
}

/// Annualized Sharpe ratio: `mean / (sample std + eps) * sqrt(252)`.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    mean(returns) / (sample_std(returns) + SHARPE_EPSILON) * TRADING_DAYS.sqrt()
}

/// Sample standard deviation of returns scaled by `sqrt(252)`.
pub fn annualized_vol(returns: &[f64]) -> f64 {
    sample_std(returns) * TRADING_DAYS.sqrt()
}

/// Maximum drawdown as a non-positive fraction (e.g. -0.15 = 15% drawdown).
///
/// Minimum over time of `equity / running_max(equity) - 1`.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        peak = peak.max(eq);
        max_dd = max_dd.min(eq / peak - 1.0);
    }
    max_dd
}

// ─── Shared helpers ─────────────────────────────────────────────────

/// Simple returns `x[i] / x[i-1] - 1`; NaN results are dropped.
pub fn simple_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .filter(|r| !r.is_nan())
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample (ddof = 1) standard deviation. NaN for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}
