use serde::{Deserialize, Serialize};

use crate::domain::{LedgerRow, Series};
use crate::metrics::Metrics;

use super::event_log::EventRecord;

/// Counts of what happened inside one run. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub signals: usize,
    pub orders: usize,
    pub fills: usize,
    pub expired_orders: usize,
    /// Orders the participation cap reduced to nothing.
    pub unfilled_orders: usize,
    pub reclamped_buys: usize,
    pub reclamped_sells: usize,
    /// Fills with no effect on the portfolio.
    pub dropped_fills: usize,
}

/// Everything one backtest run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// One point per timeline entry, taken from the ledger.
    pub equity: Series,
    pub ledger: Vec<LedgerRow>,
    /// Simple returns of `equity`, dated by the later point.
    pub returns: Series,
    /// Traded base notional per ledger date (0 where nothing filled).
    pub turnover: Series,
    pub metrics: Metrics,
    pub diagnostics: RunDiagnostics,
    /// Empty unless the run had an enabled event log.
    pub events: Vec<EventRecord>,
}

impl BacktestResult {
    pub fn final_equity(&self) -> Option<f64> {
        self.equity.last().map(|&(_, v)| v)
    }

    pub fn return_values(&self) -> Vec<f64> {
        self.returns.iter().map(|&(_, r)| r).collect()
    }
}
