//! Portfolio state — cash, integer share positions, last observed prices.

use std::collections::BTreeMap;

/// Aggregate portfolio state.
///
/// The accounting identity must hold at every ledger row:
/// `equity == cash + sum(position * last_price)`.
/// Positions are share counts; the reference sizing policy keeps them non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub positions: BTreeMap<String, i64>,
    pub last_price: BTreeMap<String, f64>,
}

impl PortfolioState {
    /// Fresh state with a zero position for every symbol.
    pub fn new<S: AsRef<str>>(cash: f64, symbols: &[S]) -> Self {
        Self {
            cash,
            positions: symbols
                .iter()
                .map(|s| (s.as_ref().to_string(), 0))
                .collect(),
            last_price: BTreeMap::new(),
        }
    }

    /// Total equity = cash + sum of marked position values.
    ///
    /// A position without an observed price contributes nothing.
    pub fn equity(&self) -> f64 {
        let position_value: f64 = self
            .positions
            .iter()
            .filter_map(|(sym, &qty)| self.last_price.get(sym).map(|px| qty as f64 * px))
            .sum();
        self.cash + position_value
    }

    pub fn position(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.last_price.get(symbol).copied()
    }

    /// Marked value of the position in `symbol` (0 when unpriced).
    pub fn position_value(&self, symbol: &str) -> f64 {
        self.price(symbol)
            .map(|px| self.position(symbol) as f64 * px)
            .unwrap_or(0.0)
    }
}
