//! Time-series momentum — trailing return over `lookback` bars decides the side.

use crate::data::HistoryView;
use crate::domain::{MarketEvent, Side, SignalEvent};

use super::Strategy;

/// Buy when the close-to-close return over the last `lookback` bars is
/// positive, Sell (exit) otherwise. Needs `lookback + 1` observations.
#[derive(Debug, Clone)]
pub struct TimeSeriesMomentum {
    pub lookback: usize,
}

impl TimeSeriesMomentum {
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }
}

impl Default for TimeSeriesMomentum {
    fn default() -> Self {
        Self::new(60)
    }
}

impl Strategy for TimeSeriesMomentum {
    fn name(&self) -> &str {
        "time_series_momentum"
    }

    fn on_market(&mut self, event: &MarketEvent, history: &HistoryView<'_>) -> Option<SignalEvent> {
        let bars = history.history(&event.symbol);
        let n = bars.len();
        if n < self.lookback + 1 {
            return None;
        }
        let trailing = bars[n - 1].close / bars[n - 1 - self.lookback].close - 1.0;
        let side = if trailing > 0.0 { Side::Buy } else { Side::Sell };
        Some(SignalEvent::new(event.t, event.symbol.clone(), side))
    }
}
