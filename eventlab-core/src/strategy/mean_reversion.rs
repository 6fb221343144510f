//! Mean-reversion z-score on daily returns.
//!
//! The last daily return is standardized against the trailing `window`
//! returns (sample mean and stdev). A sharp drop below `-z_enter` is a Buy;
//! anything else is a Sell (exit).

use crate::data::HistoryView;
use crate::domain::{MarketEvent, Side, SignalEvent};
use crate::metrics::{mean, sample_std, simple_returns};

use super::Strategy;

/// Substitute for a zero or undefined stdev so the z-score stays finite.
const MIN_STDEV: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct MeanReversionZ {
    pub window: usize,
    pub z_enter: f64,
}

impl MeanReversionZ {
    pub fn new(window: usize, z_enter: f64) -> Self {
        Self { window, z_enter }
    }

    /// Z-score of the latest return against the trailing window, if enough history.
    pub fn z_score(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.window + 2 {
            return None;
        }
        let returns = simple_returns(closes);
        if returns.len() < self.window || returns.is_empty() {
            return None;
        }
        let trailing = &returns[returns.len() - self.window..];
        let mu = mean(trailing);
        let sd = sample_std(trailing);
        let sd = if sd > 0.0 { sd } else { MIN_STDEV };
        let last = returns[returns.len() - 1];
        Some((last - mu) / sd)
    }
}

impl Default for MeanReversionZ {
    fn default() -> Self {
        Self::new(20, 1.0)
    }
}

impl Strategy for MeanReversionZ {
    fn name(&self) -> &str {
        "mean_reversion_z"
    }

    fn on_market(&mut self, event: &MarketEvent, history: &HistoryView<'_>) -> Option<SignalEvent> {
        let z = self.z_score(&history.closes(&event.symbol))?;
        let side = if z < -self.z_enter { Side::Buy } else { Side::Sell };
        Some(SignalEvent::new(event.t, event.symbol.clone(), side))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_window_plus_two_closes() {
        let strat = MeanReversionZ::new(3, 1.0);
        assert!(strat.z_score(&[100.0, 101.0, 102.0, 103.0]).is_none());
        assert!(strat.z_score(&[100.0, 101.0, 102.0, 103.0, 104.0]).is_some());
    }

    #[test]
    fn sharp_drop_scores_below_threshold() {
        let strat = MeanReversionZ::new(5, 1.0);
        let mut closes = vec![100.0, 101.0, 100.5, 101.5, 101.0, 102.0];
        closes.push(92.0);
        let z = strat.z_score(&closes).unwrap();
        assert!(z < -1.0, "z = {z}");
    }

    #[test]
    fn constant_returns_do_not_divide_by_zero() {
        let strat = MeanReversionZ::new(3, 1.0);
        let z = strat.z_score(&[100.0; 6]).unwrap();
        assert_eq!(z, 0.0);
    }
}
