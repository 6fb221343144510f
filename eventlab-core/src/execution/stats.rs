//! Trailing statistics over an as-of-execution-bar history slice.
//!
//! Callers pass `BarStore::history_as_of(symbol, t_exec)`, so nothing here can
//! see past the execution bar. Insufficient history yields 0. A lookback of 0
//! uses the whole slice.

use crate::domain::Bar;
use crate::metrics::{mean, sample_std, simple_returns, TRADING_DAYS};

fn tail<T>(values: &[T], lookback: usize) -> &[T] {
    if lookback == 0 || lookback >= values.len() {
        values
    } else {
        &values[values.len() - lookback..]
    }
}

/// Annualized sample volatility of the last `lookback` daily close-to-close returns.
pub fn annualized_vol(history: &[Bar], lookback: usize) -> f64 {
    let closes: Vec<f64> = history.iter().map(|b| b.close).collect();
    let returns = simple_returns(&closes);
    if returns.len() < lookback.max(2) {
        return 0.0;
    }
    let sd = sample_std(tail(&returns, lookback));
    if sd.is_finite() {
        sd * TRADING_DAYS.sqrt()
    } else {
        0.0
    }
}

/// Average `close * volume` over the last `lookback` bars.
pub fn adv_dollar(history: &[Bar], lookback: usize) -> f64 {
    if history.len() < lookback.max(2) {
        return 0.0;
    }
    let dollars: Vec<f64> = tail(history, lookback).iter().map(Bar::dollar_volume).collect();
    mean(&dollars)
}

/// Average share volume over the last `lookback` bars.
pub fn adv_shares(history: &[Bar], lookback: usize) -> f64 {
    if history.len() < lookback.max(2) {
        return 0.0;
    }
    let volumes: Vec<f64> = tail(history, lookback).iter().map(|b| b.volume).collect();
    mean(&volumes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(closes: &[f64], volume: f64) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::flat(start + chrono::Duration::days(i as i64), c, volume))
            .collect()
    }

    #[test]
    fn insufficient_history_is_zero() {
        let h = bars(&[100.0, 101.0, 102.0], 1_000.0);
        assert_eq!(annualized_vol(&h, 20), 0.0);
        assert_eq!(adv_dollar(&h, 20), 0.0);
        assert_eq!(adv_shares(&h, 20), 0.0);
    }

    #[test]
    fn adv_uses_trailing_window() {
        let mut h = bars(&[10.0; 5], 100.0);
        h[4].volume = 600.0;
        // last 2 bars: (100 + 600) / 2
        assert_eq!(adv_shares(&h, 2), 350.0);
        assert_eq!(adv_dollar(&h, 2), 3_500.0);
    }

    #[test]
    fn constant_prices_have_zero_vol() {
        let h = bars(&[100.0; 30], 1_000.0);
        assert_eq!(annualized_vol(&h, 20), 0.0);
    }

    #[test]
    fn alternating_prices_have_positive_vol() {
        let closes: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
        let h = bars(&closes, 1_000.0);
        assert!(annualized_vol(&h, 20) > 0.0);
    }
}
