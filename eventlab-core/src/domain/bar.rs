//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol on a single day.
///
/// Bars are immutable once stored in a [`BarStore`](crate::data::BarStore).
/// The symbol lives on the series key, not on the bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Flat bar: every price equals `price`.
    pub fn flat(date: NaiveDate, price: f64, volume: f64) -> Self {
        Self::new(date, price, price, price, price, volume)
    }

    /// Name of the first OHLCV field that is not a finite number, if any.
    ///
    /// Loaders encode an absent cell as NaN, so a non-finite field is a missing field.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    /// Dollar volume traded on this bar (close × volume).
    pub fn dollar_volume(&self) -> f64 {
        self.close * self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            100.0,
            105.0,
            98.0,
            103.0,
            50_000.0,
        )
    }

    #[test]
    fn complete_bar_has_no_missing_field() {
        assert_eq!(sample_bar().missing_field(), None);
    }

    #[test]
    fn nan_field_is_reported_by_name() {
        let mut bar = sample_bar();
        bar.low = f64::NAN;
        assert_eq!(bar.missing_field(), Some("low"));
        bar.open = f64::INFINITY;
        assert_eq!(bar.missing_field(), Some("open"));
    }

    #[test]
    fn dollar_volume_uses_close() {
        assert_eq!(sample_bar().dollar_volume(), 103.0 * 50_000.0);
    }
}
