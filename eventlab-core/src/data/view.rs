//! As-of view — the only window a strategy gets onto the bar store.
//!
//! A `HistoryView` is pinned to a decision time and exposes nothing but
//! `history_as_of` at that time, so a strategy cannot read future bars
//! even by accident.

use chrono::NaiveDate;

use super::store::BarStore;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy)]
pub struct HistoryView<'a> {
    store: &'a BarStore,
    as_of: NaiveDate,
}

impl<'a> HistoryView<'a> {
    pub(crate) fn new(store: &'a BarStore, as_of: NaiveDate) -> Self {
        Self { store, as_of }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Bars for `symbol` dated on or before the view's time, ascending.
    pub fn history(&self, symbol: &str) -> &'a [Bar] {
        self.store.history_as_of(symbol, self.as_of)
    }

    /// Closing prices for `symbol` up to the view's time.
    pub fn closes(&self, symbol: &str) -> Vec<f64> {
        self.history(symbol).iter().map(|b| b.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SeriesMap;

    #[test]
    fn view_never_sees_past_as_of() {
        let d = |i: u32| NaiveDate::from_ymd_opt(2020, 1, i).unwrap();
        let mut data = SeriesMap::new();
        data.insert(
            "SPY".into(),
            (1..=10).map(|i| Bar::flat(d(i), i as f64, 1.0)).collect(),
        );
        let store = BarStore::new(data).unwrap();
        let view = store.view_as_of(d(4));
        assert_eq!(view.closes("SPY"), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(view.history("QQQ").is_empty());
    }
}
