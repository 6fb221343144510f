//! Bar store — validated per-symbol series, merged timeline, causal history.
//!
//! The store is built once per run and is read-only afterwards except for the
//! timeline cursor, which the backtester rewinds at run start.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use super::view::HistoryView;
use crate::domain::Bar;

/// Raw input: symbol → bars, in any order.
pub type SeriesMap = BTreeMap<String, Vec<Bar>>;

/// Malformed input series. Fatal at construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{symbol}: missing or non-finite field '{field}' on {date}")]
    MissingField {
        symbol: String,
        date: NaiveDate,
        field: &'static str,
    },

    #[error("{symbol}: duplicate timestamp {date}")]
    DuplicateTimestamp { symbol: String, date: NaiveDate },

    #[error("series with an empty symbol name")]
    EmptySymbol,
}

/// Validated, time-indexed OHLCV series for every symbol in the universe.
#[derive(Debug, Clone)]
pub struct BarStore {
    series: BTreeMap<String, Vec<Bar>>,
    timeline: Vec<NaiveDate>,
    cursor: usize,
}

impl BarStore {
    /// Validate, sort each series ascending, and build the merged timeline.
    pub fn new(data: SeriesMap) -> Result<Self, ValidationError> {
        let mut series = BTreeMap::new();
        let mut dates = BTreeSet::new();

        for (symbol, mut bars) in data {
            if symbol.trim().is_empty() {
                return Err(ValidationError::EmptySymbol);
            }
            if let Some((date, field)) = bars
                .iter()
                .find_map(|b| b.missing_field().map(|f| (b.date, f)))
            {
                return Err(ValidationError::MissingField {
                    symbol,
                    date,
                    field,
                });
            }

            bars.sort_by_key(|b| b.date);
            if let Some(w) = bars.windows(2).find(|w| w[0].date == w[1].date) {
                return Err(ValidationError::DuplicateTimestamp {
                    date: w[0].date,
                    symbol,
                });
            }

            dates.extend(bars.iter().map(|b| b.date));
            series.insert(symbol, bars);
        }

        Ok(Self {
            series,
            timeline: dates.into_iter().collect(),
            cursor: 0,
        })
    }

    /// Symbols in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Sorted, duplicate-free union of every symbol's timestamps.
    pub fn timeline(&self) -> &[NaiveDate] {
        &self.timeline
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.timeline.len()
    }

    /// Advance the clock.
    ///
    /// # Panics
    /// Panics when the timeline is exhausted. Callers must check [`has_next`](Self::has_next).
    pub fn next_time(&mut self) -> NaiveDate {
        assert!(
            self.has_next(),
            "next_time called past the end of the timeline ({} entries)",
            self.timeline.len()
        );
        let t = self.timeline[self.cursor];
        self.cursor += 1;
        t
    }

    /// The bar for `symbol` at exactly `t`, or `None` if it did not trade.
    pub fn bar(&self, symbol: &str, t: NaiveDate) -> Option<&Bar> {
        let bars = self.series.get(symbol)?;
        bars.binary_search_by_key(&t, |b| b.date)
            .ok()
            .map(|i| &bars[i])
    }

    /// All bars for `symbol` with timestamp `<= t`, ascending.
    ///
    /// This is the only read path for components that must not look ahead.
    pub fn history_as_of(&self, symbol: &str, t: NaiveDate) -> &[Bar] {
        match self.series.get(symbol) {
            Some(bars) => &bars[..bars.partition_point(|b| b.date <= t)],
            None => &[],
        }
    }

    /// A read-only window over the store that cannot see past `t`.
    pub fn view_as_of(&self, t: NaiveDate) -> HistoryView<'_> {
        HistoryView::new(self, t)
    }

    /// Index of the first bar for `symbol` dated at or after `t`.
    pub(crate) fn index_on_or_after(&self, symbol: &str, t: NaiveDate) -> Option<usize> {
        let bars = self.series.get(symbol)?;
        let idx = bars.partition_point(|b| b.date < t);
        (idx < bars.len()).then_some(idx)
    }

    /// Bar at a positional index in `symbol`'s series.
    pub(crate) fn bar_at(&self, symbol: &str, index: usize) -> Option<&Bar> {
        self.series.get(symbol)?.get(index)
    }

    /// Number of bars stored for `symbol`.
    pub fn len(&self, symbol: &str) -> usize {
        self.series.get(symbol).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }
}
