//! Period filter applied to raw series before bar store construction.

use chrono::NaiveDate;

use super::store::SeriesMap;

/// Keep only bars with `start <= date <= end`, per symbol.
///
/// Symbols whose series becomes empty are kept with an empty series so the
/// universe (and ledger columns) stay stable across periods.
pub fn slice_period(data: &SeriesMap, start: NaiveDate, end: NaiveDate) -> SeriesMap {
    data.iter()
        .map(|(sym, bars)| {
            let sliced = bars
                .iter()
                .filter(|b| b.date >= start && b.date <= end)
                .copied()
                .collect();
            (sym.clone(), sliced)
        })
        .collect()
}
