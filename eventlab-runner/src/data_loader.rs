//! Processed-data loading.
//!
//! One CSV per symbol under the processed directory, named `<SYMBOL>.csv`, with
//! columns `t,open,high,low,close,volume`. Empty cells load as NaN so the bar
//! store reports them as missing fields with symbol and date attached.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use eventlab_core::{Bar, BarStore, SeriesMap, ValidationError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no processed data for {symbol}: {path} does not exist")]
    MissingFile { symbol: String, path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: unparseable timestamp '{value}' on row {row}")]
    BadDate {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    t: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

#[derive(Debug, Serialize)]
struct CsvRowOut {
    t: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Path of a symbol's processed file.
pub fn processed_path(dir: &Path, symbol: &str) -> PathBuf {
    dir.join(format!("{symbol}.csv"))
}

/// Load every symbol's series. A missing file is an error, not an empty series.
pub fn load_processed(dir: &Path, symbols: &[String]) -> Result<SeriesMap, LoadError> {
    let mut data = SeriesMap::new();
    for symbol in symbols {
        let path = processed_path(dir, symbol);
        if !path.exists() {
            return Err(LoadError::MissingFile {
                symbol: symbol.clone(),
                path,
            });
        }
        let bars = read_bars_csv(&path)?;
        if bars.is_empty() {
            warn!(symbol = %symbol, path = %path.display(), "processed file has no rows");
        }
        debug!(symbol = %symbol, bars = bars.len(), "loaded series");
        data.insert(symbol.clone(), bars);
    }
    Ok(data)
}

/// Load and validate in one step.
pub fn load_store(dir: &Path, symbols: &[String]) -> Result<BarStore, LoadError> {
    Ok(BarStore::new(load_processed(dir, symbols)?)?)
}

/// Read one symbol's bars in file order.
pub fn read_bars_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;

    let mut bars = Vec::new();
    for (row, record) in reader.deserialize::<CsvRow>().enumerate() {
        let record = record.map_err(csv_err)?;
        let date = parse_timestamp(&record.t).ok_or_else(|| LoadError::BadDate {
            path: path.to_path_buf(),
            row: row + 1,
            value: record.t.clone(),
        })?;
        bars.push(Bar::new(
            date,
            record.open.unwrap_or(f64::NAN),
            record.high.unwrap_or(f64::NAN),
            record.low.unwrap_or(f64::NAN),
            record.close.unwrap_or(f64::NAN),
            record.volume.unwrap_or(f64::NAN),
        ));
    }
    Ok(bars)
}

/// Write bars in the processed layout.
pub fn write_bars_csv(path: &Path, bars: &[Bar]) -> Result<(), LoadError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LoadError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for bar in bars {
        writer
            .serialize(CsvRowOut {
                t: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            })
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Accepts `YYYY-MM-DD` and datetime stamps (`YYYY-MM-DD HH:MM:SS` or `T`-separated).
fn parse_timestamp(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            raw.split(['T', ' '])
                .next()
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// Deterministic random-walk bars for demos and tests.
///
/// The RNG is seeded from the symbol name, so the same symbol always gets the
/// same path. Weekends are skipped.
pub fn synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.02..0.021);
        let open = price * (1.0 + rng.gen_range(-0.003..0.003));
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Bar::new(current, open, high, low, close, volume));

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}
