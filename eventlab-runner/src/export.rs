//! Export: CSV tables, per-cell curves, event logs, and a JSON run summary.
//!
//! Layout under the output directory:
//! - `tables/metrics.csv`, `metrics_by_period.csv`, `bootstrap_ci.csv`, `inflation_ratios.csv`
//! - `tables/sensitivity_kimp.csv` (impact sweep)
//! - `tables/equity_<strategy>__<exec>.csv`, `tables/ledger_<strategy>__<exec>.csv`
//! - `events/events_<strategy>__<exec>.csv` (only cells that recorded events)
//! - `summary.json`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use eventlab_core::{LedgerRow, Metrics, RunDiagnostics};

use crate::runner::{CellResult, GridReport, SCHEMA_VERSION};
use crate::sensitivity::SensitivityRow;

pub const TABLES_DIR: &str = "tables";
pub const EVENTS_DIR: &str = "events";
pub const SUMMARY_FILE: &str = "summary.json";

/// Per-cell entry of `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSummary {
    pub strategy: String,
    pub exec_model: String,
    pub fingerprint: String,
    pub final_equity: Option<f64>,
    pub metrics: Metrics,
    pub diagnostics: RunDiagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,
    pub cells: Vec<CellSummary>,
}

impl RunSummary {
    pub fn from_report(report: &GridReport) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            cells: report
                .cells
                .iter()
                .map(|c| CellSummary {
                    strategy: c.strategy.clone(),
                    exec_model: c.exec_model.clone(),
                    fingerprint: c.fingerprint.clone(),
                    final_equity: c.result.final_equity(),
                    metrics: c.result.metrics,
                    diagnostics: c.result.diagnostics,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct EquityPoint {
    t: chrono::NaiveDate,
    equity: f64,
}

/// Write every artefact of a grid run. Returns the files written.
pub fn write_grid(report: &GridReport, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let tables = ensure_dir(&out_dir.join(TABLES_DIR))?;
    let mut written = vec![
        write_rows(&tables.join("metrics.csv"), &report.metrics)?,
        write_rows(&tables.join("metrics_by_period.csv"), &report.period_metrics)?,
        write_rows(&tables.join("bootstrap_ci.csv"), &report.bootstrap)?,
        write_rows(&tables.join("inflation_ratios.csv"), &report.inflation)?,
    ];

    for cell in &report.cells {
        written.extend(write_cell(cell, out_dir)?);
    }

    let summary_path = out_dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(&RunSummary::from_report(report))
        .context("failed to serialize run summary")?;
    std::fs::write(&summary_path, json)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;
    written.push(summary_path);

    info!(files = written.len(), out_dir = %out_dir.display(), "grid exported");
    Ok(written)
}

/// Equity and ledger tables for one cell, plus its event log when it has one.
pub fn write_cell(cell: &CellResult, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let stem = cell.file_stem();
    let tables = ensure_dir(&out_dir.join(TABLES_DIR))?;

    let equity: Vec<EquityPoint> = cell
        .result
        .equity
        .iter()
        .map(|&(t, equity)| EquityPoint { t, equity })
        .collect();
    let mut written = vec![
        write_rows(&tables.join(format!("equity_{stem}.csv")), &equity)?,
        write_ledger(&tables.join(format!("ledger_{stem}.csv")), &cell.result.ledger)?,
    ];

    if !cell.result.events.is_empty() {
        let events = ensure_dir(&out_dir.join(EVENTS_DIR))?;
        written.push(write_rows(
            &events.join(format!("events_{stem}.csv")),
            &cell.result.events,
        )?);
    }
    Ok(written)
}

pub fn write_sensitivity(rows: &[SensitivityRow], out_dir: &Path) -> Result<PathBuf> {
    let tables = ensure_dir(&out_dir.join(TABLES_DIR))?;
    write_rows(&tables.join("sensitivity_kimp.csv"), rows)
}

/// Serialize rows with a header taken from the first row's field names.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<PathBuf> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Ledger as `t,cash,equity,pos_<SYM>...`, one column per symbol ever held or tracked.
pub fn write_ledger(path: &Path, ledger: &[LedgerRow]) -> Result<PathBuf> {
    let symbols: BTreeSet<&str> = ledger
        .iter()
        .flat_map(|row| row.positions.keys().map(String::as_str))
        .collect();

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec!["t".to_string(), "cash".to_string(), "equity".to_string()];
    header.extend(symbols.iter().map(|s| format!("pos_{s}")));
    wtr.write_record(&header)?;

    for row in ledger {
        let mut record = vec![row.t.to_string(), row.cash.to_string(), row.equity.to_string()];
        record.extend(
            symbols
                .iter()
                .map(|s| row.positions.get(*s).copied().unwrap_or(0).to_string()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(path.to_path_buf())
}

fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;
    Ok(dir.to_path_buf())
}
