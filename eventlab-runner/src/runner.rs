//! Grid runner: every strategy × execution model, over the full history and
//! each configured period.
//!
//! Each cell builds its own store, strategy and backtester from a shared,
//! read-only copy of the loaded series, so cells run in parallel without
//! coordination.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use eventlab_core::{
    slice_period, BacktestResult, Backtester, EventLog, ExecConfig, FactoryError, Metrics,
    PortfolioConfig, SeriesMap, StrategyConfig, StrategyFactory, ValidationError,
};

use crate::bootstrap::{block_bootstrap_sharpe, SharpeInterval};
use crate::config::{ConfigError, ExecutionModel, ExperimentConfig, PeriodConfig};
use crate::data_loader::{load_processed, LoadError};

/// Version stamp written into persisted summaries.
pub const SCHEMA_VERSION: u32 = 1;

/// Added to inflation-ratio denominators.
const RATIO_EPSILON: f64 = 1e-12;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("invalid series: {0}")]
    Validation(#[from] ValidationError),
    #[error("composition error: {0}")]
    Composition(#[from] FactoryError),
    #[error("failed to fingerprint cell: {0}")]
    Fingerprint(#[from] serde_json::Error),
    #[error("no {kind} named '{name}' in the experiment config")]
    UnknownName { kind: &'static str, name: String },
}

// ─── Cells ───────────────────────────────────────────────────────────

/// One point of the grid.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub strategy: &'a StrategyConfig,
    pub exec: &'a ExecutionModel,
    /// `None` runs the whole loaded history.
    pub period: Option<&'a PeriodConfig>,
}

/// Result of one cell plus its identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellResult {
    pub strategy: String,
    pub exec_model: String,
    pub period: Option<String>,
    pub fingerprint: String,
    pub result: BacktestResult,
}

impl CellResult {
    pub fn start(&self) -> Option<NaiveDate> {
        self.result.equity.first().map(|&(t, _)| t)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.result.equity.last().map(|&(t, _)| t)
    }

    pub fn n_days(&self) -> usize {
        self.result.equity.len()
    }

    /// `<strategy>__<exec>` file-name stem.
    pub fn file_stem(&self) -> String {
        format!("{}__{}", self.strategy, self.exec_model)
    }
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    strategy: &'a StrategyConfig,
    exec: &'a ExecConfig,
    portfolio: &'a PortfolioConfig,
    period: Option<&'a PeriodConfig>,
}

/// Deterministic BLAKE3 identity of a cell's full configuration.
pub fn cell_fingerprint(cell: &Cell<'_>, portfolio: &PortfolioConfig) -> Result<String, RunError> {
    let bytes = serde_json::to_vec(&FingerprintInput {
        strategy: cell.strategy,
        exec: &cell.exec.params,
        portfolio,
        period: cell.period,
    })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Run one cell. No I/O.
pub fn run_cell(
    data: &SeriesMap,
    factory: &StrategyFactory,
    portfolio: &PortfolioConfig,
    cell: Cell<'_>,
    record_events: bool,
) -> Result<CellResult, RunError> {
    let fingerprint = cell_fingerprint(&cell, portfolio)?;
    let strategy = factory.create(cell.strategy)?;

    let series = match cell.period {
        Some(period) => {
            let sliced = slice_period(data, period.start, period.end);
            if sliced.values().all(Vec::is_empty) {
                warn!(
                    period = %period.name,
                    start = %period.start,
                    end = %period.end,
                    "no bars inside period"
                );
            }
            sliced
        }
        None => data.clone(),
    };

    let result = Backtester::from_series(
        series,
        None,
        strategy,
        portfolio.clone(),
        cell.exec.params.clone(),
    )?
    .with_event_log(EventLog::new(record_events))
    .run();

    info!(
        strategy = %cell.strategy.name,
        exec = %cell.exec.name,
        period = cell.period.map_or("full", |p| p.name.as_str()),
        sharpe = result.metrics.sharpe,
        cagr = result.metrics.cagr,
        max_dd = result.metrics.max_drawdown,
        "cell complete"
    );

    Ok(CellResult {
        strategy: cell.strategy.name.clone(),
        exec_model: cell.exec.name.clone(),
        period: cell.period.map(|p| p.name.clone()),
        fingerprint,
        result,
    })
}

// ─── Report rows ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub strategy: String,
    pub exec_model: String,
    pub cagr: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub vol_ann: f64,
    pub turnover: f64,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub n_days: usize,
}

impl MetricsRow {
    fn from_cell(cell: &CellResult) -> Self {
        let m = &cell.result.metrics;
        Self {
            strategy: cell.strategy.clone(),
            exec_model: cell.exec_model.clone(),
            cagr: m.cagr,
            sharpe: m.sharpe,
            max_drawdown: m.max_drawdown,
            vol_ann: m.vol_ann,
            turnover: m.turnover,
            start: cell.start(),
            end: cell.end(),
            n_days: cell.n_days(),
        }
    }
}

/// Metrics of one cell restricted to a named period. `start`/`end` are the
/// configured bounds, not the first and last bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetricsRow {
    pub period: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub strategy: String,
    pub exec_model: String,
    pub cagr: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub vol_ann: f64,
    pub turnover: f64,
    pub n_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapRow {
    pub strategy: String,
    pub exec_model: String,
    pub sharpe_ci_lo: f64,
    pub sharpe_ci_hi: f64,
    pub bootstrap_n: usize,
    pub block_size: usize,
}

/// How much the baseline execution model overstates a strategy relative to `exec_model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationRow {
    pub strategy: String,
    pub exec_model: String,
    pub sharpe_inflation_ratio: f64,
    pub cagr_inflation_ratio: f64,
}

/// Everything a grid run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridReport {
    /// Full-history cells, in `(strategy, exec_model)` order.
    pub cells: Vec<CellResult>,
    pub metrics: Vec<MetricsRow>,
    pub period_metrics: Vec<PeriodMetricsRow>,
    pub bootstrap: Vec<BootstrapRow>,
    pub inflation: Vec<InflationRow>,
}

// ─── Grid ────────────────────────────────────────────────────────────

/// Load the configured universe and run the whole grid.
pub fn run_experiment(config: &ExperimentConfig) -> Result<GridReport, RunError> {
    let data = load_processed(&config.data.processed_dir, &config.universe.symbols)?;
    run_grid(config, &data, &StrategyFactory::with_defaults())
}

/// Full-history runs (event log per config) followed by per-period runs.
pub fn run_grid(
    config: &ExperimentConfig,
    data: &SeriesMap,
    factory: &StrategyFactory,
) -> Result<GridReport, RunError> {
    let record_events = config.logging.enable_event_log;

    let full_cells: Vec<Cell<'_>> = grid_cells(config, None).collect();
    let mut cells = full_cells
        .par_iter()
        .map(|&cell| run_cell(data, factory, &config.portfolio, cell, record_events))
        .collect::<Result<Vec<_>, RunError>>()?;
    cells.sort_by(|a, b| (&a.strategy, &a.exec_model).cmp(&(&b.strategy, &b.exec_model)));

    let period_cells: Vec<Cell<'_>> = config
        .periods
        .iter()
        .flat_map(|period| grid_cells(config, Some(period)))
        .collect();
    let mut period_metrics = period_cells
        .par_iter()
        .map(|&cell| {
            let out = run_cell(data, factory, &config.portfolio, cell, false)?;
            Ok(period_row(&cell, &out))
        })
        .collect::<Result<Vec<_>, RunError>>()?;
    period_metrics.sort_by(|a, b| {
        (&a.period, &a.strategy, &a.exec_model).cmp(&(&b.period, &b.strategy, &b.exec_model))
    });

    let metrics: Vec<MetricsRow> = cells.iter().map(MetricsRow::from_cell).collect();

    let bootstrap: Vec<BootstrapRow> = cells
        .par_iter()
        .map(|cell| {
            let ci = block_bootstrap_sharpe(&cell.result.return_values(), &config.bootstrap);
            bootstrap_row(cell, ci, config)
        })
        .collect();

    let inflation = inflation_ratios(&metrics, &config.baseline_exec_model);

    info!(
        cells = cells.len(),
        period_cells = period_metrics.len(),
        "grid complete"
    );

    Ok(GridReport {
        cells,
        metrics,
        period_metrics,
        bootstrap,
        inflation,
    })
}

/// One named cell on demand. `period = None` runs the whole history.
pub fn run_named(
    config: &ExperimentConfig,
    data: &SeriesMap,
    factory: &StrategyFactory,
    strategy: &str,
    exec: &str,
    period: Option<&str>,
) -> Result<CellResult, RunError> {
    let unknown = |kind, name: &str| RunError::UnknownName {
        kind,
        name: name.to_string(),
    };
    let strategy = config
        .strategy(strategy)
        .ok_or_else(|| unknown("strategy", strategy))?;
    let exec = config
        .execution_model(exec)
        .ok_or_else(|| unknown("execution model", exec))?;
    let period = match period {
        Some(name) => Some(config.period(name).ok_or_else(|| unknown("period", name))?),
        None => None,
    };
    run_cell(
        data,
        factory,
        &config.portfolio,
        Cell {
            strategy,
            exec,
            period,
        },
        config.logging.enable_event_log,
    )
}

fn grid_cells<'a>(
    config: &'a ExperimentConfig,
    period: Option<&'a PeriodConfig>,
) -> impl Iterator<Item = Cell<'a>> + 'a {
    config.strategies.iter().flat_map(move |strategy| {
        config.execution_models.iter().map(move |exec| Cell {
            strategy,
            exec,
            period,
        })
    })
}

fn period_row(cell: &Cell<'_>, out: &CellResult) -> PeriodMetricsRow {
    let (period, start, end) = match cell.period {
        Some(p) => (p.name.clone(), p.start, p.end),
        None => {
            let full = PeriodConfig::full();
            (full.name, full.start, full.end)
        }
    };
    let Metrics {
        cagr,
        sharpe,
        max_drawdown,
        vol_ann,
        turnover,
    } = out.result.metrics;
    PeriodMetricsRow {
        period,
        start,
        end,
        strategy: out.strategy.clone(),
        exec_model: out.exec_model.clone(),
        cagr,
        sharpe,
        max_drawdown,
        vol_ann,
        turnover,
        n_days: out.n_days(),
    }
}

fn bootstrap_row(cell: &CellResult, ci: SharpeInterval, config: &ExperimentConfig) -> BootstrapRow {
    BootstrapRow {
        strategy: cell.strategy.clone(),
        exec_model: cell.exec_model.clone(),
        sharpe_ci_lo: ci.lo,
        sharpe_ci_hi: ci.hi,
        bootstrap_n: config.bootstrap.n_samples,
        block_size: config.bootstrap.block_size,
    }
}

/// Ratios of baseline metrics to every other execution model's metrics.
///
/// Strategies without exactly one baseline row are skipped; the baseline
/// itself gets no row.
pub fn inflation_ratios(metrics: &[MetricsRow], baseline: &str) -> Vec<InflationRow> {
    let mut strategies: Vec<&str> = metrics.iter().map(|m| m.strategy.as_str()).collect();
    strategies.sort_unstable();
    strategies.dedup();

    let mut rows = Vec::new();
    for strategy in strategies {
        let mut base_rows = metrics
            .iter()
            .filter(|m| m.strategy == strategy && m.exec_model == baseline);
        let (Some(base), None) = (base_rows.next(), base_rows.next()) else {
            warn!(strategy, baseline, "skipping inflation ratios: need exactly one baseline row");
            continue;
        };
        rows.extend(
            metrics
                .iter()
                .filter(|m| m.strategy == strategy && m.exec_model != baseline)
                .map(|m| InflationRow {
                    strategy: m.strategy.clone(),
                    exec_model: m.exec_model.clone(),
                    sharpe_inflation_ratio: base.sharpe / (m.sharpe + RATIO_EPSILON),
                    cagr_inflation_ratio: base.cagr / (m.cagr + RATIO_EPSILON),
                }),
        );
    }
    rows
}
