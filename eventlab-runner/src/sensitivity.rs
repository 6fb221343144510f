//! Market-impact sensitivity: how each strategy degrades as `impact_k` grows.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use eventlab_core::{SeriesMap, StrategyFactory};

use crate::config::{ExecutionModel, ExperimentConfig};
use crate::runner::{run_cell, Cell, RunError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub strategy: String,
    pub impact_k: f64,
    pub sharpe: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
}

/// Full-history run of every strategy at every configured `impact_k`.
///
/// Rows come back grouped by strategy (config order), then by `impact_k` in list order.
pub fn run_impact_sweep(
    config: &ExperimentConfig,
    data: &SeriesMap,
    factory: &StrategyFactory,
) -> Result<Vec<SensitivityRow>, RunError> {
    let sweep = &config.sensitivity;
    let points: Vec<(usize, ExecutionModel)> = config
        .strategies
        .iter()
        .enumerate()
        .flat_map(|(i, _)| {
            sweep
                .impact_k_values
                .iter()
                .map(move |&k| (i, ExecutionModel::new(format!("impact_k={k}"), sweep.exec_for(k))))
        })
        .collect();

    let rows = points
        .par_iter()
        .map(|(i, exec)| {
            let strategy = &config.strategies[*i];
            let cell = Cell {
                strategy,
                exec,
                period: None,
            };
            let out = run_cell(data, factory, &config.portfolio, cell, false)?;
            let m = out.result.metrics;
            Ok(SensitivityRow {
                strategy: strategy.name.clone(),
                impact_k: exec.params.impact_k,
                sharpe: m.sharpe,
                cagr: m.cagr,
                max_drawdown: m.max_drawdown,
            })
        })
        .collect::<Result<Vec<_>, RunError>>()?;

    info!(points = rows.len(), "impact sweep complete");
    Ok(rows)
}
