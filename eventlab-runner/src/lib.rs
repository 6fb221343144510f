//! EventLab Runner — experiment grids on top of `eventlab-core`.
//!
//! This crate provides:
//! - TOML experiment configuration
//! - Processed CSV loading (plus a deterministic synthetic generator)
//! - Parallel strategy × execution model × period grids
//! - Block-bootstrap Sharpe confidence intervals and inflation ratios
//! - Market-impact sensitivity sweep
//! - CSV/JSON export

pub mod bootstrap;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sensitivity;

pub use bootstrap::{block_bootstrap_sharpe, percentile, SharpeInterval};
pub use config::{
    BootstrapConfig, ConfigError, DataConfig, ExecutionModel, ExperimentConfig, LoggingConfig,
    OutputConfig, PeriodConfig, SensitivityConfig, UniverseConfig,
};
pub use data_loader::{
    load_processed, load_store, processed_path, read_bars_csv, synthetic_bars, write_bars_csv,
    LoadError,
};
pub use export::{write_cell, write_grid, write_sensitivity, CellSummary, RunSummary};
pub use runner::{
    cell_fingerprint, inflation_ratios, run_cell, run_experiment, run_grid, run_named,
    BootstrapRow, Cell, CellResult, GridReport, InflationRow, MetricsRow, PeriodMetricsRow,
    RunError, SCHEMA_VERSION,
};
pub use sensitivity::{run_impact_sweep, SensitivityRow};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<ExperimentConfig>();
        require_sync::<ExperimentConfig>();
        require_send::<CellResult>();
        require_sync::<CellResult>();
        require_send::<GridReport>();
        require_send::<RunError>();
        require_sync::<Cell<'static>>();
    }
}
