//! EventLab CLI — experiment grids, impact sweeps, single runs, synthetic data.
//!
//! Commands:
//! - `run` — full strategy × execution model × period grid from a TOML config
//! - `sensitivity` — market-impact coefficient sweep
//! - `single` — one named cell, metrics printed as JSON
//! - `synthesize` — write deterministic synthetic processed CSVs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eventlab_core::StrategyFactory;
use eventlab_runner::{
    load_processed, processed_path, run_grid, run_impact_sweep, run_named, synthetic_bars,
    write_bars_csv, write_cell, write_grid, write_sensitivity, ExperimentConfig,
};

#[derive(Parser)]
#[command(
    name = "eventlab",
    about = "EventLab CLI — event-driven backtesting under realistic execution"
)]
struct Cli {
    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full grid and export every table.
    Run {
        /// Path to the experiment TOML.
        #[arg(long)]
        config: PathBuf,

        /// Override `outputs.out_dir`.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Sweep the market-impact coefficient for every strategy.
    Sensitivity {
        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Run one strategy under one execution model and print its metrics.
    Single {
        #[arg(long)]
        config: PathBuf,

        /// Strategy name from `[[strategies]]`.
        #[arg(long)]
        strategy: String,

        /// Execution model name from `[[execution_models]]`.
        #[arg(long)]
        exec: String,

        /// Period name from `[[periods]]`. Defaults to the whole history.
        #[arg(long)]
        period: Option<String>,

        /// Also write the equity, ledger and event tables.
        #[arg(long, default_value_t = false)]
        export: bool,
    },
    /// Write synthetic random-walk bars in the processed CSV layout.
    Synthesize {
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: String,

        #[arg(long, default_value = "data/processed")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Run { config, out_dir } => run_grid_cmd(&config, out_dir),
        Commands::Sensitivity { config, out_dir } => run_sensitivity_cmd(&config, out_dir),
        Commands::Single {
            config,
            strategy,
            exec,
            period,
            export,
        } => run_single_cmd(&config, &strategy, &exec, period.as_deref(), export),
        Commands::Synthesize {
            symbols,
            start,
            end,
            out_dir,
        } => run_synthesize(&symbols, &start, &end, &out_dir),
    }
}

/// Logs go to stderr so `single` can print clean JSON on stdout.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

fn load_config(path: &Path) -> Result<ExperimentConfig> {
    ExperimentConfig::load(path).with_context(|| format!("loading config {}", path.display()))
}

fn load_data(cfg: &ExperimentConfig) -> Result<eventlab_core::SeriesMap> {
    load_processed(&cfg.data.processed_dir, &cfg.universe.symbols).with_context(|| {
        format!(
            "loading processed data from {}",
            cfg.data.processed_dir.display()
        )
    })
}

fn run_grid_cmd(config: &Path, out_dir: Option<PathBuf>) -> Result<()> {
    let cfg = load_config(config)?;
    let out_dir = out_dir.unwrap_or_else(|| cfg.outputs.out_dir.clone());
    let data = load_data(&cfg)?;

    let report = run_grid(&cfg, &data, &StrategyFactory::with_defaults()).context("grid run failed")?;
    let written = write_grid(&report, &out_dir)?;

    for row in &report.metrics {
        println!(
            "{:<24} {:<16} sharpe {:>7.3}  cagr {:>8.4}  max_dd {:>8.4}  turnover {:>14.0}",
            row.strategy, row.exec_model, row.sharpe, row.cagr, row.max_drawdown, row.turnover
        );
    }
    info!(files = written.len(), out_dir = %out_dir.display(), "results written");
    Ok(())
}

fn run_sensitivity_cmd(config: &Path, out_dir: Option<PathBuf>) -> Result<()> {
    let cfg = load_config(config)?;
    let out_dir = out_dir.unwrap_or_else(|| cfg.outputs.out_dir.clone());
    let data = load_data(&cfg)?;

    let rows = run_impact_sweep(&cfg, &data, &StrategyFactory::with_defaults())
        .context("impact sweep failed")?;
    let path = write_sensitivity(&rows, &out_dir)?;

    for row in &rows {
        println!(
            "{:<24} impact_k {:>5.2}  sharpe {:>7.3}  cagr {:>8.4}  max_dd {:>8.4}",
            row.strategy, row.impact_k, row.sharpe, row.cagr, row.max_drawdown
        );
    }
    info!(path = %path.display(), "sensitivity written");
    Ok(())
}

fn run_single_cmd(
    config: &Path,
    strategy: &str,
    exec: &str,
    period: Option<&str>,
    export: bool,
) -> Result<()> {
    let cfg = load_config(config)?;
    let data = load_data(&cfg)?;

    let cell = run_named(&cfg, &data, &StrategyFactory::with_defaults(), strategy, exec, period)
        .with_context(|| format!("running {strategy} under {exec}"))?;

    let summary = serde_json::json!({
        "strategy": cell.strategy,
        "exec_model": cell.exec_model,
        "period": cell.period,
        "fingerprint": cell.fingerprint,
        "start": cell.start(),
        "end": cell.end(),
        "n_days": cell.n_days(),
        "final_equity": cell.result.final_equity(),
        "metrics": cell.result.metrics,
        "diagnostics": cell.result.diagnostics,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if export {
        let written = write_cell(&cell, &cfg.outputs.out_dir)?;
        info!(files = written.len(), "cell exported");
    }
    Ok(())
}

fn run_synthesize(symbols: &[String], start: &str, end: &str, out_dir: &Path) -> Result<()> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("invalid --start '{start}'"))?;
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .with_context(|| format!("invalid --end '{end}'"))?;
    anyhow::ensure!(start <= end, "--start {start} is after --end {end}");

    for symbol in symbols {
        let bars = synthetic_bars(symbol, start, end);
        let path = processed_path(out_dir, symbol);
        write_bars_csv(&path, &bars)?;
        info!(symbol = %symbol, bars = bars.len(), path = %path.display(), "synthetic series written");
    }
    Ok(())
}
