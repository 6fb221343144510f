//! EventLab Core — event model, bar store, strategies, execution, accounting, backtester.
//!
//! This crate contains the event-driven backtesting engine:
//! - Domain types (bars, the four event variants, portfolio state, ledger rows)
//! - Bar store with a merged timeline and as-of history queries
//! - FIFO dispatch queue drained once per timestep
//! - Strategy capability, two reference policies and an explicit factory
//! - Execution simulator: delay, spread, slippage, impact, participation cap
//! - Portfolio accountant with reclamp-instead-of-reject settlement
//! - Metrics reducer (CAGR, Sharpe, max drawdown, volatility, turnover)
//!
//! No I/O. Loading, experiment grids and export live in `eventlab-runner`.

pub mod data;
pub mod domain;
pub mod engine;
pub mod execution;
pub mod metrics;
pub mod portfolio;
pub mod queue;
pub mod strategy;

pub use data::{slice_period, BarStore, HistoryView, SeriesMap, ValidationError};
pub use domain::{Bar, Event, FillEvent, LedgerRow, MarketEvent, OrderEvent, Series, Side, SignalEvent};
pub use engine::{BacktestResult, Backtester, EventLog, EventObserver, EventRecord, RunDiagnostics};
pub use execution::{ExecConfig, ExecutionOutcome, ExecutionSimulator};
pub use metrics::Metrics;
pub use portfolio::{Portfolio, PortfolioConfig, SettlementOutcome};
pub use strategy::{FactoryError, Strategy, StrategyConfig, StrategyFactory};
