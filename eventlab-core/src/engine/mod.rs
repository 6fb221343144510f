//! Backtesting engine — the timestep loop and its run artefacts.
//!
//! Per timestep:
//! 1. Enqueue one Market event per symbol with a bar at `t`
//! 2. Mark to market and append the ledger row
//! 3. Drain the queue: Market → Strategy, Signal → Portfolio, Order → Execution,
//!    Fill → Portfolio + turnover

pub mod backtester;
pub mod event_log;
pub mod result;

pub use backtester::Backtester;
pub use event_log::{EventLog, EventObserver, EventRecord};
pub use result::{BacktestResult, RunDiagnostics};
