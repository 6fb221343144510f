//! Execution simulator — turns an order into a (possibly partial, possibly
//! absent) fill.
//!
//! The simulator is stateless: it carries only configuration. It borrows the
//! bar store, reads nothing beyond the execution bar, and hands the resulting
//! `FillEvent` back to the caller for settlement.
//!
//! Cost ladder, applied in the order's adverse direction:
//! 1. half-spread
//! 2. volatility-scaled slippage + square-root market impact
//! 3. fee on the effective notional

pub mod config;
pub mod cost_model;
pub mod liquidity;
pub mod simulator;
pub mod stats;

pub use config::ExecConfig;
pub use cost_model::CostModel;
pub use liquidity::ParticipationCap;
pub use simulator::{ExecutionOutcome, ExecutionSimulator};
