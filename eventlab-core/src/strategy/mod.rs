//! Strategy capability — as-of history in, optional trading signal out.
//!
//! Strategies are portfolio-agnostic: they receive the market event and a
//! [`HistoryView`] pinned to the event's time, never portfolio state and never
//! bars dated after the event.

pub mod factory;
pub mod mean_reversion;
pub mod momentum;

pub use factory::{FactoryError, StrategyConfig, StrategyFactory};
pub use mean_reversion::MeanReversionZ;
pub use momentum::TimeSeriesMomentum;

use crate::data::HistoryView;
use crate::domain::{MarketEvent, SignalEvent};

/// A pluggable trading policy.
///
/// Implementations may be stateless or keep an internal cache, but their
/// decisions must only depend on `history.history(&event.symbol)`.
pub trait Strategy: Send {
    /// Human-readable name (e.g., "time_series_momentum").
    fn name(&self) -> &str;

    /// React to a new bar. Returns `Some(SignalEvent)` to trade.
    fn on_market(&mut self, event: &MarketEvent, history: &HistoryView<'_>) -> Option<SignalEvent>;
}

/// A strategy that never signals. Useful as a control in tests and sweeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverSignal;

impl Strategy for NeverSignal {
    fn name(&self) -> &str {
        "never_signal"
    }

    fn on_market(&mut self, _event: &MarketEvent, _history: &HistoryView<'_>) -> Option<SignalEvent> {
        None
    }
}
