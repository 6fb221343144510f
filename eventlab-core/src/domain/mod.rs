//! Domain types for EventLab

pub mod bar;
pub mod event;
pub mod ledger;
pub mod portfolio;

pub use bar::Bar;
pub use event::{Event, FillEvent, FillMeta, MarketEvent, OrderEvent, OrderType, Side, SignalEvent};
pub use ledger::LedgerRow;
pub use portfolio::PortfolioState;

/// Symbol type alias
pub type Symbol = String;

/// A dated scalar series (equity, returns, turnover).
pub type Series = Vec<(chrono::NaiveDate, f64)>;
