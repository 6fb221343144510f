//! Portfolio accountant — sizing signals into orders, settling fills, and
//! writing the mark-to-market ledger.

pub mod accountant;
pub mod config;

pub use accountant::{Portfolio, SettlementOutcome};
pub use config::PortfolioConfig;
