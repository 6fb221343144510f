//! The four event variants that flow through one simulated timestep.
//!
//! Events are ephemeral: created and consumed within a single queue drain.
//! Dispatch is a single exhaustive `match` over [`Event`], so adding a variant
//! is a compile-time-checked change at every dispatch point.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// Trade direction for signals, orders and fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    /// For signals in long-only mode: exit to flat.
    Sell,
}

impl Side {
    /// +1 for buys, -1 for sells. Used to push prices in the adverse direction.
    pub fn sign(self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// Order type. Only market orders are simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderType {
    #[default]
    #[serde(rename = "MKT")]
    Market,
}

/// A new bar is available for `symbol` at `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub t: NaiveDate,
    pub symbol: String,
    pub bar: Bar,
}

/// A strategy's directional decision at `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub t: NaiveDate,
    pub symbol: String,
    pub side: Side,
    pub strength: f64,
}

impl SignalEvent {
    pub fn new(t: NaiveDate, symbol: impl Into<String>, side: Side) -> Self {
        Self {
            t,
            symbol: symbol.into(),
            side,
            strength: 1.0,
        }
    }
}

/// A sized order handed to the execution simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub t: NaiveDate,
    pub symbol: String,
    pub side: Side,
    pub quantity: u64,
    pub order_type: OrderType,
}

impl OrderEvent {
    pub fn market(t: NaiveDate, symbol: impl Into<String>, side: Side, quantity: u64) -> Self {
        Self {
            t,
            symbol: symbol.into(),
            side,
            quantity,
            order_type: OrderType::Market,
        }
    }
}

/// Audit trail of the cost ladder applied to a fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillMeta {
    /// Execution bar open, before any cost adjustment.
    pub base_price: f64,
    pub slip_bps: f64,
    pub impact_bps: f64,
    pub half_spread_bps: f64,
    pub desired_qty: u64,
    pub filled_qty: u64,
}

/// A (possibly partial) execution with realized price and costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    /// Execution bar timestamp (at or after the order's timestamp).
    pub t: NaiveDate,
    pub symbol: String,
    pub side: Side,
    pub quantity: u64,
    /// Effective price after spread, slippage and impact.
    pub price: f64,
    pub fee: f64,
    /// `|price - base_price| * quantity`. Informational only.
    pub slippage: f64,
    pub meta: FillMeta,
}

impl FillEvent {
    /// Traded notional at the pre-cost base price. This is the turnover convention.
    pub fn base_notional(&self) -> f64 {
        (self.meta.base_price * self.quantity as f64).abs()
    }
}

/// Closed set of simulation events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Market(MarketEvent),
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    /// Variant name, used to tag event log rows.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Market(_) => "MarketEvent",
            Event::Signal(_) => "SignalEvent",
            Event::Order(_) => "OrderEvent",
            Event::Fill(_) => "FillEvent",
        }
    }

    pub fn time(&self) -> NaiveDate {
        match self {
            Event::Market(e) => e.t,
            Event::Signal(e) => e.t,
            Event::Order(e) => e.t,
            Event::Fill(e) => e.t,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Event::Market(e) => &e.symbol,
            Event::Signal(e) => &e.symbol,
            Event::Order(e) => &e.symbol,
            Event::Fill(e) => &e.symbol,
        }
    }
}

impl From<MarketEvent> for Event {
    fn from(e: MarketEvent) -> Self {
        Event::Market(e)
    }
}

impl From<SignalEvent> for Event {
    fn from(e: SignalEvent) -> Self {
        Event::Signal(e)
    }
}

impl From<OrderEvent> for Event {
    fn from(e: OrderEvent) -> Self {
        Event::Order(e)
    }
}

impl From<FillEvent> for Event {
    fn from(e: FillEvent) -> Self {
        Event::Fill(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn kind_names_every_variant() {
        let bar = Bar::flat(day(), 100.0, 1_000.0);
        let market: Event = MarketEvent {
            t: day(),
            symbol: "SPY".into(),
            bar,
        }
        .into();
        let signal: Event = SignalEvent::new(day(), "SPY", Side::Buy).into();
        let order: Event = OrderEvent::market(day(), "SPY", Side::Sell, 5).into();

        assert_eq!(market.kind(), "MarketEvent");
        assert_eq!(signal.kind(), "SignalEvent");
        assert_eq!(order.kind(), "OrderEvent");
        assert_eq!(order.symbol(), "SPY");
        assert_eq!(order.time(), day());
    }

    #[test]
    fn side_sign_is_adverse_direction() {
        assert_eq!(Side::Buy.sign(), 1.0);
        assert_eq!(Side::Sell.sign(), -1.0);
    }

    #[test]
    fn base_notional_ignores_cost_ladder() {
        let fill = FillEvent {
            t: day(),
            symbol: "SPY".into(),
            side: Side::Buy,
            quantity: 10,
            price: 101.0,
            fee: 0.5,
            slippage: 10.0,
            meta: FillMeta {
                base_price: 100.0,
                slip_bps: 0.0,
                impact_bps: 0.0,
                half_spread_bps: 100.0,
                desired_qty: 10,
                filled_qty: 10,
            },
        };
        assert_eq!(fill.base_notional(), 1_000.0);
    }

    #[test]
    fn order_type_serializes_as_mkt() {
        let json = serde_json::to_string(&OrderType::Market).unwrap();
        assert_eq!(json, "\"MKT\"");
    }
}
