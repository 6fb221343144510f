//! Portfolio accountant — owns cash and positions.
//!
//! Three entry points map to the backtester's dispatch:
//! - `mark_to_market`: once per timestep, before any fills of that timestep
//! - `on_signal`: long-only target sizing under cash and weight constraints
//! - `on_fill`: settlement with reclamp-instead-of-reject semantics
//!
//! The cash floor (`cash >= 0` up to float error) and non-negative positions
//! hold after every call, whatever the fill sizes.

use chrono::NaiveDate;

use crate::data::BarStore;
use crate::domain::{FillEvent, LedgerRow, OrderEvent, PortfolioState, Side, SignalEvent};

use super::config::PortfolioConfig;

/// How a fill was applied to the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Settled,
    /// Buy cost exceeded cash; quantity reduced to the affordable amount.
    ReclampedBuy { requested: u64, settled: u64 },
    /// Sell exceeded the held position; quantity reduced to the holding.
    ReclampedSell { requested: u64, settled: u64 },
    /// Nothing settled: not even one share was affordable, or nothing was held to sell.
    Dropped,
}

#[derive(Debug, Clone)]
pub struct Portfolio {
    config: PortfolioConfig,
    state: PortfolioState,
    ledger: Vec<LedgerRow>,
}

impl Portfolio {
    pub fn new<S: AsRef<str>>(config: PortfolioConfig, symbols: &[S]) -> Self {
        let state = PortfolioState::new(config.initial_cash, symbols);
        Self {
            config,
            state,
            ledger: Vec::new(),
        }
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    pub fn ledger(&self) -> &[LedgerRow] {
        &self.ledger
    }

    pub fn into_ledger(self) -> Vec<LedgerRow> {
        self.ledger
    }

    /// Refresh last prices from every bar at `t`, then append one ledger row.
    pub fn mark_to_market(&mut self, t: NaiveDate, store: &BarStore) {
        for symbol in store.symbols() {
            if let Some(bar) = store.bar(symbol, t) {
                self.state.last_price.insert(symbol.to_string(), bar.close);
            }
        }
        self.ledger.push(LedgerRow {
            t,
            cash: self.state.cash,
            equity: self.state.equity(),
            positions: self.state.positions.clone(),
        });
    }

    /// Size a signal into an order.
    ///
    /// Buy targets `target_weight * equity`; Sell exits the whole long position.
    /// `allow_short` is not consulted.
    pub fn on_signal(&self, signal: &SignalEvent) -> Option<OrderEvent> {
        match signal.side {
            Side::Buy => self.order_to_target_long(signal.t, &signal.symbol),
            Side::Sell => {
                let held = self.state.position(&signal.symbol);
                if held <= 0 {
                    return None;
                }
                Some(OrderEvent::market(signal.t, signal.symbol.clone(), Side::Sell, held as u64))
            }
        }
    }

    fn order_to_target_long(&self, t: NaiveDate, symbol: &str) -> Option<OrderEvent> {
        let target_value = self.config.target_weight * self.state.equity();
        let target_qty = self.cash_constrained_target_qty(symbol, target_value);

        let delta = target_qty - self.state.position(symbol);
        let min_qty = self.config.min_qty.max(1);
        if delta.unsigned_abs() < min_qty {
            return None;
        }
        let side = if delta > 0 { Side::Buy } else { Side::Sell };
        Some(OrderEvent::market(t, symbol, side, delta.unsigned_abs()))
    }

    /// Whole shares affordable for `target_value`, capped by `max_weight * equity`
    /// and by what is spendable (cash plus the current position's value).
    fn cash_constrained_target_qty(&self, symbol: &str, target_value: f64) -> i64 {
        let px = match self.state.price(symbol) {
            Some(px) if px > 0.0 => px,
            _ => return 0,
        };
        let equity = self.state.equity();
        let spendable = (self.state.cash + self.state.position_value(symbol)).max(0.0);
        let capped = target_value
            .min(self.config.max_weight * equity)
            .min(spendable);
        let qty = (capped / px).floor();
        if qty.is_finite() && qty > 0.0 {
            qty as i64
        } else {
            0
        }
    }

    /// Apply a fill to cash and positions.
    pub fn on_fill(&mut self, fill: &FillEvent) -> SettlementOutcome {
        let outcome = match fill.side {
            Side::Buy => self.settle_buy(fill),
            Side::Sell => self.settle_sell(fill),
        };
        if outcome != SettlementOutcome::Dropped {
            self.state.last_price.insert(fill.symbol.clone(), fill.price);
        }
        outcome
    }

    fn settle_buy(&mut self, fill: &FillEvent) -> SettlementOutcome {
        let px = fill.price;
        let mut qty = fill.quantity;
        let mut cost = px * qty as f64 + fill.fee;
        let mut outcome = SettlementOutcome::Settled;

        if cost > self.state.cash {
            if px <= 0.0 {
                return SettlementOutcome::Dropped;
            }
            let affordable = ((self.state.cash - fill.fee) / px).floor().max(0.0);
            qty = qty.min(affordable as u64);
            if qty == 0 {
                return SettlementOutcome::Dropped;
            }
            cost = px * qty as f64 + fill.fee;
            outcome = SettlementOutcome::ReclampedBuy {
                requested: fill.quantity,
                settled: qty,
            };
        }

        self.state.cash -= cost;
        *self.state.positions.entry(fill.symbol.clone()).or_insert(0) += qty as i64;
        outcome
    }

    fn settle_sell(&mut self, fill: &FillEvent) -> SettlementOutcome {
        let held = self.state.position(&fill.symbol).max(0) as u64;
        let qty = fill.quantity.min(held);
        if qty == 0 {
            return SettlementOutcome::Dropped;
        }

        self.state.cash += fill.price * qty as f64 - fill.fee;
        *self.state.positions.entry(fill.symbol.clone()).or_insert(0) -= qty as i64;

        if qty < fill.quantity {
            SettlementOutcome::ReclampedSell {
                requested: fill.quantity,
                settled: qty,
            }
        } else {
            SettlementOutcome::Settled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SeriesMap;
    use crate::domain::{Bar, FillMeta};

    fn d(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap() + chrono::Duration::days(i)
    }

    fn fill(side: Side, qty: u64, price: f64, fee: f64) -> FillEvent {
        FillEvent {
            t: d(0),
            symbol: "SPY".into(),
            side,
            quantity: qty,
            price,
            fee,
            slippage: 0.0,
            meta: FillMeta {
                base_price: price,
                slip_bps: 0.0,
                impact_bps: 0.0,
                half_spread_bps: 0.0,
                desired_qty: qty,
                filled_qty: qty,
            },
        }
    }

    fn priced(cash: f64, price: f64) -> Portfolio {
        let mut p = Portfolio::new(PortfolioConfig::with_cash(cash), &["SPY"]);
        p.state.last_price.insert("SPY".into(), price);
        p
    }

    #[test]
    fn buy_signal_targets_full_equity() {
        let p = priced(1_000.0, 30.0);
        let order = p.on_signal(&SignalEvent::new(d(0), "SPY", Side::Buy)).unwrap();
        // floor(1000 / 30) = 33
        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.quantity, 33);
    }

    #[test]
    fn buy_signal_respects_max_weight() {
        let mut p = priced(1_000.0, 10.0);
        p.config.max_weight = 0.5;
        let order = p.on_signal(&SignalEvent::new(d(0), "SPY", Side::Buy)).unwrap();
        assert_eq!(order.quantity, 50);
    }

    #[test]
    fn buy_signal_when_on_target_is_silent() {
        let mut p = priced(5.0, 10.0);
        p.state.positions.insert("SPY".into(), 99);
        // equity 995, target 99 shares, already held
        assert!(p.on_signal(&SignalEvent::new(d(0), "SPY", Side::Buy)).is_none());
    }

    #[test]
    fn buy_signal_without_price_is_silent() {
        let p = Portfolio::new(PortfolioConfig::default(), &["SPY"]);
        assert!(p.on_signal(&SignalEvent::new(d(0), "SPY", Side::Buy)).is_none());
    }

    #[test]
    fn sell_signal_exits_entire_position() {
        let mut p = priced(0.0, 10.0);
        assert!(p.on_signal(&SignalEvent::new(d(0), "SPY", Side::Sell)).is_none());
        p.state.positions.insert("SPY".into(), 42);
        let order = p.on_signal(&SignalEvent::new(d(0), "SPY", Side::Sell)).unwrap();
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.quantity, 42);
    }

    #[test]
    fn buy_fill_debits_cash_with_fee() {
        let mut p = priced(1_000.0, 10.0);
        assert_eq!(p.on_fill(&fill(Side::Buy, 50, 10.0, 1.0)), SettlementOutcome::Settled);
        assert_eq!(p.state.cash, 499.0);
        assert_eq!(p.state.position("SPY"), 50);
    }

    #[test]
    fn oversized_buy_is_reclamped() {
        let mut p = priced(1_000.0, 10.0);
        let outcome = p.on_fill(&fill(Side::Buy, 500, 10.0, 5.0));
        // floor((1000 - 5) / 10) = 99
        assert_eq!(
            outcome,
            SettlementOutcome::ReclampedBuy {
                requested: 500,
                settled: 99
            }
        );
        assert_eq!(p.state.position("SPY"), 99);
        assert!((p.state.cash - 5.0).abs() < 1e-9);
    }

    #[test]
    fn unaffordable_buy_is_dropped_without_touching_price() {
        let mut p = priced(5.0, 10.0);
        assert_eq!(p.on_fill(&fill(Side::Buy, 1, 12.0, 0.0)), SettlementOutcome::Dropped);
        assert_eq!(p.state.cash, 5.0);
        assert_eq!(p.state.price("SPY"), Some(10.0));
    }

    #[test]
    fn oversell_is_reclamped_and_pays_full_fee() {
        let mut p = priced(0.0, 10.0);
        p.state.positions.insert("SPY".into(), 10);
        let outcome = p.on_fill(&fill(Side::Sell, 40, 10.0, 4.0));
        assert_eq!(
            outcome,
            SettlementOutcome::ReclampedSell {
                requested: 40,
                settled: 10
            }
        );
        assert_eq!(p.state.position("SPY"), 0);
        // 100 proceeds - the fill's full 4.0 fee
        assert!((p.state.cash - 96.0).abs() < 1e-9);
    }

    #[test]
    fn sell_with_nothing_held_is_dropped() {
        let mut p = priced(100.0, 10.0);
        assert_eq!(p.on_fill(&fill(Side::Sell, 5, 10.0, 0.0)), SettlementOutcome::Dropped);
        assert_eq!(p.state.cash, 100.0);
    }

    #[test]
    fn fill_updates_last_price() {
        let mut p = priced(1_000.0, 10.0);
        p.on_fill(&fill(Side::Buy, 1, 11.0, 0.0));
        assert_eq!(p.state.price("SPY"), Some(11.0));
    }

    #[test]
    fn mark_to_market_appends_one_row() {
        let mut data = SeriesMap::new();
        data.insert("SPY".into(), vec![Bar::flat(d(0), 100.0, 1.0), Bar::flat(d(1), 110.0, 1.0)]);
        data.insert("QQQ".into(), vec![Bar::flat(d(1), 50.0, 1.0)]);
        let store = BarStore::new(data).unwrap();

        let mut p = Portfolio::new(PortfolioConfig::with_cash(1_000.0), &["QQQ", "SPY"]);
        p.state.positions.insert("SPY".into(), 2);
        p.mark_to_market(d(0), &store);
        p.mark_to_market(d(1), &store);

        let ledger = p.ledger();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].equity, 1_200.0);
        assert_eq!(ledger[1].equity, 1_220.0);
        assert_eq!(ledger[1].positions["QQQ"], 0);
        assert_eq!(p.state.price("QQQ"), Some(50.0));
    }
}
