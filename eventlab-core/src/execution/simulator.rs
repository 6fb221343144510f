use crate::data::BarStore;
use crate::domain::{FillEvent, FillMeta, OrderEvent};

use super::config::ExecConfig;
use super::cost_model::CostModel;
use super::liquidity::ParticipationCap;
use super::stats;

/// What happened to one order.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Filled(FillEvent),
    /// No decision bar on or after the order time, or the delayed execution
    /// bar lies beyond the symbol's data.
    Expired,
    /// The participation cap left nothing to fill.
    NoLiquidity,
}

impl ExecutionOutcome {
    pub fn into_fill(self) -> Option<FillEvent> {
        match self {
            ExecutionOutcome::Filled(fill) => Some(fill),
            ExecutionOutcome::Expired | ExecutionOutcome::NoLiquidity => None,
        }
    }
}

/// Market-order execution simulator. Stateless apart from its configuration.
#[derive(Debug, Clone)]
pub struct ExecutionSimulator {
    config: ExecConfig,
    cost: CostModel,
    cap: ParticipationCap,
}

impl ExecutionSimulator {
    pub fn new(config: ExecConfig) -> Self {
        let cost = CostModel::from_config(&config);
        let cap = ParticipationCap::new(config.participation_rate);
        Self { config, cost, cap }
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    /// Execute and discard the reason when nothing fills.
    pub fn execute(&self, order: &OrderEvent, store: &BarStore) -> Option<FillEvent> {
        self.simulate(order, store).into_fill()
    }

    /// Resolve the execution bar, cap the quantity, and run the cost ladder.
    pub fn simulate(&self, order: &OrderEvent, store: &BarStore) -> ExecutionOutcome {
        let symbol = order.symbol.as_str();

        // Decision bar: the order's own timestamp, or the next one the symbol traded.
        let Some(decision_idx) = store.index_on_or_after(symbol, order.t) else {
            return ExecutionOutcome::Expired;
        };
        let Some(exec_bar) = decision_idx
            .checked_add(self.config.delay_days)
            .and_then(|i| store.bar_at(symbol, i))
        else {
            return ExecutionOutcome::Expired;
        };

        let t_exec = exec_bar.date;
        let base_price = exec_bar.open;
        let history = store.history_as_of(symbol, t_exec);

        let adv_shares = stats::adv_shares(history, self.config.adv_lookback);
        let quantity = self.cap.constrain(order.quantity, adv_shares);
        if quantity == 0 {
            return ExecutionOutcome::NoLiquidity;
        }

        let vol_ann = stats::annualized_vol(history, self.config.vol_lookback);
        let slip_bps = self.cost.slip_bps(vol_ann);

        let adv_dollar = stats::adv_dollar(history, self.config.adv_lookback);
        let trade_value = base_price * quantity as f64;
        let impact_bps = self.cost.impact_bps(trade_value, adv_dollar);

        let price = self
            .cost
            .effective_price(order.side, base_price, slip_bps, impact_bps);
        let fee = self.cost.fee(price, quantity);
        let slippage = (price - base_price).abs() * quantity as f64;

        ExecutionOutcome::Filled(FillEvent {
            t: t_exec,
            symbol: order.symbol.clone(),
            side: order.side,
            quantity,
            price,
            fee,
            slippage,
            meta: FillMeta {
                base_price,
                slip_bps,
                impact_bps,
                half_spread_bps: self.config.half_spread_bps,
                desired_qty: order.quantity,
                filled_qty: quantity,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SeriesMap;
    use crate::domain::{Bar, Side};
    use chrono::NaiveDate;

    fn d(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 3).unwrap() + chrono::Duration::days(i)
    }

    /// Bars with open = 100 + i and close = open + 0.5.
    fn store(n: i64) -> BarStore {
        let bars = (0..n)
            .map(|i| {
                let open = 100.0 + i as f64;
                Bar::new(d(i), open, open + 1.0, open - 1.0, open + 0.5, 1_000.0)
            })
            .collect();
        let mut data = SeriesMap::new();
        data.insert("AAA".into(), bars);
        BarStore::new(data).unwrap()
    }

    #[test]
    fn fills_at_next_bar_open_with_default_delay() {
        let sim = ExecutionSimulator::new(ExecConfig::default());
        let fill = sim
            .execute(&OrderEvent::market(d(2), "AAA", Side::Buy, 10), &store(5))
            .unwrap();
        assert_eq!(fill.t, d(3));
        assert_eq!(fill.price, 103.0);
        assert_eq!(fill.meta.base_price, 103.0);
        assert_eq!(fill.fee, 0.0);
        assert_eq!(fill.quantity, 10);
    }

    #[test]
    fn zero_delay_fills_on_decision_bar() {
        let cfg = ExecConfig {
            delay_days: 0,
            ..ExecConfig::default()
        };
        let fill = ExecutionSimulator::new(cfg)
            .execute(&OrderEvent::market(d(2), "AAA", Side::Buy, 1), &store(5))
            .unwrap();
        assert_eq!(fill.t, d(2));
        assert_eq!(fill.meta.base_price, 102.0);
    }

    #[test]
    fn delay_past_end_expires() {
        let sim = ExecutionSimulator::new(ExecConfig::default());
        let outcome = sim.simulate(&OrderEvent::market(d(4), "AAA", Side::Buy, 1), &store(5));
        assert_eq!(outcome, ExecutionOutcome::Expired);
    }

    #[test]
    fn overflowing_delay_expires() {
        let sim = ExecutionSimulator::new(ExecConfig {
            delay_days: usize::MAX,
            ..ExecConfig::default()
        });
        let outcome = sim.simulate(&OrderEvent::market(d(2), "AAA", Side::Buy, 1), &store(5));
        assert_eq!(outcome, ExecutionOutcome::Expired);
    }

    #[test]
    fn off_calendar_order_advances_to_next_bar() {
        let mut data = SeriesMap::new();
        data.insert(
            "AAA".into(),
            vec![Bar::flat(d(0), 10.0, 1.0), Bar::flat(d(5), 20.0, 1.0), Bar::flat(d(6), 30.0, 1.0)],
        );
        let store = BarStore::new(data).unwrap();
        let sim = ExecutionSimulator::new(ExecConfig::default());
        // decision bar d(5), execution bar d(6)
        let fill = sim
            .execute(&OrderEvent::market(d(2), "AAA", Side::Buy, 1), &store)
            .unwrap();
        assert_eq!(fill.t, d(6));
        assert_eq!(fill.price, 30.0);
    }

    #[test]
    fn unknown_symbol_expires() {
        let sim = ExecutionSimulator::new(ExecConfig::default());
        let outcome = sim.simulate(&OrderEvent::market(d(0), "ZZZ", Side::Buy, 1), &store(5));
        assert_eq!(outcome, ExecutionOutcome::Expired);
    }

    #[test]
    fn zero_quantity_has_no_liquidity() {
        let sim = ExecutionSimulator::new(ExecConfig::default());
        let outcome = sim.simulate(&OrderEvent::market(d(0), "AAA", Side::Buy, 0), &store(5));
        assert_eq!(outcome, ExecutionOutcome::NoLiquidity);
    }

    #[test]
    fn costs_are_adverse_for_both_sides() {
        let cfg = ExecConfig {
            fee_bps: 10.0,
            half_spread_bps: 5.0,
            ..ExecConfig::default()
        };
        let sim = ExecutionSimulator::new(cfg);
        let s = store(5);
        let buy = sim.execute(&OrderEvent::market(d(0), "AAA", Side::Buy, 10), &s).unwrap();
        let sell = sim.execute(&OrderEvent::market(d(0), "AAA", Side::Sell, 10), &s).unwrap();
        assert!(buy.price > buy.meta.base_price);
        assert!(sell.price < sell.meta.base_price);
        assert!((buy.fee - 10.0 / 1e4 * buy.price * 10.0).abs() < 1e-9);
        assert!((buy.slippage - (buy.price - 101.0) * 10.0).abs() < 1e-9);
    }

    #[test]
    fn participation_cap_records_desired_and_filled() {
        let cfg = ExecConfig {
            participation_rate: 0.05,
            adv_lookback: 3,
            ..ExecConfig::default()
        };
        let sim = ExecutionSimulator::new(cfg);
        let fill = sim
            .execute(&OrderEvent::market(d(2), "AAA", Side::Buy, 10_000), &store(10))
            .unwrap();
        // 5% of 1000 shares average volume
        assert_eq!(fill.quantity, 50);
        assert_eq!(fill.meta.desired_qty, 10_000);
        assert_eq!(fill.meta.filled_qty, 50);
    }
}
