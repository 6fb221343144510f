//! End-to-end backtester tests: dispatch order, cost monotonicity,
//! determinism, and the reference scenarios.

use chrono::NaiveDate;
use eventlab_core::domain::{Bar, Event};
use eventlab_core::strategy::{StrategyConfig, StrategyFactory, TimeSeriesMomentum};
use eventlab_core::{Backtester, EventObserver, ExecConfig, PortfolioConfig, SeriesMap};
use std::sync::{Arc, Mutex};

fn d(i: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(i)
}

fn constant(n: i64) -> SeriesMap {
    let mut data = SeriesMap::new();
    data.insert(
        "SPY".into(),
        (0..n).map(|i| Bar::flat(d(i), 100.0, 1_000_000.0)).collect(),
    );
    data
}

fn rising(symbol: &str, n: i64) -> (String, Vec<Bar>) {
    let bars = (0..n)
        .map(|i| {
            let px = 100.0 + i as f64;
            Bar::new(d(i), px, px + 0.5, px - 0.5, px, 1_000_000.0)
        })
        .collect();
    (symbol.to_string(), bars)
}

fn momentum_run(data: SeriesMap, exec: ExecConfig) -> eventlab_core::BacktestResult {
    Backtester::from_series(
        data,
        None,
        Box::new(TimeSeriesMomentum::new(5)),
        PortfolioConfig {
            initial_cash: 10_000.0,
            target_weight: 1.0,
            max_weight: 1.0,
            ..PortfolioConfig::default()
        },
        exec,
    )
    .unwrap()
    .run()
}

#[test]
fn scenario_costs_do_not_improve_sharpe_on_constant_price() {
    let r0 = momentum_run(constant(400), ExecConfig::with_costs(0.0, 0.0));
    let r1 = momentum_run(constant(400), ExecConfig::with_costs(20.0, 10.0));
    assert!(r1.metrics.sharpe <= r0.metrics.sharpe + 1e-6);
}

#[test]
fn costs_do_not_improve_buy_and_hold_outcome() {
    let data: SeriesMap = [rising("SPY", 60)].into_iter().collect();
    let free = momentum_run(data.clone(), ExecConfig::with_costs(0.0, 0.0));
    let mut previous = free.final_equity().unwrap();
    for (fee, spread) in [(5.0, 0.0), (5.0, 5.0), (20.0, 10.0), (50.0, 25.0)] {
        let costly = momentum_run(data.clone(), ExecConfig::with_costs(fee, spread));
        let equity = costly.final_equity().unwrap();
        assert!(equity <= previous + 1e-9, "fee={fee} spread={spread}: {equity} > {previous}");
        assert!(costly.metrics.cagr <= free.metrics.cagr + 1e-12);
        previous = equity;
    }
}

#[test]
fn identical_inputs_give_identical_results() {
    let data: SeriesMap = [rising("AAA", 80), rising("BBB", 50)].into_iter().collect();
    let exec = ExecConfig {
        fee_bps: 5.0,
        vol_k: 10.0,
        impact_k: 0.5,
        participation_rate: 0.5,
        ..ExecConfig::default()
    };
    let a = momentum_run(data.clone(), exec.clone());
    let b = momentum_run(data, exec);
    assert_eq!(a.equity, b.equity);
    assert_eq!(a.metrics, b.metrics);
    assert_eq!(a.diagnostics, b.diagnostics);
}

/// Shares a list of `(t, kind, symbol)` with the test body.
struct Recorder(Arc<Mutex<Vec<(NaiveDate, &'static str, String)>>>);

impl EventObserver for Recorder {
    fn observe(&mut self, event: &Event) {
        self.0
            .lock()
            .unwrap()
            .push((event.time(), event.kind(), event.symbol().to_string()));
    }
}

#[test]
fn queue_drains_breadth_first_within_a_timestep() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let data: SeriesMap = [rising("AAA", 12), rising("BBB", 12)].into_iter().collect();
    let factory = StrategyFactory::with_defaults();
    let strategy = factory
        .create(&StrategyConfig::new("tsmom_2", "TimeSeriesMomentum").with_param("lookback", 2.0))
        .unwrap();

    let portfolio = PortfolioConfig {
        target_weight: 0.4,
        ..PortfolioConfig::default()
    };
    Backtester::from_series(data, None, strategy, portfolio, ExecConfig::default())
        .unwrap()
        .with_observer(Box::new(Recorder(Arc::clone(&seen))))
        .run();

    let seen = seen.lock().unwrap();
    // Day 2 is the first day with enough history: both markets, both signals,
    // both orders, then both fills (dated day 3).
    let day2: Vec<(&str, &str)> = seen
        .iter()
        .skip_while(|(t, _, _)| *t < d(2))
        .take(8)
        .map(|(_, kind, sym)| (*kind, sym.as_str()))
        .collect();
    assert_eq!(
        day2,
        vec![
            ("MarketEvent", "AAA"),
            ("MarketEvent", "BBB"),
            ("SignalEvent", "AAA"),
            ("SignalEvent", "BBB"),
            ("OrderEvent", "AAA"),
            ("OrderEvent", "BBB"),
            ("FillEvent", "AAA"),
            ("FillEvent", "BBB"),
        ]
    );
}

/// Signals Buy on one fixed day only.
struct BuyOn(NaiveDate);

impl eventlab_core::Strategy for BuyOn {
    fn name(&self) -> &str {
        "buy_on"
    }

    fn on_market(
        &mut self,
        event: &eventlab_core::MarketEvent,
        _history: &eventlab_core::HistoryView<'_>,
    ) -> Option<eventlab_core::SignalEvent> {
        (event.t == self.0).then(|| eventlab_core::SignalEvent::new(event.t, event.symbol.clone(), eventlab_core::Side::Buy))
    }
}

#[test]
fn orders_near_the_end_expire_without_failing_the_run() {
    let data: SeriesMap = [rising("SPY", 30)].into_iter().collect();
    let exec = ExecConfig {
        delay_days: 3,
        ..ExecConfig::default()
    };
    let result = Backtester::from_series(data, None, Box::new(BuyOn(d(28))), PortfolioConfig::default(), exec)
        .unwrap()
        .run();
    assert_eq!(result.ledger.len(), 30);
    assert_eq!(result.diagnostics.orders, 1);
    assert_eq!(result.diagnostics.expired_orders, 1);
    assert_eq!(result.diagnostics.fills, 0);
    assert!(result.equity.iter().all(|&(_, v)| v == 100_000.0));
}

#[test]
fn result_series_are_aligned_to_the_ledger() {
    let data: SeriesMap = [rising("SPY", 40)].into_iter().collect();
    let result = momentum_run(data, ExecConfig::default());
    assert_eq!(result.equity.len(), result.ledger.len());
    assert_eq!(result.turnover.len(), result.ledger.len());
    assert_eq!(result.returns.len(), result.ledger.len() - 1);
    assert_eq!(result.returns[0].0, result.ledger[1].t);
    let turnover_sum: f64 = result.turnover.iter().map(|&(_, v)| v).sum();
    assert!((turnover_sum - result.metrics.turnover).abs() < 1e-9);
}
