//! Backtester — drives the timeline and dispatches events.
//!
//! One instance owns all mutable run state (store cursor, queue, portfolio,
//! accumulators) and is consumed by [`Backtester::run`]. Distinct instances
//! share nothing and can run on separate threads.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

use crate::data::{slice_period, BarStore, SeriesMap, ValidationError};
use crate::domain::{Event, FillEvent, MarketEvent, OrderEvent, Series};
use crate::execution::{ExecConfig, ExecutionOutcome, ExecutionSimulator};
use crate::metrics::Metrics;
use crate::portfolio::{Portfolio, PortfolioConfig, SettlementOutcome};
use crate::queue::EventQueue;
use crate::strategy::Strategy;

use super::event_log::{EventLog, EventObserver};
use super::result::{BacktestResult, RunDiagnostics};

pub struct Backtester {
    store: BarStore,
    strategy: Box<dyn Strategy>,
    portfolio: Portfolio,
    execution: ExecutionSimulator,
    queue: EventQueue,
    event_log: EventLog,
    observers: Vec<Box<dyn EventObserver>>,
    turnover_by_day: BTreeMap<NaiveDate, f64>,
    diagnostics: RunDiagnostics,
}

impl Backtester {
    pub fn new(
        store: BarStore,
        strategy: Box<dyn Strategy>,
        portfolio_config: PortfolioConfig,
        exec_config: ExecConfig,
    ) -> Self {
        let symbols: Vec<&str> = store.symbols().collect();
        let portfolio = Portfolio::new(portfolio_config, &symbols);
        Self {
            store,
            strategy,
            portfolio,
            execution: ExecutionSimulator::new(exec_config),
            queue: EventQueue::new(),
            event_log: EventLog::default(),
            observers: Vec::new(),
            turnover_by_day: BTreeMap::new(),
            diagnostics: RunDiagnostics::default(),
        }
    }

    /// Build from raw series, optionally sliced to an inclusive `(start, end)` period first.
    pub fn from_series(
        data: SeriesMap,
        period: Option<(NaiveDate, NaiveDate)>,
        strategy: Box<dyn Strategy>,
        portfolio_config: PortfolioConfig,
        exec_config: ExecConfig,
    ) -> Result<Self, ValidationError> {
        let data = match period {
            Some((start, end)) => slice_period(&data, start, end),
            None => data,
        };
        let store = BarStore::new(data)?;
        Ok(Self::new(store, strategy, portfolio_config, exec_config))
    }

    pub fn with_event_log(mut self, log: EventLog) -> Self {
        self.event_log = log;
        self
    }

    /// Attach an extra observer that sees every dequeued event.
    pub fn with_observer(mut self, observer: Box<dyn EventObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn store(&self) -> &BarStore {
        &self.store
    }

    /// Replay the whole timeline and reduce the ledger to a result.
    pub fn run(mut self) -> BacktestResult {
        self.store.reset();

        while self.store.has_next() {
            let t = self.store.next_time();

            for symbol in self.store.symbols() {
                if let Some(bar) = self.store.bar(symbol, t) {
                    self.queue.put(MarketEvent {
                        t,
                        symbol: symbol.to_string(),
                        bar: *bar,
                    });
                }
            }

            self.portfolio.mark_to_market(t, &self.store);

            while let Some(event) = self.queue.pop() {
                self.observe(&event);
                trace!(kind = event.kind(), t = %event.time(), symbol = event.symbol(), "dispatch");
                self.dispatch(event);
            }
        }

        self.finish()
    }

    fn observe(&mut self, event: &Event) {
        self.event_log.observe(event);
        for observer in &mut self.observers {
            observer.observe(event);
        }
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::Market(market) => {
                let view = self.store.view_as_of(market.t);
                if let Some(signal) = self.strategy.on_market(&market, &view) {
                    self.diagnostics.signals += 1;
                    self.queue.put(signal);
                }
            }
            Event::Signal(signal) => match self.portfolio.on_signal(&signal) {
                Some(order) => {
                    self.diagnostics.orders += 1;
                    self.queue.put(order);
                }
                None => trace!(symbol = %signal.symbol, side = signal.side.as_str(), "signal produced no order"),
            },
            Event::Order(order) => self.execute(order),
            Event::Fill(fill) => self.settle(fill),
        }
    }

    fn execute(&mut self, order: OrderEvent) {
        match self.execution.simulate(&order, &self.store) {
            ExecutionOutcome::Filled(fill) => {
                self.diagnostics.fills += 1;
                self.queue.put(fill);
            }
            ExecutionOutcome::Expired => {
                self.diagnostics.expired_orders += 1;
                debug!(symbol = %order.symbol, t = %order.t, qty = order.quantity, "order expired unfilled");
            }
            ExecutionOutcome::NoLiquidity => {
                self.diagnostics.unfilled_orders += 1;
                debug!(symbol = %order.symbol, t = %order.t, qty = order.quantity, "no liquidity for order");
            }
        }
    }

    fn settle(&mut self, fill: FillEvent) {
        *self.turnover_by_day.entry(fill.t).or_insert(0.0) += fill.base_notional();

        match self.portfolio.on_fill(&fill) {
            SettlementOutcome::Settled => {}
            SettlementOutcome::ReclampedBuy { requested, settled } => {
                self.diagnostics.reclamped_buys += 1;
                debug!(symbol = %fill.symbol, requested, settled, "buy reclamped to available cash");
            }
            SettlementOutcome::ReclampedSell { requested, settled } => {
                self.diagnostics.reclamped_sells += 1;
                debug!(symbol = %fill.symbol, requested, settled, "sell reclamped to held position");
            }
            SettlementOutcome::Dropped => {
                self.diagnostics.dropped_fills += 1;
                debug!(symbol = %fill.symbol, qty = fill.quantity, side = fill.side.as_str(), "fill dropped");
            }
        }
    }

    fn finish(self) -> BacktestResult {
        let strategy = self.strategy.name().to_string();
        let bars = self.store.timeline().len();
        let ledger = self.portfolio.into_ledger();

        let equity: Series = ledger.iter().map(|row| (row.t, row.equity)).collect();
        let returns: Series = equity
            .windows(2)
            .map(|w| (w[1].0, w[1].1 / w[0].1 - 1.0))
            .filter(|(_, r)| !r.is_nan())
            .collect();
        let turnover: Series = equity
            .iter()
            .map(|&(t, _)| (t, self.turnover_by_day.get(&t).copied().unwrap_or(0.0)))
            .collect();

        let turnover_values: Vec<f64> = turnover.iter().map(|&(_, v)| v).collect();
        let metrics = Metrics::compute(&equity, &turnover_values);

        info!(
            strategy = %strategy,
            bars,
            final_equity = equity.last().map_or(f64::NAN, |&(_, v)| v),
            sharpe = metrics.sharpe,
            fills = self.diagnostics.fills,
            "backtest complete"
        );

        BacktestResult {
            equity,
            ledger,
            returns,
            turnover,
            metrics,
            diagnostics: self.diagnostics,
            events: self.event_log.into_records(),
        }
    }
}

impl std::fmt::Debug for Backtester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backtester")
            .field("strategy", &self.strategy.name())
            .field("symbols", &self.store.symbols().collect::<Vec<_>>())
            .field("exec", self.execution.config())
            .finish()
    }
}
