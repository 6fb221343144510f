//! Event log — an optional observer that records every dequeued event.
//!
//! Observation only: nothing here feeds back into the simulation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Event, Side};

/// Receives each event as the backtester dequeues it.
pub trait EventObserver: Send {
    fn observe(&mut self, event: &Event);
}

/// One flat, tabular row per dequeued event. Fields a variant does not carry are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_type: String,
    pub t: NaiveDate,
    pub symbol: String,
    pub side: Option<Side>,
    pub quantity: Option<u64>,
    /// Bar close for Market events, effective price for fills.
    pub price: Option<f64>,
    pub fee: Option<f64>,
    pub slippage: Option<f64>,
    pub strength: Option<f64>,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        let mut record = EventRecord {
            event_type: event.kind().to_string(),
            t: event.time(),
            symbol: event.symbol().to_string(),
            side: None,
            quantity: None,
            price: None,
            fee: None,
            slippage: None,
            strength: None,
        };
        match event {
            Event::Market(e) => {
                record.price = Some(e.bar.close);
            }
            Event::Signal(e) => {
                record.side = Some(e.side);
                record.strength = Some(e.strength);
            }
            Event::Order(e) => {
                record.side = Some(e.side);
                record.quantity = Some(e.quantity);
            }
            Event::Fill(e) => {
                record.side = Some(e.side);
                record.quantity = Some(e.quantity);
                record.price = Some(e.price);
                record.fee = Some(e.fee);
                record.slippage = Some(e.slippage);
            }
        }
        record
    }
}

/// In-memory event buffer. Disabled by default.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    enabled: bool,
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            records: Vec::new(),
        }
    }

    pub fn enabled() -> Self {
        Self::new(true)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
    }
}

impl EventObserver for EventLog {
    fn observe(&mut self, event: &Event) {
        if self.enabled {
            self.records.push(EventRecord::from(event));
        }
    }
}
