//! Dispatch queue — single-threaded FIFO drained once per timestep.
//!
//! Derived events are appended to the tail, so processing is breadth-first:
//! every Market event of a timestep is handled before any Signal it produced.

use std::collections::VecDeque;

use crate::domain::Event;

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, event: impl Into<Event>) {
        self.events.push_back(event.into());
    }

    /// Dequeue the oldest event, or `None` when drained.
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
