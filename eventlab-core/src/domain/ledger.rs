//! Ledger row — one append-only snapshot per timestep.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mark-to-market snapshot written once per timestep, before that timestep's
/// fills are settled. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub t: NaiveDate,
    pub cash: f64,
    pub equity: f64,
    pub positions: BTreeMap<String, i64>,
}
