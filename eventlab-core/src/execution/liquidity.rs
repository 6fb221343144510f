//! Liquidity constraint — participation cap against trailing share volume.
//!
//! The unfilled remainder is dropped; there is no carry to the next bar.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticipationCap {
    /// Maximum fraction of trailing average share volume per fill.
    /// `>= 1.0` disables the cap.
    pub rate: f64,
}

impl ParticipationCap {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    pub fn is_binding(&self) -> bool {
        self.rate < 1.0
    }

    /// Largest fillable quantity: `max(1, floor(adv_shares * rate))`, or `None`
    /// when the cap is disabled.
    pub fn max_fill_qty(&self, adv_shares: f64) -> Option<u64> {
        if !self.is_binding() {
            return None;
        }
        let raw = (adv_shares * self.rate).floor();
        let capped = if raw.is_finite() && raw > 1.0 { raw as u64 } else { 1 };
        Some(capped)
    }

    /// Constrain a desired quantity. Returns the fillable quantity.
    pub fn constrain(&self, desired_qty: u64, adv_shares: f64) -> u64 {
        match self.max_fill_qty(adv_shares) {
            Some(cap) => desired_qty.min(cap),
            None => desired_qty,
        }
    }
}

impl Default for ParticipationCap {
    fn default() -> Self {
        Self::new(1.0)
    }
}
