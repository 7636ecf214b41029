//! Sample: the fundamental price/volume unit of a source series.

use serde::{Deserialize, Serialize};

/// One OHLCV sample at position `x`.
///
/// `x` is a time or index coordinate. Series are expected to be non-decreasing in
/// `x`, but nothing here enforces it; every consumer must tolerate violations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Sample {
    pub fn new(x: f64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            x,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// A flat sample where open, high, low and close all equal `price`.
    pub fn flat(x: f64, price: f64, volume: f64) -> Self {
        Self::new(x, price, price, price, price, volume)
    }

    /// Returns true if any field is NaN (void sample).
    pub fn is_void(&self) -> bool {
        self.x.is_nan()
            || self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLC sanity check: high bounds open/close from above, low from below,
    /// volume is non-negative.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }
}
