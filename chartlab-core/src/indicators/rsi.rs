//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Warm-up: period. Minimum points: period + 1.
//! Edge cases: both averages 0 → 50; avg_loss == 0 → 100; avg_gain == 0 → 0.

use super::wilder::average_step;
use super::ComputeStatus;
use crate::domain::SourceSeries;
use crate::numeric::stabilize;
use serde::{Deserialize, Serialize};

pub const OVERSOLD: f64 = 30.0;
pub const MIDPOINT: f64 = 50.0;
pub const OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiParams {
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl RsiParams {
    pub fn warmup(&self) -> usize {
        self.period
    }

    pub fn min_points(&self) -> usize {
        self.period + 1
    }
}

pub fn compute<S: SourceSeries + ?Sized>(
    src: &S,
    params: &RsiParams,
    rsi: &mut [f64],
) -> ComputeStatus {
    let n = src.len();
    let p = params.period;
    if p == 0 {
        return ComputeStatus::InsufficientData {
            required: 1,
            available: n,
        };
    }
    if let Some(status) = ComputeStatus::check_len(params.min_points(), n) {
        return status;
    }
    let rsi = &mut rsi[..n];
    rsi[..p].fill(f64::NAN);

    // Seed: average gain and average loss over the first `period` changes.
    // A change touching a void close counts as no movement.
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=p {
        let (gain, loss) = split_change(src.close(i) - src.close(i - 1));
        avg_gain += gain;
        avg_loss += loss;
    }
    avg_gain /= p as f64;
    avg_loss /= p as f64;
    rsi[p] = rsi_value(avg_gain, avg_loss);

    for i in (p + 1)..n {
        let change = src.close(i) - src.close(i - 1);
        if !change.is_finite() {
            rsi[i] = f64::NAN;
            continue;
        }
        let (gain, loss) = split_change(change);
        avg_gain = average_step(avg_gain, gain, p);
        avg_loss = average_step(avg_loss, loss, p);
        rsi[i] = rsi_value(avg_gain, avg_loss);
    }

    if stabilize(rsi, p) {
        ComputeStatus::Ready
    } else {
        ComputeStatus::NonFinite
    }
}

fn split_change(change: f64) -> (f64, f64) {
    if change > 0.0 {
        (change, 0.0)
    } else if change < 0.0 {
        (0.0, -change)
    } else {
        (0.0, 0.0)
    }
}

pub fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
