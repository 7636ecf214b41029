//! Stochastic oscillator (%K, %D).
//!
//! %K[t] = 100 * (close[t] - LL) / (HH - LL), HH/LL = highest high / lowest low
//! over the last `k_period` samples, clamped to [0, 100].
//! %D = simple moving average of %K over `d_period`.
//!
//! A degenerate window (HH == LL, or a non-finite extremum) holds the previous
//! valid %K. If no window is ever valid, %K and %D are both 50.
//!
//! Warm-up: k-1 for %K, k+d-2 for %D. Minimum points: k+d-1.

use super::rolling::RollingExtrema;
use super::ComputeStatus;
use crate::domain::SourceSeries;
use crate::numeric::{clamp_finite, stabilize};
use serde::{Deserialize, Serialize};

pub const OVERSOLD: f64 = 20.0;
pub const OVERBOUGHT: f64 = 80.0;

const NEUTRAL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticParams {
    pub k_period: usize,
    pub d_period: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl StochasticParams {
    pub fn k_warmup(&self) -> usize {
        self.k_period.saturating_sub(1)
    }

    pub fn d_warmup(&self) -> usize {
        (self.k_period + self.d_period).saturating_sub(2)
    }

    pub fn min_points(&self) -> usize {
        (self.k_period + self.d_period).saturating_sub(1)
    }
}

/// Position of `close` in `[ll, hh]` as a percentage. The ends are exact.
fn percent_of_range(close: f64, hh: f64, ll: f64, range: f64) -> f64 {
    if close >= hh {
        100.0
    } else if close <= ll {
        0.0
    } else {
        clamp_finite((close - ll) / range * 100.0, 0.0, 100.0)
    }
}

pub fn compute<S: SourceSeries + ?Sized>(
    src: &S,
    params: &StochasticParams,
    extrema: &mut RollingExtrema,
    k: &mut [f64],
    d: &mut [f64],
) -> ComputeStatus {
    let n = src.len();
    let (kp, dp) = (params.k_period, params.d_period);
    if kp == 0 || dp == 0 {
        return ComputeStatus::InsufficientData {
            required: 1,
            available: n,
        };
    }
    if let Some(status) = ComputeStatus::check_len(params.min_points(), n) {
        return status;
    }
    let k = &mut k[..n];
    let d = &mut d[..n];

    extrema.reset(kp);
    let k_start = params.k_warmup();
    let mut last_valid = f64::NAN;
    for i in 0..n {
        extrema.push(i, src.high(i), src.low(i));
        if i < k_start {
            k[i] = f64::NAN;
            continue;
        }
        let (hh, ll) = extrema.current();
        let range = hh - ll;
        let close = src.close(i);
        if range > 0.0 && range.is_finite() && close.is_finite() {
            last_valid = percent_of_range(close, hh, ll, range);
        }
        k[i] = last_valid;
    }

    if !stabilize(k, k_start) {
        k.fill(NEUTRAL);
    }

    // %D: running sum over the last `d_period` values of %K.
    d[..k_start].fill(f64::NAN);
    let d_start = params.d_warmup();
    let mut sum = 0.0;
    for i in k_start..n {
        sum += k[i];
        if i >= k_start + dp {
            sum -= k[i - dp];
        }
        d[i] = if i >= d_start {
            clamp_finite(sum / dp as f64, 0.0, 100.0)
        } else {
            f64::NAN
        };
    }

    if stabilize(d, d_start) {
        ComputeStatus::Ready
    } else {
        ComputeStatus::NonFinite
    }
}
