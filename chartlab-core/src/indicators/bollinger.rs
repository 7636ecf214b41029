//! Bollinger Bands.
//!
//! Middle: SMA(close, period)
//! Upper:  Middle + factor * StdDev(close, period)
//! Lower:  Middle - factor * StdDev(close, period)
//!
//! StdDev is population (divides by period). The window mean and sum of squared
//! deviations are slid in O(1) per sample:
//!   mean' = mean + (x_in - x_out) / p
//!   m2'   = m2 + (x_in - x_out) * (x_in - mean' + x_out - mean)
//! and recomputed exactly every `RESYNC_INTERVAL` steps, or whenever a void
//! close makes them non-finite. Variance is clamped at zero.
//!
//! Warm-up: period - 1. Minimum points: period.

use super::ComputeStatus;
use crate::domain::SourceSeries;
use crate::numeric::stabilize;
use serde::{Deserialize, Serialize};

const RESYNC_INTERVAL: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub period: usize,
    pub std_dev_factor: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_factor: 2.0,
        }
    }
}

impl BollingerParams {
    pub fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    pub fn min_points(&self) -> usize {
        self.period
    }
}

/// Exact two-pass mean and sum of squared deviations over `close[end-p..end]`.
fn window_moments<S: SourceSeries + ?Sized>(src: &S, end: usize, p: usize) -> (f64, f64) {
    let start = end - p;
    let mean = (start..end).map(|i| src.close(i)).sum::<f64>() / p as f64;
    let m2 = (start..end)
        .map(|i| {
            let d = src.close(i) - mean;
            d * d
        })
        .sum::<f64>();
    (mean, m2)
}

pub fn compute<S: SourceSeries + ?Sized>(
    src: &S,
    params: &BollingerParams,
    middle: &mut [f64],
    upper: &mut [f64],
    lower: &mut [f64],
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
    let middle = &mut middle[..n];
    let upper = &mut upper[..n];
    let lower = &mut lower[..n];

    let warmup = params.warmup();
    middle[..warmup].fill(f64::NAN);
    upper[..warmup].fill(f64::NAN);
    lower[..warmup].fill(f64::NAN);

    let (mut mean, mut m2) = window_moments(src, p, p);
    let mut since_sync = 0usize;
    for i in warmup..n {
        if i > warmup {
            since_sync += 1;
            if since_sync >= RESYNC_INTERVAL || !(mean.is_finite() && m2.is_finite()) {
                (mean, m2) = window_moments(src, i + 1, p);
                since_sync = 0;
            } else {
                let x_in = src.close(i);
                let x_out = src.close(i - p);
                let next_mean = mean + (x_in - x_out) / p as f64;
                m2 += (x_in - x_out) * (x_in - next_mean + x_out - mean);
                mean = next_mean;
            }
        }
        let sd = (m2 / p as f64).max(0.0).sqrt();
        let width = params.std_dev_factor * sd;
        middle[i] = mean;
        upper[i] = mean + width;
        lower[i] = mean - width;
    }

    let ok = stabilize(middle, warmup) & stabilize(upper, warmup) & stabilize(lower, warmup);
    if ok {
        ComputeStatus::Ready
    } else {
        ComputeStatus::NonFinite
    }
}
