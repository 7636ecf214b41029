//! Average Directional Index (ADX) with +DI and -DI.
//!
//! Running Wilder sums of TR, +DM and -DM are seeded with the plain sum over
//! indices 1..=p, then advanced with S - S/p + x.
//!   +DI = 100 * S(+DM) / S(TR), -DI likewise (0 when S(TR) == 0)
//!   DX  = 100 * |+DI - -DI| / (+DI + -DI)   (0 when the sum is 0)
//!   ADX[2p-1] = mean(DX[p..2p]), then Wilder-averaged.
//!
//! Warm-up: p for the DI lines, 2p-1 for ADX. Minimum points: 2p.

use super::wilder::{average_step, directional_movement, sum_step, true_range};
use super::ComputeStatus;
use crate::domain::SourceSeries;
use crate::numeric::{ratio_or, stabilize};
use serde::{Deserialize, Serialize};

/// Below this ADX the market is usually read as trendless.
pub const WEAK_TREND: f64 = 25.0;
/// Above this ADX the trend is usually read as strong.
pub const STRONG_TREND: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AdxParams {
    pub period: usize,
}

impl Default for AdxParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl AdxParams {
    pub fn di_warmup(&self) -> usize {
        self.period
    }

    pub fn adx_warmup(&self) -> usize {
        (2 * self.period).saturating_sub(1)
    }

    pub fn min_points(&self) -> usize {
        2 * self.period
    }
}

/// Fill `adx`, `plus_di` and `minus_di`. The `adx` slice doubles as DX storage
/// until it is smoothed in place.
pub fn compute<S: SourceSeries + ?Sized>(
    src: &S,
    params: &AdxParams,
    adx: &mut [f64],
    plus_di: &mut [f64],
    minus_di: &mut [f64],
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
    let adx = &mut adx[..n];
    let plus_di = &mut plus_di[..n];
    let minus_di = &mut minus_di[..n];

    adx[..p].fill(f64::NAN);
    plus_di[..p].fill(f64::NAN);
    minus_di[..p].fill(f64::NAN);

    let mut s_tr = 0.0;
    let mut s_plus = 0.0;
    let mut s_minus = 0.0;
    for i in 1..=p {
        let (pdm, mdm) = directional_movement(src, i);
        s_tr += finite_or_zero(true_range(src, i));
        s_plus += pdm;
        s_minus += mdm;
    }

    for i in p..n {
        if i > p {
            let (pdm, mdm) = directional_movement(src, i);
            s_tr = sum_step(s_tr, finite_or_zero(true_range(src, i)), p);
            s_plus = sum_step(s_plus, pdm, p);
            s_minus = sum_step(s_minus, mdm, p);
        }
        let pdi = ratio_or(100.0 * s_plus, s_tr, 0.0);
        let mdi = ratio_or(100.0 * s_minus, s_tr, 0.0);
        plus_di[i] = pdi;
        minus_di[i] = mdi;
        adx[i] = ratio_or(100.0 * (pdi - mdi).abs(), pdi + mdi, 0.0);
    }

    let first = params.adx_warmup();
    let mut avg = adx[p..=first].iter().sum::<f64>() / p as f64;
    adx[p..first].fill(f64::NAN);
    adx[first] = avg;
    for v in adx.iter_mut().skip(first + 1) {
        avg = average_step(avg, *v, p);
        *v = avg;
    }

    let ok = stabilize(adx, first) & stabilize(plus_di, p) & stabilize(minus_di, p);
    if ok {
        ComputeStatus::Ready
    } else {
        ComputeStatus::NonFinite
    }
}

/// Void samples contribute no range; the sums keep decaying.
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
