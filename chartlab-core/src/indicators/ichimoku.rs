//! Ichimoku Kinko Hyo: midpoints of rolling high/low windows.
//!
//! - Tenkan-sen:   (HH + LL) / 2 over `tenkan` samples
//! - Kijun-sen:    (HH + LL) / 2 over `kijun` samples
//! - Senkou span A: (tenkan + kijun) / 2, plotted `displacement` samples ahead
//! - Senkou span B: (HH + LL) / 2 over `senkou_b` samples, plotted
//!   `displacement` samples ahead
//!
//! Lines are index-aligned with the source, so the leading spans at index t
//! hold the value computed at t - displacement. The lagging close (chikou) is
//! not produced: it places future closes at past indices.
//!
//! All three windows come from monotonic deques, so a pass is O(n).

use super::rolling::RollingExtrema;
use super::ComputeStatus;
use crate::domain::SourceSeries;
use crate::numeric::stabilize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct IchimokuParams {
    pub tenkan: usize,
    pub kijun: usize,
    pub senkou_b: usize,
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan: 9,
            kijun: 26,
            senkou_b: 52,
            displacement: 26,
        }
    }
}

impl IchimokuParams {
    pub fn tenkan_warmup(&self) -> usize {
        self.tenkan.saturating_sub(1)
    }

    pub fn kijun_warmup(&self) -> usize {
        self.kijun.saturating_sub(1)
    }

    pub fn span_a_warmup(&self) -> usize {
        self.tenkan.max(self.kijun).saturating_sub(1) + self.displacement
    }

    pub fn span_b_warmup(&self) -> usize {
        self.senkou_b.saturating_sub(1) + self.displacement
    }

    pub fn min_points(&self) -> usize {
        self.span_a_warmup().max(self.span_b_warmup()) + 1
    }
}

fn midpoint((hh, ll): (f64, f64)) -> f64 {
    (hh + ll) / 2.0
}

/// Move every value `by` slots towards the end; the vacated head is NaN.
fn shift_forward(line: &mut [f64], by: usize) {
    let n = line.len();
    if by >= n {
        line.fill(f64::NAN);
        return;
    }
    line.copy_within(0..n - by, by);
    line[..by].fill(f64::NAN);
}

pub fn compute<S: SourceSeries + ?Sized>(
    src: &S,
    params: &IchimokuParams,
    extrema: &mut [RollingExtrema; 3],
    tenkan: &mut [f64],
    kijun: &mut [f64],
    span_a: &mut [f64],
    span_b: &mut [f64],
) -> ComputeStatus {
    let n = src.len();
    if params.tenkan == 0 || params.kijun == 0 || params.senkou_b == 0 {
        return ComputeStatus::InsufficientData {
            required: 1,
            available: n,
        };
    }
    if let Some(status) = ComputeStatus::check_len(params.min_points(), n) {
        return status;
    }
    let tenkan = &mut tenkan[..n];
    let kijun = &mut kijun[..n];
    let span_a = &mut span_a[..n];
    let span_b = &mut span_b[..n];

    let [fast, base, slow] = extrema;
    fast.reset(params.tenkan);
    base.reset(params.kijun);
    slow.reset(params.senkou_b);

    let a_start = params.span_a_warmup() - params.displacement;
    let b_start = params.span_b_warmup() - params.displacement;
    for i in 0..n {
        let (high, low) = (src.high(i), src.low(i));
        fast.push(i, high, low);
        base.push(i, high, low);
        slow.push(i, high, low);

        tenkan[i] = if i >= params.tenkan_warmup() {
            midpoint(fast.current())
        } else {
            f64::NAN
        };
        kijun[i] = if i >= params.kijun_warmup() {
            midpoint(base.current())
        } else {
            f64::NAN
        };
        // Undisplaced for now; shifted below.
        span_a[i] = if i >= a_start {
            (tenkan[i] + kijun[i]) / 2.0
        } else {
            f64::NAN
        };
        span_b[i] = if i >= b_start {
            midpoint(slow.current())
        } else {
            f64::NAN
        };
    }
    shift_forward(span_a, params.displacement);
    shift_forward(span_b, params.displacement);

    let ok = stabilize(tenkan, params.tenkan_warmup())
        & stabilize(kijun, params.kijun_warmup())
        & stabilize(span_a, params.span_a_warmup())
        & stabilize(span_b, params.span_b_warmup());
    if ok {
        ComputeStatus::Ready
    } else {
        ComputeStatus::NonFinite
    }
}
