//! Donchian Channel: highest high / lowest low over a lookback window.
//!
//! - Upper: max(high[t-period+1..=t])
//! - Lower: min(low[t-period+1..=t])
//! - Middle: (upper + lower) / 2
//!
//! Warm-up: period - 1. Minimum points: period.

use super::rolling::RollingExtrema;
use super::ComputeStatus;
use crate::domain::SourceSeries;
use crate::numeric::stabilize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DonchianParams {
    pub period: usize,
}

impl Default for DonchianParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl DonchianParams {
    pub fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    pub fn min_points(&self) -> usize {
        self.period
    }
}

pub fn compute<S: SourceSeries + ?Sized>(
    src: &S,
    params: &DonchianParams,
    extrema: &mut RollingExtrema,
    upper: &mut [f64],
    middle: &mut [f64],
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
    let upper = &mut upper[..n];
    let middle = &mut middle[..n];
    let lower = &mut lower[..n];

    extrema.reset(p);
    let warmup = params.warmup();
    for i in 0..n {
        extrema.push(i, src.high(i), src.low(i));
        if i < warmup {
            upper[i] = f64::NAN;
            middle[i] = f64::NAN;
            lower[i] = f64::NAN;
            continue;
        }
        let (hh, ll) = extrema.current();
        upper[i] = hh;
        lower[i] = ll;
        middle[i] = (hh + ll) / 2.0;
    }

    let ok = stabilize(upper, warmup) & stabilize(middle, warmup) & stabilize(lower, warmup);
    if ok {
        ComputeStatus::Ready
    } else {
        ComputeStatus::NonFinite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc, DEFAULT_EPSILON};

    fn run(src: &crate::domain::VecSeries, period: usize) -> (ComputeStatus, [Vec<f64>; 3]) {
        let n = src.len();
        let mut lines = [vec![0.0; n], vec![0.0; n], vec![0.0; n]];
        let mut extrema = RollingExtrema::default();
        let [u, m, l] = &mut lines;
        let status = compute(src, &DonchianParams { period }, &mut extrema, u, m, l);
        (status, lines)
    }

    #[test]
    fn donchian_basic() {
        let src = make_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 96.0, 101.0),
        ]);
        let (status, [upper, middle, lower]) = run(&src, 3);
        assert_eq!(status, ComputeStatus::Ready);
        assert_approx(upper[2], 108.0, DEFAULT_EPSILON);
        assert_approx(lower[2], 95.0, DEFAULT_EPSILON);
        assert_approx(upper[3], 108.0, DEFAULT_EPSILON);
        assert_approx(lower[3], 96.0, DEFAULT_EPSILON);
        assert_approx(middle[3], 102.0, DEFAULT_EPSILON);
        // Warm-up back-fill.
        assert_eq!(upper[0], upper[2]);
        assert_eq!(lower[1], lower[2]);
    }

    #[test]
    fn donchian_period_one_tracks_sample() {
        let src = make_ohlc(&[(1.0, 2.0, 0.5, 1.5), (1.5, 3.0, 1.0, 2.0)]);
        let (_, [upper, _, lower]) = run(&src, 1);
        assert_eq!(upper, vec![2.0, 3.0]);
        assert_eq!(lower, vec![0.5, 1.0]);
    }

    #[test]
    fn donchian_bands_bracket_middle() {
        let data: Vec<_> = (0..50)
            .map(|i| {
                let c = 20.0 + (i as f64 * 0.4).cos() * 3.0;
                (c, c + 0.7, c - 0.4, c)
            })
            .collect();
        let src = make_ohlc(&data);
        let (_, [upper, middle, lower]) = run(&src, 10);
        for i in 0..50 {
            assert!(lower[i] <= middle[i] && middle[i] <= upper[i]);
        }
    }
}
