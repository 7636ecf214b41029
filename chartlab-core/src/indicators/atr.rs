//! Average True Range (ATR).
//!
//! ATR[p] = mean(TR[1..=p]); ATR[t] = (ATR[t-1]*(p-1) + TR[t]) / p.
//! TR[0] has no previous close and is excluded from the seed.
//! Warm-up: p. Minimum points: p + 1.

use super::wilder::{average_step, true_range};
use super::ComputeStatus;
use crate::domain::SourceSeries;
use crate::numeric::stabilize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AtrParams {
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl AtrParams {
    pub fn warmup(&self) -> usize {
        self.period
    }

    pub fn min_points(&self) -> usize {
        self.period + 1
    }
}

pub fn compute<S: SourceSeries + ?Sized>(
    src: &S,
    params: &AtrParams,
    atr: &mut [f64],
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
    let atr = &mut atr[..n];

    let seed: f64 = (1..=p).map(|i| true_range(src, i)).sum();
    let mut avg = seed / p as f64;
    atr[..p].fill(f64::NAN);
    atr[p] = avg;

    for i in (p + 1)..n {
        let tr = true_range(src, i);
        if tr.is_finite() {
            avg = if avg.is_finite() {
                average_step(avg, tr, p)
            } else {
                tr
            };
            atr[i] = avg;
        } else {
            atr[i] = f64::NAN;
        }
    }

    if stabilize(atr, p) {
        ComputeStatus::Ready
    } else {
        ComputeStatus::NonFinite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc, DEFAULT_EPSILON};

    fn run(src: &crate::domain::VecSeries, period: usize) -> (ComputeStatus, Vec<f64>) {
        let mut out = vec![0.0; src.len()];
        let status = compute(src, &AtrParams { period }, &mut out);
        (status, out)
    }

    #[test]
    fn atr_constant_range_is_two() {
        // H=11, L=9, C=10 for every sample: TR = 2 everywhere.
        let src = make_ohlc(&[(10.0, 11.0, 9.0, 10.0); 30]);
        let (status, atr) = run(&src, 14);
        assert_eq!(status, ComputeStatus::Ready);
        for v in &atr {
            assert_approx(*v, 2.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn atr_constant_price_is_zero() {
        let src = make_ohlc(&[(50.0, 50.0, 50.0, 50.0); 20]);
        let (_, atr) = run(&src, 5);
        assert!(atr.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn atr_seed_excludes_first_sample() {
        let src = make_ohlc(&[
            (100.0, 120.0, 80.0, 100.0), // TR0 = 40, ignored
            (100.0, 102.0, 98.0, 100.0), // 4
            (100.0, 103.0, 97.0, 100.0), // 6
            (100.0, 101.0, 99.0, 100.0), // 2
        ]);
        let (_, atr) = run(&src, 2);
        assert_approx(atr[2], 5.0, DEFAULT_EPSILON);
        assert_approx(atr[0], 5.0, DEFAULT_EPSILON);
        // (5*1 + 2) / 2
        assert_approx(atr[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_holds_through_nan_sample() {
        let mut data = vec![(10.0, 11.0, 9.0, 10.0); 10];
        data[6] = (f64::NAN, f64::NAN, f64::NAN, f64::NAN);
        let src = make_ohlc(&data);
        let (status, atr) = run(&src, 3);
        assert_eq!(status, ComputeStatus::Ready);
        assert!(atr.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn atr_insufficient_data() {
        let src = make_ohlc(&[(10.0, 11.0, 9.0, 10.0); 14]);
        let (status, _) = run(&src, 14);
        assert_eq!(
            status,
            ComputeStatus::InsufficientData {
                required: 15,
                available: 14
            }
        );
    }
}
