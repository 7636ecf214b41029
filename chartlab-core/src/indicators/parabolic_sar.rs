//! Parabolic SAR: Wilder's stop-and-reverse system.
//!
//! Sequential and stateful: tracks direction, extreme point (EP) and
//! acceleration factor (AF). Each step moves the stop towards the EP by AF,
//! keeps it outside the previous two bars, and flips direction when price
//! crosses it. On a flip the stop jumps to the old EP and AF restarts.
//!
//! The run is seeded at the first pair of bars with finite high and low;
//! direction comes from their closes. Bars with a void high, low or close
//! leave the state unchanged and hold the previous stop.
//!
//! Warm-up: 1. Minimum points: 2.

use super::ComputeStatus;
use crate::domain::SourceSeries;
use crate::numeric::stabilize;
use serde::{Deserialize, Serialize};

pub const MIN_POINTS: usize = 2;
pub const WARMUP: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParabolicSarParams {
    pub af_start: f64,
    pub af_step: f64,
    pub af_max: f64,
}

impl Default for ParabolicSarParams {
    fn default() -> Self {
        Self {
            af_start: 0.02,
            af_step: 0.02,
            af_max: 0.20,
        }
    }
}

fn bar_is_usable<S: SourceSeries + ?Sized>(src: &S, i: usize) -> bool {
    src.high(i).is_finite() && src.low(i).is_finite() && src.close(i).is_finite()
}

pub fn compute<S: SourceSeries + ?Sized>(
    src: &S,
    params: &ParabolicSarParams,
    sar_out: &mut [f64],
) -> ComputeStatus {
    let n = src.len();
    if let Some(status) = ComputeStatus::check_len(MIN_POINTS, n) {
        return status;
    }
    let out = &mut sar_out[..n];
    out.fill(f64::NAN);

    let Some(seed) = (1..n).find(|&i| bar_is_usable(src, i - 1) && bar_is_usable(src, i)) else {
        return ComputeStatus::NonFinite;
    };

    let mut is_long = src.close(seed) >= src.close(seed - 1);
    let mut af = params.af_start;
    let (mut sar, mut ep) = if is_long {
        (src.low(seed - 1), src.high(seed))
    } else {
        (src.high(seed - 1), src.low(seed))
    };
    out[seed] = sar;

    for i in seed + 1..n {
        if !bar_is_usable(src, i) {
            continue;
        }
        let (high, low) = (src.high(i), src.low(i));
        let mut next = sar + af * (ep - sar);

        if is_long {
            // Never above the previous two lows.
            for j in [i - 1, i - 2] {
                let prior = src.low(j);
                if prior.is_finite() {
                    next = next.min(prior);
                }
            }
            if low < next {
                is_long = false;
                next = ep;
                ep = low;
                af = params.af_start;
            } else if high > ep {
                ep = high;
                af = (af + params.af_step).min(params.af_max);
            }
        } else {
            // Never below the previous two highs.
            for j in [i - 1, i - 2] {
                let prior = src.high(j);
                if prior.is_finite() {
                    next = next.max(prior);
                }
            }
            if high > next {
                is_long = true;
                next = ep;
                ep = high;
                af = params.af_start;
            } else if low < ep {
                ep = low;
                af = (af + params.af_step).min(params.af_max);
            }
        }

        sar = next;
        out[i] = sar;
    }

    if stabilize(out, WARMUP) {
        ComputeStatus::Ready
    } else {
        ComputeStatus::NonFinite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sample, VecSeries};
    use crate::indicators::{assert_approx, make_ohlc, DEFAULT_EPSILON};

    fn run(src: &VecSeries, params: ParabolicSarParams) -> (ComputeStatus, Vec<f64>) {
        let mut out = vec![0.0; src.len()];
        let status = compute(src, &params, &mut out);
        (status, out)
    }

    fn trend(n: usize, step: f64) -> VecSeries {
        let data: Vec<_> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * step;
                (base, base + 2.0, base - 1.0, base + step.signum() * 1.5)
            })
            .collect();
        make_ohlc(&data)
    }

    #[test]
    fn psar_uptrend_stays_below_lows() {
        let src = trend(12, 3.0);
        let (status, sar) = run(&src, ParabolicSarParams::default());
        assert_eq!(status, ComputeStatus::Ready);
        for i in 1..12 {
            assert!(sar[i] <= src.samples()[i].low, "index {i}: {} above low", sar[i]);
        }
    }

    #[test]
    fn psar_downtrend_ends_above_highs() {
        let src = trend(12, -3.0);
        let (_, sar) = run(&src, ParabolicSarParams::default());
        for i in 2..12 {
            assert!(sar[i] >= src.samples()[i].high, "index {i}");
        }
    }

    #[test]
    fn psar_first_steps() {
        let src = make_ohlc(&[
            (100.0, 105.0, 98.0, 103.0),
            (103.0, 108.0, 101.0, 107.0),
            (107.0, 112.0, 105.0, 111.0),
        ]);
        let (_, sar) = run(&src, ParabolicSarParams::default());
        // Long from the first pair: stop at low[0], EP high[1].
        assert_approx(sar[1], 98.0, DEFAULT_EPSILON);
        assert_approx(sar[0], 98.0, DEFAULT_EPSILON);
        // 98 + 0.02 * (108 - 98) is clamped to low[0].
        assert_approx(sar[2], 98.0, DEFAULT_EPSILON);
        // New EP 112 raises AF to 0.04: 98 + 0.04 * (112 - 98).
        let src = make_ohlc(&[
            (100.0, 105.0, 98.0, 103.0),
            (103.0, 108.0, 101.0, 107.0),
            (107.0, 112.0, 105.0, 111.0),
            (111.0, 115.0, 109.0, 114.0),
        ]);
        let (_, sar) = run(&src, ParabolicSarParams::default());
        assert_approx(sar[3], 98.56, DEFAULT_EPSILON);
    }

    #[test]
    fn psar_flips_on_reversal() {
        let src = make_ohlc(&[
            (100.0, 105.0, 98.0, 103.0),
            (103.0, 108.0, 101.0, 107.0),
            (107.0, 112.0, 105.0, 111.0),
            (111.0, 115.0, 109.0, 114.0),
            (114.0, 114.5, 100.0, 101.0),
            (101.0, 102.0, 95.0, 96.0),
            (96.0, 97.0, 90.0, 91.0),
        ]);
        let (_, sar) = run(&src, ParabolicSarParams::default());
        assert!(sar[4] < src.samples()[4].low);
        // Bar 5 breaks the stop and takes the old extreme point.
        assert_eq!(sar[5], 115.0);
        assert!(sar[6] > src.samples()[6].high);
    }

    #[test]
    fn psar_af_is_capped() {
        let slow = ParabolicSarParams {
            af_max: 0.04,
            ..ParabolicSarParams::default()
        };
        let src = trend(40, 1.0);
        let (_, capped) = run(&src, slow);
        let (_, free) = run(&src, ParabolicSarParams::default());
        // A lower cap trails further behind in a steady trend.
        assert!(capped[39] < free[39]);
    }

    #[test]
    fn psar_skips_void_bars() {
        let mut samples: Vec<Sample> = trend(10, 2.0).samples().to_vec();
        samples[0].high = f64::NAN;
        samples[5].low = f64::NAN;
        let src = VecSeries::from_samples(samples);
        let (status, sar) = run(&src, ParabolicSarParams::default());
        assert_eq!(status, ComputeStatus::Ready);
        assert!(sar.iter().all(|v| v.is_finite()));
        assert_eq!(sar[5], sar[4]);
        // Seeded at the first usable pair (1, 2); earlier indices repeat it.
        assert_eq!(sar[0], sar[2]);
        assert_eq!(sar[1], sar[2]);
    }

    #[test]
    fn psar_without_usable_pair_is_not_drawable() {
        let mut samples: Vec<Sample> = trend(4, 1.0).samples().to_vec();
        for s in samples.iter_mut().step_by(2) {
            s.low = f64::NAN;
        }
        let src = VecSeries::from_samples(samples);
        let (status, _) = run(&src, ParabolicSarParams::default());
        assert_eq!(status, ComputeStatus::NonFinite);
    }

    #[test]
    fn psar_needs_two_points() {
        let src = trend(1, 1.0);
        let (status, _) = run(&src, ParabolicSarParams::default());
        assert_eq!(
            status,
            ComputeStatus::InsufficientData {
                required: 2,
                available: 1
            }
        );
    }
}
