//! Moving Average Convergence/Divergence (MACD).
//!
//! MACD = EMA(close, fast) - EMA(close, slow), defined once both EMAs are seeded.
//! Signal = EMA(MACD, signal), seeded with the SMA of the first `signal` MACD values.
//! Histogram = MACD - Signal.
//!
//! With L = max(fast, slow): MACD warm-up is L-1, signal/histogram warm-up is
//! L+signal-2, minimum points L+signal-1.

use super::ema::seeded_ema;
use super::ComputeStatus;
use crate::domain::SourceSeries;
use crate::numeric::stabilize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl MacdParams {
    fn long(&self) -> usize {
        self.fast.max(self.slow)
    }

    pub fn macd_warmup(&self) -> usize {
        self.long().saturating_sub(1)
    }

    pub fn signal_warmup(&self) -> usize {
        (self.long() + self.signal).saturating_sub(2)
    }

    pub fn min_points(&self) -> usize {
        (self.long() + self.signal).saturating_sub(1)
    }
}

/// Fill `macd`, `signal` and `hist`.
///
/// The fast EMA is staged in `hist` and the slow EMA in `signal`; both are
/// consumed before those slots receive their final values.
pub fn compute<S: SourceSeries + ?Sized>(
    src: &S,
    params: &MacdParams,
    macd: &mut [f64],
    signal: &mut [f64],
    hist: &mut [f64],
) -> ComputeStatus {
    let n = src.len();
    if params.fast == 0 || params.slow == 0 || params.signal == 0 {
        return ComputeStatus::InsufficientData {
            required: 1,
            available: n,
        };
    }
    if let Some(status) = ComputeStatus::check_len(params.min_points(), n) {
        return status;
    }
    let macd = &mut macd[..n];
    let signal = &mut signal[..n];
    let hist = &mut hist[..n];

    let close = |i: usize| src.close(i);
    let (Some(_), Some(_)) = (
        seeded_ema(close, 0, params.fast, hist),
        seeded_ema(close, 0, params.slow, signal),
    ) else {
        return ComputeStatus::InsufficientData {
            required: params.min_points(),
            available: n,
        };
    };

    let start = params.macd_warmup();
    macd[..start].fill(f64::NAN);
    for i in start..n {
        macd[i] = hist[i] - signal[i];
    }

    let macd_ref: &[f64] = macd;
    if seeded_ema(|i| macd_ref[i], start, params.signal, signal).is_none() {
        return ComputeStatus::InsufficientData {
            required: params.min_points(),
            available: n,
        };
    }
    for i in 0..n {
        hist[i] = macd[i] - signal[i];
    }

    let sig_warmup = params.signal_warmup();
    let ok = stabilize(macd, start) & stabilize(signal, sig_warmup) & stabilize(hist, sig_warmup);
    if ok {
        ComputeStatus::Ready
    } else {
        ComputeStatus::NonFinite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_samples};

    fn run(closes: &[f64], params: MacdParams) -> (ComputeStatus, [Vec<f64>; 3]) {
        let src = make_samples(closes);
        let n = closes.len();
        let mut lines = [vec![0.0; n], vec![0.0; n], vec![0.0; n]];
        let [m, s, h] = &mut lines;
        let status = compute(&src, &params, m, s, h);
        (status, lines)
    }

    #[test]
    fn macd_constant_price_is_zero() {
        let (status, [m, s, h]) = run(&[25.0; 40], MacdParams::default());
        assert_eq!(status, ComputeStatus::Ready);
        for line in [&m, &s, &h] {
            assert!(line.iter().all(|&v| v.abs() < 1e-12));
        }
    }

    #[test]
    fn macd_matches_direct_ema_difference() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.2).sin() * 5.0).collect();
        let params = MacdParams {
            fast: 3,
            slow: 6,
            signal: 4,
        };
        let (_, [m, s, h]) = run(&closes, params);

        let mut fast = vec![0.0; 60];
        let mut slow = vec![0.0; 60];
        seeded_ema(|i| closes[i], 0, 3, &mut fast);
        seeded_ema(|i| closes[i], 0, 6, &mut slow);
        for i in 5..60 {
            assert_approx(m[i], fast[i] - slow[i], 1e-9);
        }
        // Signal seed: SMA of MACD[5..9] at index 8.
        let seed = (5..9).map(|i| fast[i] - slow[i]).sum::<f64>() / 4.0;
        assert_approx(s[8], seed, 1e-9);
        for i in 8..60 {
            assert_approx(h[i], m[i] - s[i], 1e-12);
        }
    }

    #[test]
    fn macd_uptrend_is_positive() {
        let closes: Vec<f64> = (0..80).map(|i| 50.0 + i as f64).collect();
        let (_, [m, _, _]) = run(&closes, MacdParams::default());
        assert!(m[25..].iter().all(|&v| v > 0.0));
    }

    #[test]
    fn macd_minimum_points() {
        let params = MacdParams::default();
        assert_eq!(params.min_points(), 34);
        assert_eq!(params.signal_warmup(), 33);
        let (status, _) = run(&[1.0; 33], params);
        assert!(!status.is_ready());
        let (status, _) = run(&[1.0; 34], params);
        assert!(status.is_ready());
    }

    #[test]
    fn macd_fast_slower_than_slow_still_works() {
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + i as f64 * 0.5).collect();
        let params = MacdParams {
            fast: 10,
            slow: 4,
            signal: 3,
        };
        let (status, [m, _, _]) = run(&closes, params);
        assert!(status.is_ready());
        assert!(m.iter().all(|v| v.is_finite()));
    }
}
