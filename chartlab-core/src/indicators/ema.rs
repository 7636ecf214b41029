//! Exponential Moving Average (EMA) kernel for the EMA-cascade family.
//!
//! Recursive: EMA[t] = EMA[t-1] + alpha * (x[t] - EMA[t-1]), alpha = 2 / (period + 1).
//! Seed: EMA at the `period`-th input = SMA of the first `period` inputs.

/// Smoothing factor for a `period`-sample EMA.
pub fn alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Write the seeded EMA of `value(i)` for `i` in `start..out.len()` into `out`.
///
/// Indices before the seed are set to NaN. A non-finite input leaves the EMA
/// unchanged and writes NaN at that index; the running value is not poisoned.
/// Returns the seed index, or `None` if fewer than `period` inputs are available.
pub fn seeded_ema<F>(value: F, start: usize, period: usize, out: &mut [f64]) -> Option<usize>
where
    F: Fn(usize) -> f64,
{
    let n = out.len();
    if period == 0 || start + period > n {
        return None;
    }
    let seed_idx = start + period - 1;
    out[..seed_idx].fill(f64::NAN);

    let mut sum = 0.0;
    let mut count = 0usize;
    for i in start..=seed_idx {
        let v = value(i);
        if v.is_finite() {
            sum += v;
            count += 1;
        }
    }
    let mut ema = if count > 0 {
        sum / count as f64
    } else {
        f64::NAN
    };
    out[seed_idx] = ema;

    let a = alpha(period);
    for (i, slot) in out.iter_mut().enumerate().skip(seed_idx + 1) {
        let v = value(i);
        if !v.is_finite() {
            *slot = f64::NAN;
            continue;
        }
        ema = if ema.is_finite() { ema + a * (v - ema) } else { v };
        *slot = ema;
    }
    Some(seed_idx)
}
