//! Wilder-family primitives shared by ATR, ADX and RSI.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|); TR[0] = high-low.
//! Directional movement: up = high-prev_high, down = prev_low-low;
//! +DM = up if up > down and up > 0, -DM = down if down > up and down > 0.
//!
//! Two equivalent smoothing forms are used:
//! - sum form (ADX):     S[t] = S[t-1] - S[t-1]/p + x[t]
//! - average form (ATR, RSI): A[t] = (A[t-1]*(p-1) + x[t]) / p
//!
//! The sum form is the average form scaled by p, so ratios of two sums (the DI
//! lines) are identical under either.

use crate::domain::SourceSeries;

/// True range at index `i`. NaN inputs propagate.
pub fn true_range<S: SourceSeries + ?Sized>(src: &S, i: usize) -> f64 {
    let h = src.high(i);
    let l = src.low(i);
    if i == 0 {
        return h - l;
    }
    let pc = src.close(i - 1);
    if h.is_nan() || l.is_nan() || pc.is_nan() {
        return f64::NAN;
    }
    (h - l).max((h - pc).abs()).max((l - pc).abs())
}

/// (+DM, -DM) at index `i >= 1`. At most one of the two is non-zero.
/// Non-finite inputs yield (0, 0).
pub fn directional_movement<S: SourceSeries + ?Sized>(src: &S, i: usize) -> (f64, f64) {
    let up = src.high(i) - src.high(i - 1);
    let down = src.low(i - 1) - src.low(i);
    let plus = if up > down && up > 0.0 { up } else { 0.0 };
    let minus = if down > up && down > 0.0 { down } else { 0.0 };
    (plus, minus)
}

/// One step of Wilder's running-sum smoothing.
#[inline]
pub fn sum_step(prev: f64, raw: f64, period: usize) -> f64 {
    prev - prev / period as f64 + raw
}

/// One step of Wilder's running-average smoothing.
#[inline]
pub fn average_step(prev: f64, raw: f64, period: usize) -> f64 {
    (prev * (period as f64 - 1.0) + raw) / period as f64
}
