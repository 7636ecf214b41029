//! Shared numeric helpers for the recurrence engine.
//!
//! Degenerate arithmetic (zero denominators, empty ranges, non-finite inputs)
//! is resolved here with fixed fallbacks so no NaN or infinity escapes into a
//! derived line after warm-up.

/// `num / den`, or `fallback` when the denominator is zero or the quotient is
/// not finite.
pub fn ratio_or(num: f64, den: f64, fallback: f64) -> f64 {
    if den == 0.0 {
        return fallback;
    }
    let q = num / den;
    if q.is_finite() {
        q
    } else {
        fallback
    }
}

/// Apply the warm-up stabilization policy to a derived line in place.
///
/// - Indices before the first finite value at or after `warmup` take that value.
/// - Any later non-finite value is replaced by the previous finite value.
///
/// Returns false if the line has no finite value at or after `warmup`; the line
/// is left untouched in that case and must not be drawn.
pub fn stabilize(line: &mut [f64], warmup: usize) -> bool {
    if warmup >= line.len() {
        return false;
    }
    let first = match line[warmup..].iter().position(|v| v.is_finite()) {
        Some(offset) => warmup + offset,
        None => return false,
    };

    let seed = line[first];
    for v in &mut line[..first] {
        *v = seed;
    }

    let mut last = seed;
    for v in &mut line[first + 1..] {
        if v.is_finite() {
            last = *v;
        } else {
            *v = last;
        }
    }
    true
}

/// Min and max over the finite values of several lines, or `None` if there are none.
pub fn finite_extent<'a, I>(lines: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for line in lines {
        for &v in line {
            if !v.is_finite() {
                continue;
            }
            if v < lo {
                lo = v;
            }
            if v > hi {
                hi = v;
            }
        }
    }
    if lo <= hi {
        Some((lo, hi))
    } else {
        None
    }
}

/// Clamp into `[lo, hi]`, leaving non-finite values alone.
pub fn clamp_finite(v: f64, lo: f64, hi: f64) -> f64 {
    if !v.is_finite() {
        v
    } else if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_falls_back_on_zero_denominator() {
        assert_eq!(ratio_or(5.0, 0.0, 0.0), 0.0);
        assert_eq!(ratio_or(6.0, 3.0, 0.0), 2.0);
        assert_eq!(ratio_or(f64::NAN, 3.0, -1.0), -1.0);
        assert_eq!(ratio_or(1e300, 1e-300, 7.0), 7.0);
    }

    #[test]
    fn stabilize_backfills_warmup() {
        let mut line = vec![f64::NAN, f64::NAN, 3.0, 4.0];
        assert!(stabilize(&mut line, 2));
        assert_eq!(line, vec![3.0, 3.0, 3.0, 4.0]);
    }

    #[test]
    fn stabilize_overwrites_garbage_before_warmup() {
        let mut line = vec![0.0, 0.0, 0.0, 7.0, 8.0];
        assert!(stabilize(&mut line, 3));
        assert_eq!(line, vec![7.0, 7.0, 7.0, 7.0, 8.0]);
    }

    #[test]
    fn stabilize_holds_last_finite_value() {
        let mut line = vec![1.0, f64::NAN, f64::INFINITY, 4.0, f64::NAN];
        assert!(stabilize(&mut line, 0));
        assert_eq!(line, vec![1.0, 1.0, 1.0, 4.0, 4.0]);
    }

    #[test]
    fn stabilize_rejects_all_nan() {
        let mut line = vec![f64::NAN; 4];
        assert!(!stabilize(&mut line, 1));
        assert!(line.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn stabilize_rejects_warmup_past_end() {
        let mut line = vec![1.0, 2.0];
        assert!(!stabilize(&mut line, 2));
    }

    #[test]
    fn finite_extent_skips_nan() {
        let a = [1.0, f64::NAN, -2.0];
        let b = [f64::INFINITY, 5.0];
        assert_eq!(finite_extent([&a[..], &b[..]]), Some((-2.0, 5.0)));
        let empty: [f64; 0] = [];
        assert_eq!(finite_extent([&empty[..]]), None);
    }

    #[test]
    fn clamp_finite_keeps_nan() {
        assert_eq!(clamp_finite(120.0, 0.0, 100.0), 100.0);
        assert_eq!(clamp_finite(-3.0, 0.0, 100.0), 0.0);
        assert!(clamp_finite(f64::NAN, 0.0, 100.0).is_nan());
    }
}
