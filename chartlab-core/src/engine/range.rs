//! Preferred y-axis ranges.

use crate::numeric::finite_extent;
use serde::{Deserialize, Serialize};

/// Fraction of the span added as headroom on the non-anchored side(s).
const PAD_FRACTION: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YRange {
    pub min: f64,
    pub max: f64,
}

impl YRange {
    /// Fixed range of bounded oscillators.
    pub const PERCENT: YRange = YRange {
        min: 0.0,
        max: 100.0,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangePolicy {
    /// Always this range, regardless of values.
    Fixed(YRange),
    /// Finite extent widened to include zero, with headroom away from zero.
    ZeroAnchored,
    /// Drawn on the price axis; the indicator expresses no preference.
    Overlay,
}

impl RangePolicy {
    /// Resolve the preferred range for the given lines.
    pub fn resolve<'a, I>(&self, lines: I) -> Option<YRange>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        match self {
            RangePolicy::Fixed(r) => Some(*r),
            RangePolicy::ZeroAnchored => finite_extent(lines).map(|(lo, hi)| zero_anchored(lo, hi)),
            RangePolicy::Overlay => None,
        }
    }
}

/// Widen `[lo, hi]` to include zero; a degenerate range becomes ±1 around it.
/// Padding is applied to every side that does not sit on zero.
pub fn zero_anchored(lo: f64, hi: f64) -> YRange {
    let mut lo = lo.min(0.0);
    let mut hi = hi.max(0.0);
    if lo == hi {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * PAD_FRACTION;
    if lo < 0.0 {
        lo -= pad;
    }
    if hi > 0.0 {
        hi += pad;
    }
    YRange::new(lo, hi)
}
