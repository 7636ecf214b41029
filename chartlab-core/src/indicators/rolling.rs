//! Sliding-window extrema via monotonic index deques.
//!
//! Each deque holds (index, value) pairs whose values are monotonic from front
//! to back. Pushing a value evicts every dominated entry from the back; entries
//! whose index has left the window are expired from the front. The front is
//! always the window extremum, and each index enters and leaves at most once,
//! so a full pass is O(n) regardless of period.
//!
//! Non-finite values never enter a deque.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

#[derive(Debug, Clone)]
pub struct MonotonicDeque {
    kind: Extremum,
    window: usize,
    items: VecDeque<(usize, f64)>,
}

impl MonotonicDeque {
    pub fn new(kind: Extremum) -> Self {
        Self {
            kind,
            window: 1,
            items: VecDeque::new(),
        }
    }

    /// Empty the deque and set the window length. Capacity is retained.
    pub fn reset(&mut self, window: usize) {
        self.window = window.max(1);
        self.items.clear();
    }

    /// Add the value at index `i`. Indices must be pushed in increasing order.
    pub fn push(&mut self, i: usize, v: f64) {
        if v.is_finite() {
            while let Some(&(_, back)) = self.items.back() {
                let dominated = match self.kind {
                    Extremum::Max => back <= v,
                    Extremum::Min => back >= v,
                };
                if !dominated {
                    break;
                }
                self.items.pop_back();
            }
            self.items.push_back((i, v));
        }
        while let Some(&(j, _)) = self.items.front() {
            if j + self.window > i {
                break;
            }
            self.items.pop_front();
        }
    }

    /// Extremum of the window ending at the last pushed index, if any finite
    /// value is in it.
    pub fn current(&self) -> Option<f64> {
        self.items.front().map(|&(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }
}

/// Paired max/min deques over the same window.
#[derive(Debug, Clone)]
pub struct RollingExtrema {
    pub max: MonotonicDeque,
    pub min: MonotonicDeque,
}

impl Default for RollingExtrema {
    fn default() -> Self {
        Self {
            max: MonotonicDeque::new(Extremum::Max),
            min: MonotonicDeque::new(Extremum::Min),
        }
    }
}

impl RollingExtrema {
    pub fn reset(&mut self, window: usize) {
        self.max.reset(window);
        self.min.reset(window);
    }

    pub fn push(&mut self, i: usize, high: f64, low: f64) {
        self.max.push(i, high);
        self.min.push(i, low);
    }

    /// (highest, lowest) over the current window; NaN where the window holds no
    /// finite value.
    pub fn current(&self) -> (f64, f64) {
        (
            self.max.current().unwrap_or(f64::NAN),
            self.min.current().unwrap_or(f64::NAN),
        )
    }
}

/// Rolling extremum of `values` over `period` into `out`, reusing `deque`.
///
/// `out[i]` covers `values[i+1-period..=i]`, truncated at the start of the slice.
pub fn rolling_extremum(
    values: &[f64],
    period: usize,
    deque: &mut MonotonicDeque,
    out: &mut [f64],
) {
    deque.reset(period);
    for (i, &v) in values.iter().enumerate() {
        deque.push(i, v);
        out[i] = deque.current().unwrap_or(f64::NAN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute(values: &[f64], period: usize, kind: Extremum) -> Vec<f64> {
        (0..values.len())
            .map(|i| {
                let lo = (i + 1).saturating_sub(period);
                let w = values[lo..=i].iter().copied().filter(|v| v.is_finite());
                match kind {
                    Extremum::Max => w.fold(f64::NAN, f64::max),
                    Extremum::Min => w.fold(f64::NAN, f64::min),
                }
            })
            .collect()
    }

    fn same(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!(
                x == y || (x.is_nan() && y.is_nan()),
                "mismatch at {i}: {x} vs {y}"
            );
        }
    }

    #[test]
    fn rolling_max_matches_brute_force() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0];
        let mut deque = MonotonicDeque::new(Extremum::Max);
        let mut out = vec![0.0; values.len()];
        for period in [1, 2, 3, 5, 20] {
            rolling_extremum(&values, period, &mut deque, &mut out);
            same(&out, &brute(&values, period, Extremum::Max));
        }
    }

    #[test]
    fn rolling_min_matches_brute_force() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0];
        let mut deque = MonotonicDeque::new(Extremum::Min);
        let mut out = vec![0.0; values.len()];
        for period in [1, 2, 3, 5, 20] {
            rolling_extremum(&values, period, &mut deque, &mut out);
            same(&out, &brute(&values, period, Extremum::Min));
        }
    }

    #[test]
    fn ties_are_handled() {
        let values = [2.0, 2.0, 2.0, 1.0, 2.0];
        let mut deque = MonotonicDeque::new(Extremum::Max);
        let mut out = vec![0.0; values.len()];
        rolling_extremum(&values, 2, &mut deque, &mut out);
        assert_eq!(out, vec![2.0, 2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn nan_values_are_skipped() {
        let values = [1.0, f64::NAN, f64::NAN, 0.5];
        let mut deque = MonotonicDeque::new(Extremum::Max);
        let mut out = vec![0.0; values.len()];
        rolling_extremum(&values, 2, &mut deque, &mut out);
        assert_eq!(out[1], 1.0);
        assert!(out[2].is_nan());
        assert_eq!(out[3], 0.5);
    }

    #[test]
    fn deque_stays_bounded_by_window() {
        let mut deque = MonotonicDeque::new(Extremum::Min);
        deque.reset(4);
        for i in 0..1000 {
            deque.push(i, i as f64); // increasing: nothing dominated for Min
            assert!(deque.len() <= 4);
        }
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut deque = MonotonicDeque::new(Extremum::Min);
        deque.reset(64);
        for i in 0..64 {
            deque.push(i, i as f64);
        }
        let cap = deque.capacity();
        deque.reset(8);
        assert!(deque.is_empty());
        assert_eq!(deque.capacity(), cap);
    }
}
