//! Per-layer indicator cache.
//!
//! The cache owns one grow-only buffer per derived line plus a copy of the
//! source x coordinates. It recomputes everything, synchronously, whenever the
//! cache key differs from the key of the last computation, and otherwise hands
//! out the stored slices untouched. A consumer therefore never observes lines
//! from one input next to lines from another.

use super::buffer::ScratchBuffer;
use super::range::YRange;
use crate::domain::{SeriesId, SourceSeries};
use crate::indicators::{ComputeStatus, Indicator, Workspace, MAX_LINES};
use crate::viewport::XLayout;
use tracing::debug;

/// Everything a computed result depends on, compared by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheKey {
    pub source: SeriesId,
    pub version: u64,
    pub len: usize,
    pub indicator: Indicator,
}

impl CacheKey {
    pub fn of<S: SourceSeries + ?Sized>(source: &S, indicator: &Indicator) -> Self {
        Self {
            source: source.identity(),
            version: source.version(),
            len: source.len(),
            indicator: *indicator,
        }
    }
}

/// What the last computation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    /// Nothing computed yet.
    #[default]
    Empty,
    /// Lines are filled and finite over `0..len`.
    Ready { len: usize },
    /// The source was too short; nothing is drawable.
    InsufficientData { required: usize, available: usize },
    /// Some line never produced a finite value; nothing is drawable.
    NonFinite { len: usize },
}

/// Whether `ensure_fresh` reused the previous result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Hit,
    Recomputed,
}

#[derive(Debug, Default)]
pub struct IndicatorCache {
    key: Option<CacheKey>,
    state: CacheState,
    x: ScratchBuffer<f64>,
    lines: [ScratchBuffer<f64>; MAX_LINES],
    line_count: usize,
    workspace: Workspace,
    preferred: Option<YRange>,
    x_layout: XLayout,
    recomputations: u64,
}

impl IndicatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the cache up to date with `source` under `indicator`.
    pub fn ensure_fresh<S: SourceSeries + ?Sized>(
        &mut self,
        source: &S,
        indicator: &Indicator,
    ) -> Freshness {
        let key = CacheKey::of(source, indicator);
        if self.key == Some(key) {
            return Freshness::Hit;
        }
        self.recompute(source, indicator);
        self.key = Some(key);
        Freshness::Recomputed
    }

    /// Forget the last key so the next `ensure_fresh` recomputes. Buffers are kept.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    fn recompute<S: SourceSeries + ?Sized>(&mut self, source: &S, indicator: &Indicator) {
        let n = source.len();
        let line_count = indicator.line_count();

        let mut grew = self.x.ensure_len(n);
        for (li, buf) in self.lines.iter_mut().enumerate() {
            grew |= buf.ensure_len(if li < line_count { n } else { 0 });
        }

        for (i, slot) in self.x.as_mut_slice().iter_mut().enumerate() {
            *slot = source.x(i);
        }

        let [a, b, c, d] = &mut self.lines;
        let status = indicator.compute(
            source,
            [
                a.as_mut_slice(),
                b.as_mut_slice(),
                c.as_mut_slice(),
                d.as_mut_slice(),
            ],
            &mut self.workspace,
        );

        self.line_count = line_count;
        self.state = match status {
            ComputeStatus::Ready => CacheState::Ready { len: n },
            ComputeStatus::InsufficientData {
                required,
                available,
            } => CacheState::InsufficientData {
                required,
                available,
            },
            ComputeStatus::NonFinite => CacheState::NonFinite { len: n },
        };
        self.preferred = if status.is_ready() {
            indicator
                .range_policy()
                .resolve(self.lines[..line_count].iter().map(|buf| buf.as_slice()))
        } else {
            None
        };
        self.x_layout = XLayout::of(self.x.as_slice());
        self.recomputations += 1;

        debug!(
            indicator = indicator.name(),
            n,
            version = source.version(),
            state = ?self.state,
            grew,
            "indicator recomputed"
        );
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, CacheState::Ready { .. })
    }

    pub fn key(&self) -> Option<&CacheKey> {
        self.key.as_ref()
    }

    /// Number of drawable points; 0 unless ready.
    pub fn len(&self) -> usize {
        match self.state {
            CacheState::Ready { len } => len,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source x coordinates of the drawable points.
    pub fn x(&self) -> &[f64] {
        &self.x.as_slice()[..self.len()]
    }

    /// Line `idx` if the cache is ready and the indicator has that line.
    pub fn line(&self, idx: usize) -> Option<&[f64]> {
        if !self.is_ready() || idx >= self.line_count {
            return None;
        }
        Some(self.lines[idx].as_slice())
    }

    /// All drawable lines, in output-slot order. Empty unless ready.
    pub fn lines(&self) -> impl Iterator<Item = &[f64]> + '_ {
        let count = if self.is_ready() { self.line_count } else { 0 };
        self.lines[..count].iter().map(|buf| buf.as_slice())
    }

    pub fn line_count(&self) -> usize {
        if self.is_ready() {
            self.line_count
        } else {
            0
        }
    }

    pub fn preferred_range(&self) -> Option<YRange> {
        self.preferred
    }

    /// How the cached x coordinates are laid out.
    pub fn x_layout(&self) -> XLayout {
        self.x_layout
    }

    /// True if the cached x coordinates are evenly spaced.
    pub fn uniform_x(&self) -> bool {
        self.x_layout == XLayout::Uniform
    }

    /// How many full computations this cache has run.
    pub fn recompute_count(&self) -> u64 {
        self.recomputations
    }

    /// Allocated capacity of the x buffer. Line slots grow on their own, and
    /// only while the indicator uses them (see [`Self::line_capacities`]).
    pub fn capacity(&self) -> usize {
        self.x.capacity()
    }

    /// Allocated capacity of each line slot, in output-slot order.
    pub fn line_capacities(&self) -> [usize; MAX_LINES] {
        std::array::from_fn(|i| self.lines[i].capacity())
    }

    /// Total number of buffer growths across x and line buffers.
    pub fn grow_count(&self) -> u32 {
        self.x.grow_count() + self.lines.iter().map(|b| b.grow_count()).sum::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sample, VecSeries};
    use crate::indicators::{AtrParams, RsiParams};

    fn series(n: usize) -> VecSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.5).sin()).collect();
        VecSeries::from_closes(&closes)
    }

    #[test]
    fn second_call_is_a_hit() {
        let src = series(50);
        let ind = Indicator::Rsi(RsiParams::default());
        let mut cache = IndicatorCache::new();
        assert_eq!(cache.ensure_fresh(&src, &ind), Freshness::Recomputed);
        assert_eq!(cache.ensure_fresh(&src, &ind), Freshness::Hit);
        assert_eq!(cache.recompute_count(), 1);
        assert!(cache.is_ready());
        assert_eq!(cache.len(), 50);
        assert_eq!(cache.line_count(), 1);
    }

    #[test]
    fn mutation_invalidates() {
        let mut src = series(50);
        let ind = Indicator::Rsi(RsiParams::default());
        let mut cache = IndicatorCache::new();
        cache.ensure_fresh(&src, &ind);
        src.push(Sample::flat(50.0, 101.0, 0.0));
        assert_eq!(cache.ensure_fresh(&src, &ind), Freshness::Recomputed);
        assert_eq!(cache.len(), 51);
    }

    #[test]
    fn parameter_change_invalidates() {
        let src = series(50);
        let mut cache = IndicatorCache::new();
        cache.ensure_fresh(&src, &Indicator::Atr(AtrParams { period: 14 }));
        assert_eq!(
            cache.ensure_fresh(&src, &Indicator::Atr(AtrParams { period: 10 })),
            Freshness::Recomputed
        );
        assert_eq!(cache.recompute_count(), 2);
    }

    #[test]
    fn insufficient_data_exposes_nothing() {
        let src = series(5);
        let mut cache = IndicatorCache::new();
        cache.ensure_fresh(&src, &Indicator::Rsi(RsiParams::default()));
        assert_eq!(
            cache.state(),
            CacheState::InsufficientData {
                required: 15,
                available: 5
            }
        );
        assert!(cache.line(0).is_none());
        assert_eq!(cache.lines().count(), 0);
        assert!(cache.x().is_empty());
        assert!(cache.preferred_range().is_none());
    }

    #[test]
    fn shrinking_keeps_capacity() {
        let mut src = series(500);
        let ind = Indicator::Atr(AtrParams::default());
        let mut cache = IndicatorCache::new();
        cache.ensure_fresh(&src, &ind);
        let cap = cache.capacity();
        let grows = cache.grow_count();

        src.truncate(100);
        cache.ensure_fresh(&src, &ind);
        assert_eq!(cache.capacity(), cap);

        let extra: Vec<Sample> = (100..400).map(|i| Sample::flat(i as f64, 100.0, 0.0)).collect();
        src.extend(extra);
        cache.ensure_fresh(&src, &ind);
        assert_eq!(cache.grow_count(), grows);
        assert_eq!(cache.len(), 400);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let src = series(30);
        let ind = Indicator::Obv;
        let mut cache = IndicatorCache::new();
        cache.ensure_fresh(&src, &ind);
        cache.invalidate();
        assert_eq!(cache.ensure_fresh(&src, &ind), Freshness::Recomputed);
    }

    #[test]
    fn detects_uniform_spacing() {
        let src = series(30);
        let mut cache = IndicatorCache::new();
        cache.ensure_fresh(&src, &Indicator::Obv);
        assert!(cache.uniform_x());

        let irregular = VecSeries::from_samples(
            [0.0, 1.0, 5.0, 6.0]
                .iter()
                .map(|&x| Sample::flat(x, 10.0, 1.0))
                .collect(),
        );
        cache.ensure_fresh(&irregular, &Indicator::Obv);
        assert!(!cache.uniform_x());
        assert_eq!(cache.x_layout(), XLayout::Sorted);

        let shuffled = VecSeries::from_samples(
            [0.0, 6.0, 1.0, 5.0]
                .iter()
                .map(|&x| Sample::flat(x, 10.0, 1.0))
                .collect(),
        );
        cache.ensure_fresh(&shuffled, &Indicator::Obv);
        assert_eq!(cache.x_layout(), XLayout::Unsorted);
    }

    #[test]
    fn only_used_line_slots_grow() {
        let src = series(300);
        let mut cache = IndicatorCache::new();
        cache.ensure_fresh(&src, &Indicator::Atr(AtrParams::default()));
        let caps = cache.line_capacities();
        assert!(caps[0] >= 300);
        assert!(cache.capacity() >= 300);
        assert_eq!(&caps[1..], &[0, 0, 0]);
    }
}
