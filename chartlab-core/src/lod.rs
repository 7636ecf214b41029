//! Level-of-detail decimation: per-pixel-column OHLC buckets.
//!
//! When a window holds far more samples than the plot has pixel columns, each
//! sample is folded into the bucket of the column it maps to:
//! open = value at the smallest x, close = value at the largest x,
//! high = max, low = min. Scalar lines fold a value `v` as the OHLC `(v, v, v, v)`.
//!
//! The bucket array is sized to the plot width once and reused. Only buckets
//! touched in the current frame are tracked, and only those are reset at the
//! start of the next frame, so sparse frames never pay an O(width) clear.

use crate::viewport::PixelRect;
use serde::{Deserialize, Serialize};

/// When to decimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodPolicy {
    pub enabled: bool,
    /// Never decimate at or below this many points.
    pub floor: usize,
    /// Decimate only when points exceed `density_factor * plot width`.
    pub density_factor: f64,
}

impl Default for LodPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            floor: 2000,
            density_factor: 2.0,
        }
    }
}

impl LodPolicy {
    pub fn should_decimate(&self, point_count: usize, plot_width: f64) -> bool {
        self.enabled
            && point_count > self.floor
            && (point_count as f64) > self.density_factor * plot_width
    }
}

/// Aggregate of the samples that landed in one pixel column.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LodBucket {
    pub column: usize,
    pub count: u32,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub first_x: f64,
    pub last_x: f64,
    pub high_x: f64,
    pub low_x: f64,
}

impl LodBucket {
    fn start(column: usize, x: f64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            column,
            count: 1,
            open,
            high,
            low,
            close,
            first_x: x,
            last_x: x,
            high_x: x,
            low_x: x,
        }
    }

    fn fold(&mut self, x: f64, open: f64, high: f64, low: f64, close: f64) {
        self.count += 1;
        if x < self.first_x {
            self.first_x = x;
            self.open = open;
        }
        if x >= self.last_x {
            self.last_x = x;
            self.close = close;
        }
        if high > self.high {
            self.high = high;
            self.high_x = x;
        }
        if low < self.low {
            self.low = low;
            self.low_x = x;
        }
    }

    /// Up to four polyline vertices tracing this bucket in x order:
    /// open, the extremes, close. Coincident vertices are merged.
    pub fn vertices(&self) -> ([(f64, f64); 4], usize) {
        let mut pts = [
            (self.first_x, self.open),
            (self.low_x, self.low),
            (self.high_x, self.high),
            (self.last_x, self.close),
        ];
        // open first, close last; extremes between them ordered by x
        if pts[2].0 < pts[1].0 {
            pts.swap(1, 2);
        }
        let mut out = [(0.0, 0.0); 4];
        let mut len = 0;
        for p in pts {
            if len > 0 && out[len - 1] == p {
                continue;
            }
            out[len] = p;
            len += 1;
        }
        (out, len)
    }
}

/// Reusable per-column bucket accumulator.
#[derive(Debug, Clone, Default)]
pub struct LodDecimator {
    buckets: Vec<LodBucket>,
    touched: Vec<usize>,
    columns: usize,
    origin: f64,
}

impl LodDecimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the buckets touched last frame and size the grid to `plot`.
    /// Returns the column count (0 for a plot narrower than one pixel).
    pub fn begin_frame(&mut self, plot: PixelRect) -> usize {
        for &c in &self.touched {
            self.buckets[c].count = 0;
        }
        self.touched.clear();

        self.columns = if plot.width.is_finite() && plot.width >= 1.0 {
            plot.width.floor() as usize
        } else {
            0
        };
        if self.buckets.len() < self.columns {
            self.buckets.resize(self.columns, LodBucket::default());
        }
        self.origin = plot.x;
        self.columns
    }

    /// Column for pixel x `px`, clamped into the grid.
    pub fn column_for(&self, px: f64) -> Option<usize> {
        if self.columns == 0 || !px.is_finite() {
            return None;
        }
        let offset = (px - self.origin).floor();
        Some(offset.clamp(0.0, (self.columns - 1) as f64) as usize)
    }

    /// Fold one OHLC sample at data x `x`, mapped to pixel x `px`.
    /// Samples with any non-finite field are skipped.
    pub fn fold_ohlc(&mut self, px: f64, x: f64, open: f64, high: f64, low: f64, close: f64) {
        if !(x.is_finite()
            && open.is_finite()
            && high.is_finite()
            && low.is_finite()
            && close.is_finite())
        {
            return;
        }
        let Some(column) = self.column_for(px) else {
            return;
        };
        let bucket = &mut self.buckets[column];
        if bucket.count == 0 {
            *bucket = LodBucket::start(column, x, open, high, low, close);
            self.touched.push(column);
        } else {
            bucket.fold(x, open, high, low, close);
        }
    }

    pub fn fold_value(&mut self, px: f64, x: f64, v: f64) {
        self.fold_ohlc(px, x, v, v, v, v);
    }

    /// Order the touched buckets by column. Call once after folding.
    pub fn finish(&mut self) {
        self.touched.sort_unstable();
    }

    /// Touched buckets in ascending column order (after `finish`).
    pub fn buckets(&self) -> impl Iterator<Item = &LodBucket> + '_ {
        self.touched.iter().map(move |&c| &self.buckets[c])
    }

    pub fn bucket_count(&self) -> usize {
        self.touched.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Allocated bucket slots (never shrinks).
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }
}
