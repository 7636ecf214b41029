//! Viewport collaborators and the visible-window resolver.
//!
//! The resolver turns a pixel viewport into the minimal contiguous index range
//! `[start, end)` whose samples can land inside it, widened by an overscan
//! margin. Two strategies:
//!
//! - uniform spacing: invert the linear index → pixel mapping directly, O(1);
//! - irregular spacing: binary-search the sample x coordinates against the
//!   viewport's data-space edges, O(log n).
//!
//! Degenerate inputs and out-of-order x fall back to the full range rather than
//! dropping samples.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in pixel space. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Finite with positive width and height.
    pub fn is_drawable(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// What the indicator engine needs from the chart's coordinate system.
pub trait Viewport {
    fn plot_bounds(&self) -> PixelRect;

    /// Optional clip rectangle narrower than the plot (e.g. a scrolled pane).
    fn clip_bounds(&self) -> Option<PixelRect> {
        None
    }

    /// Pure data → pixel mapping. Callers only pass finite coordinates.
    fn map_to_pixel(&self, x: f64, y: f64) -> (f64, f64);

    /// Visible data-space x interval `(left, right)`.
    fn visible_x(&self) -> (f64, f64);

    /// Visible data-space y interval `(bottom, top)`.
    fn visible_y(&self) -> (f64, f64);

    /// Pixel x of data coordinate `x`.
    fn map_x(&self, x: f64) -> f64 {
        self.map_to_pixel(x, 0.0).0
    }

    /// The rectangle samples must fall in to be visible: the clip if set, else the plot.
    fn view_bounds(&self) -> PixelRect {
        self.clip_bounds().unwrap_or_else(|| self.plot_bounds())
    }
}

/// Linear mapping of a data rectangle onto a plot rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearViewport {
    plot: PixelRect,
    clip: Option<PixelRect>,
    x_domain: (f64, f64),
    y_domain: (f64, f64),
}

impl LinearViewport {
    pub fn new(plot: PixelRect, x_domain: (f64, f64), y_domain: (f64, f64)) -> Self {
        Self {
            plot,
            clip: None,
            x_domain,
            y_domain,
        }
    }

    pub fn with_clip(mut self, clip: PixelRect) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn x_domain(&self) -> (f64, f64) {
        self.x_domain
    }

    /// Inverse x mapping: pixel → data.
    pub fn pixel_to_x(&self, px: f64) -> f64 {
        let (x0, x1) = self.x_domain;
        if self.plot.width == 0.0 {
            return x0;
        }
        x0 + (px - self.plot.x) / self.plot.width * (x1 - x0)
    }
}

impl Viewport for LinearViewport {
    fn plot_bounds(&self) -> PixelRect {
        self.plot
    }

    fn clip_bounds(&self) -> Option<PixelRect> {
        self.clip
    }

    fn map_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let (y0, y1) = self.y_domain;
        let span = y1 - y0;
        let py = if span == 0.0 {
            self.plot.y + self.plot.height / 2.0
        } else {
            self.plot.max_y() - (y - y0) / span * self.plot.height
        };
        (self.map_x(x), py)
    }

    fn map_x(&self, x: f64) -> f64 {
        let (x0, x1) = self.x_domain;
        let span = x1 - x0;
        if span == 0.0 {
            return self.plot.x + self.plot.width / 2.0;
        }
        self.plot.x + (x - x0) / span * self.plot.width
    }

    fn visible_x(&self) -> (f64, f64) {
        match self.clip {
            Some(clip) => (self.pixel_to_x(clip.x), self.pixel_to_x(clip.max_x())),
            None => self.x_domain,
        }
    }

    fn visible_y(&self) -> (f64, f64) {
        self.y_domain
    }
}

/// Half-open index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn full(n: usize) -> Self {
        Self { start: 0, end: n }
    }

    pub fn empty() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, i: usize) -> bool {
        i >= self.start && i < self.end
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// How the resolver should treat sample x spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    /// Samples are evenly spaced; invert the mapping directly.
    Uniform,
    /// No spacing guarantee; binary-search x coordinates.
    Irregular,
    /// Detect once per recomputation.
    #[default]
    Auto,
}

/// Relative tolerance for uniform-spacing detection.
const UNIFORM_TOLERANCE: f64 = 1e-9;

/// True if `xs` is finite, strictly increasing and evenly spaced within a
/// relative tolerance. Zero or one finite sample counts as uniform.
pub fn is_uniform(xs: &[f64]) -> bool {
    let n = xs.len();
    if n < 2 {
        return xs.iter().all(|x| x.is_finite());
    }
    let first = xs[0];
    let last = xs[n - 1];
    if !(first.is_finite() && last.is_finite()) || last <= first {
        return false;
    }
    let step = (last - first) / (n - 1) as f64;
    // Relative to the step, plus rounding slack for large absolute coordinates.
    let tol = step * UNIFORM_TOLERANCE + first.abs().max(last.abs()) * 4.0 * f64::EPSILON;
    xs.iter().enumerate().all(|(i, &x)| {
        let expected = first + step * i as f64;
        x.is_finite() && (x - expected).abs() <= tol
    })
}

/// Shape of a series' x coordinates, classified once per recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XLayout {
    /// Finite, strictly increasing and evenly spaced.
    Uniform,
    /// Finite and non-decreasing.
    Sorted,
    /// Anything else: out of order or holding a non-finite x.
    #[default]
    Unsorted,
}

impl XLayout {
    pub fn of(xs: &[f64]) -> Self {
        if is_uniform(xs) {
            XLayout::Uniform
        } else if xs.iter().all(|x| x.is_finite()) && xs.windows(2).all(|w| w[0] <= w[1]) {
            XLayout::Sorted
        } else {
            XLayout::Unsorted
        }
    }

    /// The layout the resolver may assume under a spacing override. A forced
    /// search on unsorted x still degrades to the full range.
    pub fn under(self, spacing: Spacing) -> Self {
        match (spacing, self) {
            (Spacing::Auto, layout) => layout,
            (Spacing::Uniform, _) => XLayout::Uniform,
            (Spacing::Irregular, XLayout::Unsorted) => XLayout::Unsorted,
            (Spacing::Irregular, _) => XLayout::Sorted,
        }
    }
}

/// Uniform-spacing resolver.
///
/// `series_px` is the pixel x of the first and last sample; sample `i` sits at
/// `series_px.0 + i * step` with `step = (series_px.1 - series_px.0) / (n - 1)`.
/// Every index whose pixel lies within `[view.x, view.max_x()]` is included.
pub fn visible_range(
    view: PixelRect,
    series_px: (f64, f64),
    point_count: usize,
    overscan: usize,
) -> IndexRange {
    let n = point_count;
    if n <= 1 {
        return IndexRange::full(n);
    }
    let step = (series_px.1 - series_px.0) / (n - 1) as f64;
    if !(step > 0.0) || !step.is_finite() {
        return IndexRange::full(n);
    }
    let lo = (view.x - series_px.0) / step;
    let hi = (view.max_x() - series_px.0) / step;
    if !(lo.is_finite() && hi.is_finite()) {
        return IndexRange::full(n);
    }

    let limit = n as f64;
    let pad = overscan as f64;
    let start = (lo.floor() - pad).clamp(0.0, limit) as usize;
    let end = (hi.ceil() + 1.0 + pad).clamp(0.0, limit) as usize;
    IndexRange::new(start, end)
}

/// Irregular-spacing resolver: binary search of `xs` (assumed non-decreasing)
/// for the samples within `[left, right]`, widened by `overscan`.
///
/// Non-finite or inverted edges yield the full range.
pub fn visible_range_by_x(xs: &[f64], left: f64, right: f64, overscan: usize) -> IndexRange {
    let n = xs.len();
    if !(left <= right) {
        return IndexRange::full(n);
    }
    let start = xs.partition_point(|&x| x < left);
    let end = xs.partition_point(|&x| x <= right);
    IndexRange::new(
        start.saturating_sub(overscan),
        end.saturating_add(overscan).min(n),
    )
}

/// Resolve the visible window of `xs` under `viewport`.
///
/// Unsorted x has no contiguous visible window, so every index is kept.
pub fn resolve_window<V: Viewport + ?Sized>(
    viewport: &V,
    xs: &[f64],
    layout: XLayout,
    overscan: usize,
) -> IndexRange {
    let n = xs.len();
    if n == 0 {
        return IndexRange::empty();
    }
    match layout {
        XLayout::Uniform if xs[0].is_finite() && xs[n - 1].is_finite() => {
            let series_px = (viewport.map_x(xs[0]), viewport.map_x(xs[n - 1]));
            visible_range(viewport.view_bounds(), series_px, n, overscan)
        }
        XLayout::Uniform | XLayout::Sorted => {
            let (left, right) = viewport.visible_x();
            visible_range_by_x(xs, left, right, overscan)
        }
        XLayout::Unsorted => IndexRange::full(n),
    }
}
