//! Per-frame indicator layer.
//!
//! `IndicatorLayer::frame` runs one frame of the pipeline:
//!
//! 1. bring the cache up to date with the source (hit: nothing to do);
//! 2. resolve the visible window `[start, end)` from the viewport;
//! 3. if the window is dense relative to the plot width, fold it into per-column
//!    LOD buckets, otherwise copy the finite points of the window;
//! 4. hand out borrowed polylines plus the range hint and reference levels.
//!
//! All buffers are owned by the layer and reused, so a steady-state frame does
//! not allocate.

use crate::config::{ConfigError, LayerConfig};
use crate::domain::SourceSeries;
use crate::engine::{IndicatorCache, YRange};
use crate::indicators::{Indicator, MAX_LINES};
use crate::lod::LodDecimator;
use crate::viewport::{resolve_window, IndexRange, Viewport};

/// Reusable parallel x/y arrays for one drawn line.
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Polyline {
    pub fn clear(&mut self) {
        self.xs.clear();
        self.ys.clear();
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.xs.push(x);
        self.ys.push(y);
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// One line of a frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameLine<'a> {
    pub name: &'static str,
    pub xs: &'a [f64],
    pub ys: &'a [f64],
}

/// Everything the render emitter needs for one frame of one layer.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub range: IndexRange,
    pub decimated: bool,
    pub preferred_range: Option<YRange>,
    pub levels: &'static [f64],
    names: &'static [&'static str],
    polylines: &'a [Polyline],
}

impl<'a> Frame<'a> {
    pub fn lines(&self) -> impl Iterator<Item = FrameLine<'a>> + 'a {
        let (names, polylines) = (self.names, self.polylines);
        names
            .iter()
            .zip(polylines)
            .map(|(&name, p)| FrameLine {
                name,
                xs: p.xs(),
                ys: p.ys(),
            })
    }

    pub fn line(&self, idx: usize) -> Option<FrameLine<'a>> {
        let p = self.polylines.get(idx)?;
        Some(FrameLine {
            name: *self.names.get(idx)?,
            xs: p.xs(),
            ys: p.ys(),
        })
    }

    pub fn line_count(&self) -> usize {
        self.names.len()
    }

    /// Total vertices across all lines.
    pub fn point_count(&self) -> usize {
        self.polylines.iter().map(Polyline::len).sum()
    }
}

#[derive(Debug)]
pub struct IndicatorLayer {
    indicator: Indicator,
    config: LayerConfig,
    cache: IndicatorCache,
    lods: [LodDecimator; MAX_LINES],
    polylines: [Polyline; MAX_LINES],
}

impl IndicatorLayer {
    pub fn new(indicator: Indicator, config: LayerConfig) -> Result<Self, ConfigError> {
        indicator.validate()?;
        config.validate()?;
        Ok(Self {
            indicator,
            config,
            cache: IndicatorCache::new(),
            lods: Default::default(),
            polylines: Default::default(),
        })
    }

    pub fn indicator(&self) -> &Indicator {
        &self.indicator
    }

    /// Replace the indicator parameters. The next frame recomputes.
    pub fn set_indicator(&mut self, indicator: Indicator) -> Result<(), ConfigError> {
        indicator.validate()?;
        self.indicator = indicator;
        Ok(())
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LayerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn cache(&self) -> &IndicatorCache {
        &self.cache
    }

    /// Produce this frame's drawable lines, or `None` if nothing should be drawn.
    pub fn frame<S, V>(&mut self, source: &S, viewport: &V) -> Option<Frame<'_>>
    where
        S: SourceSeries + ?Sized,
        V: Viewport + ?Sized,
    {
        self.cache.ensure_fresh(source, &self.indicator);
        if !self.cache.is_ready() {
            return None;
        }
        let plot = viewport.plot_bounds();
        if !plot.is_drawable() {
            return None;
        }

        let xs = self.cache.x();
        let layout = self.cache.x_layout().under(self.config.spacing);
        let range = resolve_window(viewport, xs, layout, self.config.overscan);
        if range.len() < 2 {
            return None;
        }
        let decimated = self.config.lod.should_decimate(range.len(), plot.width);

        let line_count = self.cache.line_count();
        for li in 0..line_count {
            let Some(ys) = self.cache.line(li) else {
                continue;
            };
            let poly = &mut self.polylines[li];
            poly.clear();
            if decimated {
                let lod = &mut self.lods[li];
                lod.begin_frame(plot);
                for i in range.iter() {
                    let (x, y) = (xs[i], ys[i]);
                    if x.is_finite() && y.is_finite() {
                        lod.fold_value(viewport.map_x(x), x, y);
                    }
                }
                lod.finish();
                for bucket in lod.buckets() {
                    let (pts, len) = bucket.vertices();
                    for &(x, y) in &pts[..len] {
                        poly.push(x, y);
                    }
                }
            } else {
                for i in range.iter() {
                    let (x, y) = (xs[i], ys[i]);
                    if x.is_finite() && y.is_finite() {
                        poly.push(x, y);
                    }
                }
            }
        }

        Some(Frame {
            range,
            decimated,
            preferred_range: self.cache.preferred_range(),
            levels: self.indicator.reference_levels(),
            names: &self.indicator.line_names()[..line_count],
            polylines: &self.polylines[..line_count],
        })
    }
}

/// Fold the source candles of `range` into per-column OHLC buckets, for price
/// panes drawn alongside indicator layers. Returns the bucket count.
pub fn decimate_ohlc<S, V>(
    source: &S,
    range: IndexRange,
    viewport: &V,
    lod: &mut LodDecimator,
) -> usize
where
    S: SourceSeries + ?Sized,
    V: Viewport + ?Sized,
{
    lod.begin_frame(viewport.plot_bounds());
    let end = range.end.min(source.len());
    for i in range.start.min(end)..end {
        let x = source.x(i);
        if !x.is_finite() {
            continue;
        }
        lod.fold_ohlc(
            viewport.map_x(x),
            x,
            source.open(i),
            source.high(i),
            source.low(i),
            source.close(i),
        );
    }
    lod.finish();
    lod.bucket_count()
}
