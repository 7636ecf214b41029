//! JSON reports printed by `frame` and `lod`.

use chartlab_core::domain::SourceSeries;
use chartlab_core::engine::{CacheState, YRange};
use chartlab_core::fingerprint::digest_cache;
use chartlab_core::layer::IndicatorLayer;
use chartlab_core::lod::{LodBucket, LodDecimator};
use chartlab_core::viewport::{IndexRange, PixelRect, Viewport};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SourceReport {
    pub points: usize,
    pub first_x: Option<f64>,
    pub last_x: Option<f64>,
    pub version: u64,
}

impl SourceReport {
    pub fn of<S: SourceSeries + ?Sized>(source: &S) -> Self {
        let n = source.len();
        Self {
            points: n,
            first_x: (n > 0).then(|| source.x(0)),
            last_x: (n > 0).then(|| source.x(n - 1)),
            version: source.version(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineReport {
    pub name: &'static str,
    pub points: usize,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LayerReport {
    pub label: String,
    pub indicator: chartlab_core::Indicator,
    /// `ready`, `insufficient_data`, `non_finite`, or `nothing_visible`.
    pub status: &'static str,
    pub required: Option<usize>,
    pub range: Option<IndexRange>,
    pub decimated: bool,
    pub uniform_x: bool,
    pub lines: Vec<LineReport>,
    pub preferred_range: Option<YRange>,
    pub levels: Vec<f64>,
    pub digest: Option<String>,
}

/// Run one frame of `layer` and summarize it.
pub fn layer_report<S, V>(layer: &mut IndicatorLayer, source: &S, viewport: &V) -> LayerReport
where
    S: SourceSeries + ?Sized,
    V: Viewport + ?Sized,
{
    let indicator = *layer.indicator();
    let mut report = LayerReport {
        label: indicator.label(),
        indicator,
        status: "nothing_visible",
        required: None,
        range: None,
        decimated: false,
        uniform_x: false,
        lines: Vec::new(),
        preferred_range: None,
        levels: indicator.reference_levels().to_vec(),
        digest: None,
    };

    if let Some(frame) = layer.frame(source, viewport) {
        report.range = Some(frame.range);
        report.decimated = frame.decimated;
        report.preferred_range = frame.preferred_range;
        report.lines = frame
            .lines()
            .map(|line| {
                let (lo, hi) = line
                    .ys
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| {
                        (lo.min(y), hi.max(y))
                    });
                LineReport {
                    name: line.name,
                    points: line.xs.len(),
                    y_min: lo.is_finite().then_some(lo),
                    y_max: hi.is_finite().then_some(hi),
                }
            })
            .collect();
    }

    let cache = layer.cache();
    report.uniform_x = cache.uniform_x();
    report.digest = digest_cache(cache).map(|d| d.0);
    match cache.state() {
        CacheState::Ready { .. } if report.range.is_some() => report.status = "ready",
        CacheState::Ready { .. } | CacheState::Empty => {}
        CacheState::InsufficientData { required, .. } => {
            report.status = "insufficient_data";
            report.required = Some(required);
        }
        CacheState::NonFinite { .. } => report.status = "non_finite",
    }
    report
}

#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub source: SourceReport,
    pub plot: PixelRect,
    pub clip: Option<PixelRect>,
    pub layers: Vec<LayerReport>,
}

#[derive(Debug, Serialize)]
pub struct LodReport {
    pub source: SourceReport,
    pub plot: PixelRect,
    pub columns: usize,
    pub bucket_count: usize,
    pub decimated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buckets: Option<Vec<LodBucket>>,
}

impl LodReport {
    pub fn new<S: SourceSeries + ?Sized>(
        source: &S,
        plot: PixelRect,
        lod: &LodDecimator,
        decimated: bool,
        include_buckets: bool,
    ) -> Self {
        Self {
            source: SourceReport::of(source),
            plot,
            columns: lod.columns(),
            bucket_count: lod.bucket_count(),
            decimated,
            buckets: include_buckets.then(|| lod.buckets().copied().collect()),
        }
    }
}
