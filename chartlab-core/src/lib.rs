//! ChartLab Core: the analytics layer of a charting toolkit.
//!
//! This crate turns a source series into drawable indicator lines:
//! - Source series and samples (`domain`)
//! - Recurrence engine: ten indicators across the recurrence families (`indicators`)
//! - Grow-only caches keyed by (series identity, version, length, parameters) (`engine`)
//! - Visible-window resolution against a pixel viewport (`viewport`)
//! - Per-pixel-column LOD decimation (`lod`)
//! - The per-frame pipeline tying them together (`layer`)
//!
//! Everything runs synchronously on the caller's thread. Each layer owns its
//! buffers; nothing is shared between layers.

pub mod config;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod indicators;
pub mod layer;
pub mod lod;
pub mod numeric;
pub mod synth;
pub mod viewport;

pub use config::{ConfigError, LayerConfig, LayerSpec};
pub use domain::{Sample, SeriesId, SourceSeries, VecSeries};
pub use engine::{CacheState, Freshness, IndicatorCache, YRange};
pub use indicators::{ComputeStatus, Family, Indicator};
pub use layer::{decimate_ohlc, Frame, FrameLine, IndicatorLayer};
pub use lod::{LodBucket, LodDecimator, LodPolicy};
pub use viewport::{IndexRange, LinearViewport, PixelRect, Spacing, Viewport, XLayout};
