//! Source series: the randomly-indexable view indicators are computed from.
//!
//! A series exposes per-index OHLCV fields plus an identity and a monotonic
//! version. Together with the point count these form the source half of an
//! indicator cache key; both are compared by value, never by address.

use super::sample::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SERIES_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a source series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesId(pub u64);

impl SeriesId {
    /// Allocate a process-unique identity.
    pub fn next() -> Self {
        Self(NEXT_SERIES_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "series#{}", self.0)
    }
}

/// Read access to an ordered sequence of samples.
///
/// Implementations must keep `version()` monotonic: any change to the samples
/// must produce a version the cache has not seen for this identity.
/// Out-of-range indices are a caller bug; indicator code only reads `0..len()`.
pub trait SourceSeries {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn x(&self, i: usize) -> f64;
    fn open(&self, i: usize) -> f64;
    fn high(&self, i: usize) -> f64;
    fn low(&self, i: usize) -> f64;
    fn close(&self, i: usize) -> f64;
    fn volume(&self, i: usize) -> f64;

    fn identity(&self) -> SeriesId;
    fn version(&self) -> u64;
}

/// Owned, growable series. Every mutation bumps the version.
///
/// Cloning allocates a new identity: two copies may diverge under identical
/// version sequences, so they must never share a cache key.
#[derive(Debug)]
pub struct VecSeries {
    id: SeriesId,
    version: u64,
    samples: Vec<Sample>,
}

impl VecSeries {
    pub fn new() -> Self {
        Self::from_samples(Vec::new())
    }

    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self {
            id: SeriesId::next(),
            version: 0,
            samples,
        }
    }

    /// Build a series where `x` is the sample index and only closes vary.
    ///
    /// open = previous close, high/low = max/min(open, close), volume = 0.
    pub fn from_closes(closes: &[f64]) -> Self {
        let samples = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open = if i == 0 { close } else { closes[i - 1] };
                Sample::new(i as f64, open, open.max(close), open.min(close), close, 0.0)
            })
            .collect();
        Self::from_samples(samples)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, i: usize) -> Option<&Sample> {
        self.samples.get(i)
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
        self.touch();
    }

    pub fn extend<I: IntoIterator<Item = Sample>>(&mut self, samples: I) {
        self.samples.extend(samples);
        self.touch();
    }

    /// Replace the sample at `i`. Returns false if `i` is out of range.
    pub fn set(&mut self, i: usize, sample: Sample) -> bool {
        match self.samples.get_mut(i) {
            Some(slot) => {
                *slot = sample;
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn truncate(&mut self, len: usize) {
        self.samples.truncate(len);
        self.touch();
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}

impl Clone for VecSeries {
    fn clone(&self) -> Self {
        Self {
            id: SeriesId::next(),
            version: self.version,
            samples: self.samples.clone(),
        }
    }
}

impl Default for VecSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Sample>> for VecSeries {
    fn from(samples: Vec<Sample>) -> Self {
        Self::from_samples(samples)
    }
}

impl SourceSeries for VecSeries {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn x(&self, i: usize) -> f64 {
        self.samples[i].x
    }

    fn open(&self, i: usize) -> f64 {
        self.samples[i].open
    }

    fn high(&self, i: usize) -> f64 {
        self.samples[i].high
    }

    fn low(&self, i: usize) -> f64 {
        self.samples[i].low
    }

    fn close(&self, i: usize) -> f64 {
        self.samples[i].close
    }

    fn volume(&self, i: usize) -> f64 {
        self.samples[i].volume
    }

    fn identity(&self) -> SeriesId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
