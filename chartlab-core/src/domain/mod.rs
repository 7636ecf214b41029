//! Domain types: samples and the source series contract.

pub mod sample;
pub mod series;

pub use sample::Sample;
pub use series::{SeriesId, SourceSeries, VecSeries};
