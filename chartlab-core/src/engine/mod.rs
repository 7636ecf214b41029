//! Incremental computation engine.
//!
//! Indicator layers hold an [`IndicatorCache`] that is brought up to date at
//! the start of every frame. Work is proportional to the data only when the
//! source changed; otherwise a frame costs a key comparison.

pub mod buffer;
pub mod cache;
pub mod range;

pub use buffer::ScratchBuffer;
pub use cache::{CacheKey, CacheState, Freshness, IndicatorCache};
pub use range::{RangePolicy, YRange};
