//! Bit-exact digests of derived indicator arrays.
//!
//! A digest is BLAKE3 over the little-endian bytes of the x array followed by
//! every line, each prefixed with its length. Two results share a digest iff
//! they are bit-identical (NaN payloads included), which is what determinism
//! checks need: approximate equality would hide platform drift.

use crate::engine::IndicatorCache;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hex-encoded BLAKE3 digest of a computed result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineDigest(pub String);

impl fmt::Display for LineDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn update_slice(hasher: &mut blake3::Hasher, values: &[f64]) {
    hasher.update(&(values.len() as u64).to_le_bytes());
    for v in values {
        hasher.update(&v.to_bits().to_le_bytes());
    }
}

/// Digest an x array and any number of derived lines.
pub fn digest_lines<'a, I>(x: &[f64], lines: I) -> LineDigest
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut hasher = blake3::Hasher::new();
    update_slice(&mut hasher, x);
    for line in lines {
        update_slice(&mut hasher, line);
    }
    LineDigest(hasher.finalize().to_hex().to_string())
}

/// Digest of a ready cache's x array and lines; `None` if nothing is drawable.
pub fn digest_cache(cache: &IndicatorCache) -> Option<LineDigest> {
    if !cache.is_ready() {
        return None;
    }
    Some(digest_lines(cache.x(), cache.lines()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let x = [0.0, 1.0, 2.0];
        let a = [1.0, 2.0, 3.0];
        assert_eq!(digest_lines(&x, [&a[..]]), digest_lines(&x, [&a[..]]));
    }

    #[test]
    fn digest_sees_single_bit_changes() {
        let x = [0.0, 1.0];
        let a = [1.0, 2.0];
        let b = [1.0, f64::from_bits(2.0f64.to_bits() + 1)];
        assert_ne!(digest_lines(&x, [&a[..]]), digest_lines(&x, [&b[..]]));
    }

    #[test]
    fn digest_separates_line_boundaries() {
        let x: [f64; 0] = [];
        let a = [1.0, 2.0];
        let b = [3.0];
        let joined = [1.0, 2.0, 3.0];
        let empty: [f64; 0] = [];
        assert_ne!(
            digest_lines(&x, [&a[..], &b[..]]),
            digest_lines(&x, [&joined[..], &empty[..]])
        );
    }

    #[test]
    fn digest_is_hex() {
        let d = digest_lines(&[1.0], std::iter::empty());
        assert_eq!(d.0.len(), 64);
        assert!(d.0.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
