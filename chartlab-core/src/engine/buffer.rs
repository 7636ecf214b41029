//! Grow-only scratch buffers.
//!
//! A `ScratchBuffer` separates its logical length (the watermark) from its
//! allocated capacity. Asking for a smaller length moves the watermark only;
//! asking for a larger one grows the allocation geometrically. Storage is
//! never released, so a series that shrinks and regrows within the historical
//! peak never allocates again.

use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct ScratchBuffer<T> {
    data: Vec<T>,
    len: usize,
    grows: u32,
}

impl<T: Copy + Default> ScratchBuffer<T> {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            len: 0,
            grows: 0,
        }
    }

    /// Set the watermark to `n`. Returns true if the buffer had to grow.
    ///
    /// Values below the new watermark are unspecified until written.
    pub fn ensure_len(&mut self, n: usize) -> bool {
        let grew = n > self.data.len();
        if grew {
            let capacity = n.max(self.data.len().saturating_mul(2));
            trace!(
                from = self.data.len(),
                to = capacity,
                "scratch buffer growing"
            );
            self.data.resize(capacity, T::default());
            self.grows += 1;
        }
        self.len = n;
        grew
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements that fit without reallocating.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// How many times the allocation has grown.
    pub fn grow_count(&self) -> u32 {
        self.grows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_geometrically() {
        let mut buf = ScratchBuffer::<f64>::new();
        assert!(buf.ensure_len(10));
        assert_eq!(buf.capacity(), 10);
        assert!(buf.ensure_len(11));
        assert_eq!(buf.capacity(), 20);
        assert!(!buf.ensure_len(20));
        assert_eq!(buf.grow_count(), 2);
    }

    #[test]
    fn never_shrinks() {
        let mut buf = ScratchBuffer::<f64>::new();
        buf.ensure_len(100);
        assert!(!buf.ensure_len(3));
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.capacity(), 100);
        assert!(!buf.ensure_len(100));
        assert_eq!(buf.grow_count(), 1);
    }

    #[test]
    fn slices_respect_watermark() {
        let mut buf = ScratchBuffer::<f64>::new();
        buf.ensure_len(8);
        buf.as_mut_slice().fill(1.5);
        buf.ensure_len(4);
        assert_eq!(buf.as_slice(), &[1.5; 4]);
        buf.ensure_len(0);
        assert!(buf.is_empty());
    }
}
