//! Fixed-capacity byte buffer used to hand payloads between layers.
//!
//! A [`DataBuffer`] has a capacity chosen at creation and a used size that
//! grows as bytes are written. It never reallocates: when more room is
//! needed, create a new buffer. The buffer has exactly one owner at a time;
//! layers receive borrowed slices of it for the duration of a call.

use bytes::Bytes;

use crate::error::BufferError;

/// Single-owner byte container with separate capacity and used size.
///
/// Invariant: `size() <= capacity()`.
#[derive(Debug, PartialEq, Eq)]
pub struct DataBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl DataBuffer {
    /// Allocate a buffer able to hold `capacity` bytes.
    ///
    /// Returns `Ok(None)` when the allocator cannot provide the storage, so
    /// callers never observe a partially initialised buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::ZeroCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ondemand::DataBuffer;
    ///
    /// let buffer = DataBuffer::create(64).unwrap().unwrap();
    /// assert_eq!(buffer.capacity(), 64);
    /// assert_eq!(buffer.size(), 0);
    /// ```
    pub fn create(capacity: usize) -> Result<Option<Self>, BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        let mut bytes = Vec::new();
        if let Err(err) = bytes.try_reserve_exact(capacity) {
            log::debug!("data buffer allocation failed: capacity={capacity}, error={err}");
            return Ok(None);
        }
        Ok(Some(Self { bytes, capacity }))
    }

    /// Release the storage. Consuming `self` makes a second release
    /// impossible.
    pub fn destroy(self) { drop(self); }

    /// Maximum number of bytes the buffer can hold.
    #[must_use]
    pub fn capacity(&self) -> usize { self.capacity }

    /// Number of bytes currently in use.
    #[must_use]
    pub fn size(&self) -> usize { self.bytes.len() }

    /// Returns `true` when no bytes are in use.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Number of bytes that can still be written.
    #[must_use]
    pub fn remaining(&self) -> usize { self.capacity - self.bytes.len() }

    /// The used portion of the buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.bytes }

    /// Mutable view of the used portion of the buffer.
    pub fn as_mut_slice(&mut self) -> &mut [u8] { &mut self.bytes }

    /// Append as much of `data` as fits and return the number of bytes
    /// copied.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let count = data.len().min(self.remaining());
        self.bytes.extend_from_slice(&data[..count]);
        count
    }

    /// Shorten the used portion to `size` bytes. Has no effect when `size`
    /// is not smaller than the current size.
    pub fn truncate(&mut self, size: usize) { self.bytes.truncate(size); }

    /// Mark every byte as unused. Capacity is kept.
    pub fn clear(&mut self) { self.bytes.clear(); }

    /// Hand the used bytes to a consumer without copying.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { Bytes::from(self.bytes) }
}

impl AsRef<[u8]> for DataBuffer {
    fn as_ref(&self) -> &[u8] { self.as_slice() }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn buffer() -> DataBuffer {
        DataBuffer::create(8)
            .expect("non-zero capacity")
            .expect("allocation succeeds")
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(DataBuffer::create(0), Err(BufferError::ZeroCapacity));
    }

    #[test]
    fn failed_allocation_yields_no_buffer() {
        assert_eq!(DataBuffer::create(usize::MAX), Ok(None));
    }

    #[rstest]
    fn write_stops_at_capacity(mut buffer: DataBuffer) {
        assert_eq!(buffer.write(b"hello"), 5);
        assert_eq!(buffer.write(b"world"), 3);
        assert_eq!(buffer.as_slice(), b"hellowor");
        assert_eq!(buffer.remaining(), 0);
        assert_eq!(buffer.write(b"!"), 0);
    }

    #[rstest]
    fn clear_keeps_capacity(mut buffer: DataBuffer) {
        buffer.write(b"abc");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 8);
        assert_eq!(buffer.remaining(), 8);
    }

    #[rstest]
    fn truncate_shrinks_used_size(mut buffer: DataBuffer) {
        buffer.write(b"abcdef");
        buffer.truncate(2);
        assert_eq!(buffer.as_slice(), b"ab");
        buffer.truncate(10);
        assert_eq!(buffer.size(), 2);
    }

    #[rstest]
    fn into_bytes_hands_over_used_portion(mut buffer: DataBuffer) {
        buffer.write(b"xyz");
        assert_eq!(buffer.into_bytes(), Bytes::from_static(b"xyz"));
    }

    #[rstest]
    fn mutable_view_edits_in_place(mut buffer: DataBuffer) {
        buffer.write(b"abc");
        buffer.as_mut_slice()[0] = b'z';
        assert_eq!(buffer.as_ref(), b"zbc");
    }

    proptest! {
        #[test]
        fn fresh_buffer_is_empty_with_requested_capacity(capacity in 1usize..4096) {
            let buffer = DataBuffer::create(capacity)
                .expect("non-zero capacity")
                .expect("allocation succeeds");
            prop_assert_eq!(buffer.size(), 0);
            prop_assert_eq!(buffer.capacity(), capacity);
            buffer.destroy();
        }

        #[test]
        fn size_never_exceeds_capacity(
            capacity in 1usize..256,
            chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..64), 0..16),
        ) {
            let mut buffer = DataBuffer::create(capacity)
                .expect("non-zero capacity")
                .expect("allocation succeeds");
            for chunk in &chunks {
                buffer.write(chunk);
                prop_assert!(buffer.size() <= buffer.capacity());
            }
        }
    }
}
