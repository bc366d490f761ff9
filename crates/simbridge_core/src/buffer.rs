//! # Caller-Owned Buffers
//!
//! The memory half of a boundary call. The caller allocates, the callee
//! writes during the call, the caller reads afterwards. The callee never
//! keeps a reference, so a buffer can be reused for the next call as soon
//! as the previous one returned.

use crate::error::{ProtocolError, ProtocolResult};

/// A growable, caller-owned byte buffer with a committed payload length.
///
/// The whole capacity is offered to the callee; only the committed prefix
/// is ever exposed to readers. Growth zero-fills, so stale bytes from an
/// earlier call are never handed out as part of a payload.
///
/// # Example
///
/// ```rust
/// use simbridge_core::ByteBuffer;
///
/// let mut buf = ByteBuffer::with_capacity(4);
/// buf.writable()[..2].copy_from_slice(&[1, 2]);
/// buf.commit(2).unwrap();
/// assert_eq!(buf.payload(), &[1, 2]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    /// Backing storage; its length is the offered capacity.
    data: Vec<u8>,
    /// Committed payload length.
    len: usize,
}

impl ByteBuffer {
    /// Creates a zeroed buffer offering `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            len: 0,
        }
    }

    /// Returns the capacity offered to callees.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the committed payload length.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no payload is committed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Grows the buffer to at least `capacity` bytes. Never shrinks.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.data.len() {
            self.data.resize(capacity, 0);
        }
    }

    /// Hands the full capacity to a callee.
    ///
    /// Drops the committed payload: whatever the callee does, the previous
    /// payload is no longer valid.
    #[inline]
    pub fn writable(&mut self) -> &mut [u8] {
        self.len = 0;
        &mut self.data
    }

    /// Commits the first `len` bytes as the payload.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Overrun`] if `len` exceeds the capacity.
    pub fn commit(&mut self, len: usize) -> ProtocolResult<()> {
        if len > self.data.len() {
            return Err(ProtocolError::Overrun {
                len: len as u64,
                capacity: self.data.len() as u64,
            });
        }
        self.len = len;
        Ok(())
    }

    /// Returns the committed payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Copies the committed payload out.
    #[must_use]
    pub fn to_payload(&self) -> Vec<u8> {
        self.payload().to_vec()
    }

    /// Forgets the committed payload, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_zeroed_and_empty() {
        let mut buf = ByteBuffer::with_capacity(8);
        assert_eq!(buf.capacity(), 8);
        assert!(buf.is_empty());
        assert!(buf.writable().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_commit_bounds() {
        let mut buf = ByteBuffer::with_capacity(4);
        assert!(buf.commit(4).is_ok());
        assert_eq!(
            buf.commit(5),
            Err(ProtocolError::Overrun { len: 5, capacity: 4 })
        );
    }

    #[test]
    fn test_writable_invalidates_payload() {
        let mut buf = ByteBuffer::with_capacity(4);
        buf.writable().copy_from_slice(&[1, 2, 3, 4]);
        buf.commit(3).unwrap();
        assert_eq!(buf.payload(), &[1, 2, 3]);

        let _ = buf.writable();
        assert!(buf.payload().is_empty());
    }

    #[test]
    fn test_growth_zero_fills_and_never_shrinks() {
        let mut buf = ByteBuffer::with_capacity(2);
        buf.writable().copy_from_slice(&[9, 9]);
        buf.ensure_capacity(5);
        assert_eq!(buf.capacity(), 5);
        assert_eq!(&buf.writable()[2..], &[0, 0, 0]);

        buf.ensure_capacity(1);
        assert_eq!(buf.capacity(), 5);
    }
}
