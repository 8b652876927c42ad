//! Owned packet buffer with head-consuming reads.

use bytes::{BufMut, BytesMut};

/// Byte buffer holding one packet as it moves through the receive path.
///
/// Supports the operations the decrypt pipeline needs: consuming a fixed
/// number of bytes from the head (tag, IV, packet ID), resetting to empty
/// on rejection, and swapping contents with the pipeline's scratch buffer
/// without copying.
#[derive(Debug, Default)]
pub struct PacketBuffer {
    data: BytesMut,
}

impl PacketBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            data: BytesMut::new(),
        }
    }

    /// Create an empty buffer with `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
        }
    }

    /// Create a buffer holding a copy of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
        }
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View the current contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable view of the current contents.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume and return `n` bytes from the head, or `None` if fewer
    /// than `n` bytes remain (the buffer is left unchanged in that case).
    pub fn read_front(&mut self, n: usize) -> Option<BytesMut> {
        if self.data.len() < n {
            return None;
        }
        Some(self.data.split_to(n))
    }

    /// Append `bytes` at the tail.
    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.data.put_slice(bytes);
    }

    /// Discard all contents, keeping the allocation.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Resize to exactly `n` zeroed bytes, discarding prior contents.
    /// Used to stage the buffer as a decrypt output region.
    pub fn resize_zeroed(&mut self, n: usize) {
        self.data.clear();
        self.data.resize(n, 0);
    }

    /// Shorten to `n` bytes; no-op if already shorter.
    pub fn truncate(&mut self, n: usize) {
        self.data.truncate(n);
    }

    /// Exchange contents with `other` without copying.
    pub fn swap(&mut self, other: &mut PacketBuffer) {
        std::mem::swap(&mut self.data, &mut other.data);
    }
}
