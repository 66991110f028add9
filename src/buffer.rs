//! Growable response buffer used by [`Fetcher`](crate::Fetcher).
//!
//! The buffer tracks its own logical capacity instead of relying on whatever
//! `Vec` decides to allocate, so the growth policy can be checked directly:
//! capacity doubles (starting from 1) until it is strictly larger than the
//! bytes it must hold, and it saturates at `limit` instead of wrapping.

use std::str::Utf8Error;

use crate::error::BufferError;

/// Capacity allocated before the first chunk arrives.
pub const INITIAL_CAPACITY: usize = 1024;

/// Largest size a single allocation may have.
pub const MAX_CAPACITY: usize = isize::MAX as usize;

#[derive(Debug)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    capacity: usize,
    limit: usize,
}

impl ResponseBuffer {
    /// Creates a buffer with [`INITIAL_CAPACITY`] bytes allocated.
    pub fn new() -> Result<Self, BufferError> {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, BufferError> {
        Self::with_limit(capacity, MAX_CAPACITY)
    }

    /// Creates a buffer that refuses to grow past `limit` bytes.
    ///
    /// The initial capacity is clamped to `limit`.
    pub fn with_limit(capacity: usize, limit: usize) -> Result<Self, BufferError> {
        let capacity = capacity.min(limit);
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| BufferError::Allocation { capacity })?;
        Ok(Self {
            data,
            capacity,
            limit,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical capacity chosen by the growth policy.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Makes room for `count` elements of `element_size` bytes each.
    ///
    /// Returns the length the buffer will have once they are written. Both the
    /// multiplication and the addition are checked before any memory is
    /// touched; on error the buffer is left exactly as it was.
    pub fn reserve(&mut self, count: usize, element_size: usize) -> Result<usize, BufferError> {
        let len = self.data.len();
        let limit = self.limit;
        let overflow = || BufferError::CapacityOverflow {
            len,
            count,
            element_size,
            limit,
        };
        let required = count
            .checked_mul(element_size)
            .and_then(|bytes| len.checked_add(bytes))
            .ok_or_else(overflow)?;
        let capacity = grow_capacity(self.capacity, required, limit).ok_or_else(overflow)?;

        if capacity > self.capacity {
            self.data
                .try_reserve_exact(capacity - len)
                .map_err(|_| BufferError::Allocation { capacity })?;
            log::trace!("response buffer grew from {} to {} bytes", self.capacity, capacity);
            self.capacity = capacity;
        }

        Ok(required)
    }

    /// Appends one chunk, growing the buffer as needed.
    pub fn write(&mut self, chunk: &[u8]) -> Result<usize, BufferError> {
        self.reserve(chunk.len(), 1)?;
        self.data.extend_from_slice(chunk);
        Ok(chunk.len())
    }

    /// Trims the allocation to `len + 1` and appends the NUL terminator.
    pub fn finish(mut self) -> Body {
        self.data.shrink_to(self.data.len() + 1);
        self.data.push(0);
        Body { bytes: self.data }
    }
}

/// Applies the doubling policy until the capacity is strictly larger than
/// `required`.
///
/// Returns `None` when `required` is not below `limit`: one byte must stay
/// free for the terminator.
pub fn grow_capacity(current: usize, required: usize, limit: usize) -> Option<usize> {
    if required >= limit {
        return None;
    }
    let mut capacity = current.min(limit);
    while required >= capacity {
        capacity = if capacity == 0 {
            1
        } else if capacity > limit / 2 {
            limit
        } else {
            capacity * 2
        };
    }
    Some(capacity)
}

/// A finished response body, always followed by a single NUL byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    bytes: Vec<u8>,
}

impl Body {
    /// Body length, not counting the terminator.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    /// Returns the bytes without the terminator.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.bytes.pop();
        self.bytes
    }
}
