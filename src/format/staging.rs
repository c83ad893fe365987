//! Scoped staging buffers for the decode path.
//!
//! Record bytes land in a staging buffer before being copied into each
//! item's owned buffer. The guard releases the allocation when it goes out
//! of scope, so early returns on error release it as well.
//!
//! Buffers start with a bounded capacity and grow only as bytes arrive, so
//! sizes declared by a header never turn into an up-front allocation.

use std::cell::Cell;

/// Bytes reserved when a staging buffer is acquired.
pub(crate) const MAX_INITIAL_CAPACITY: usize = 1 << 20;

/// Acquire/release counts for the staging buffers of one loader.
#[derive(Debug, Default)]
pub(crate) struct StagingCounters {
    acquired: Cell<usize>,
    released: Cell<usize>,
}

impl StagingCounters {
    pub(crate) fn snapshot(&self) -> StagingStats {
        StagingStats {
            acquired: self.acquired.get(),
            released: self.released.get(),
        }
    }
}

/// Snapshot of staging buffer activity for one loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StagingStats {
    /// Buffers acquired so far.
    pub acquired: usize,
    /// Buffers released so far.
    pub released: usize,
}

impl StagingStats {
    /// True when every acquired buffer has been released exactly once.
    pub fn is_balanced(&self) -> bool {
        self.acquired == self.released
    }
}

/// Transient decode buffer, released on drop.
pub(crate) struct StagingBuffer<'a> {
    bytes: Vec<u8>,
    purpose: &'static str,
    counters: &'a StagingCounters,
}

impl<'a> StagingBuffer<'a> {
    /// Start an empty buffer expected to hold up to `len` bytes.
    ///
    /// At most [`MAX_INITIAL_CAPACITY`] bytes are reserved up front.
    pub(crate) fn acquire(
        len: usize,
        purpose: &'static str,
        counters: &'a StagingCounters,
    ) -> Self {
        Self::adopt(
            Vec::with_capacity(len.min(MAX_INITIAL_CAPACITY)),
            purpose,
            counters,
        )
    }

    /// Take ownership of an existing allocation (e.g. a decompressed body).
    pub(crate) fn adopt(
        bytes: Vec<u8>,
        purpose: &'static str,
        counters: &'a StagingCounters,
    ) -> Self {
        counters.acquired.set(counters.acquired.get() + 1);
        log::debug!("Staging {} buffer acquired ({} bytes)", purpose, bytes.len());
        Self {
            bytes,
            purpose,
            counters,
        }
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// The underlying vector, for reads that append.
    pub(crate) fn as_mut_vec(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl Drop for StagingBuffer<'_> {
    fn drop(&mut self) {
        self.counters.released.set(self.counters.released.get() + 1);
        log::debug!(
            "Staging {} buffer released ({} bytes)",
            self.purpose,
            self.bytes.len()
        );
    }
}
