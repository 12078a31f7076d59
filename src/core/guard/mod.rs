/*!
 * Release Guards
 *
 * Deterministic release for resources that own a memory block.
 *
 * ## Design Principles
 *
 * 1. **RAII first**: `Drop` is the normal release path
 * 2. **Idempotent**: releasing twice never double-frees or double-returns
 * 3. **Observable**: guards carry metadata so release can be traced
 *
 * ## Guard Types
 *
 * - **MemoryHandle**: pool- or heap-backed block
 * - **PooledBuffer**: rented array sized to the caller's request
 * - **HandleBufferManager**: bridge that may own a handle
 */

mod traits;

pub use traits::{Guard, GuardDrop};

use std::time::Instant;

/// Guard metadata for observability
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub resource_type: &'static str,
    pub creation_time: Instant,
    pub size_bytes: usize,
}

impl GuardMetadata {
    #[inline]
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            creation_time: Instant::now(),
            size_bytes: 0,
        }
    }

    #[inline]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size_bytes = size;
        self
    }

    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        self.creation_time.elapsed().as_micros() as u64
    }
}
