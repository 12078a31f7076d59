/*!
 * Array Pooling
 * Reduces allocation pressure by lending reusable arrays
 */

use crate::core::errors::{MemoryError, MemoryResult};
use crate::core::limits::{
    DEFAULT_ARRAYS_PER_BUCKET, DEFAULT_MAX_POOLED_ARRAY_LENGTH, MIN_POOLED_ARRAY_LENGTH,
};
use crate::core::types::{Element, Size};
use crossbeam_queue::ArrayQueue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

/// Shared reference to an array pool
pub type PoolRef<T> = Arc<dyn ArrayPool<T>>;

/// Array pool interface
///
/// Rented arrays may be longer than requested. Callers track the length they
/// asked for and hand the whole array back on release.
pub trait ArrayPool<T: Element>: Send + Sync {
    /// Rent an array with `len() >= min_len`, zero-filled when `zero` is set
    fn rent(&self, min_len: Size, zero: bool) -> MemoryResult<Vec<T>>;

    /// Return a previously rented array
    fn release(&self, array: Vec<T>);
}

/// Pool configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Largest array length (elements) kept in the pool
    pub max_array_length: Size,
    /// Arrays retained per size bucket
    pub arrays_per_bucket: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_array_length: DEFAULT_MAX_POOLED_ARRAY_LENGTH,
            arrays_per_bucket: DEFAULT_ARRAYS_PER_BUCKET,
        }
    }
}

impl PoolConfig {
    /// Configuration for short-lived scratch arrays (up to 64K elements)
    pub const fn small() -> Self {
        Self {
            max_array_length: 64 * 1024,
            arrays_per_bucket: 8,
        }
    }
}

/// Per-bucket pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStats {
    pub array_length: Size,
    pub retained: usize,
}

/// Array pool statistics
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolStats {
    pub buckets: Vec<BucketStats>,
}

impl PoolStats {
    pub fn total_retained(&self) -> usize {
        self.buckets.iter().map(|b| b.retained).sum()
    }
}

/// Lock-free array pool with power-of-two size buckets
///
/// # Performance
///
/// - **Rent/release**: one lock-free queue operation
/// - **Bounded**: at most `arrays_per_bucket` idle arrays per bucket
/// - **Oversized requests**: served unpooled and dropped on release
pub struct SharedArrayPool<T: Element> {
    buckets: Arc<[ArrayQueue<Vec<T>>]>,
    max_array_length: Size,
}

impl<T: Element> SharedArrayPool<T> {
    /// Create a new pool
    pub fn new(config: PoolConfig) -> Self {
        let max_array_length = config
            .max_array_length
            .max(MIN_POOLED_ARRAY_LENGTH)
            .checked_next_power_of_two()
            .unwrap_or(DEFAULT_MAX_POOLED_ARRAY_LENGTH);
        let capacity = config.arrays_per_bucket.max(1);
        let bucket_count = (max_array_length.trailing_zeros()
            - MIN_POOLED_ARRAY_LENGTH.trailing_zeros()) as usize
            + 1;

        debug!(
            max_array_length,
            arrays_per_bucket = capacity,
            bucket_count,
            "Array pool created"
        );

        Self {
            buckets: (0..bucket_count).map(|_| ArrayQueue::new(capacity)).collect(),
            max_array_length,
        }
    }

    /// Create a pool behind a [`PoolRef`]
    pub fn shared(config: PoolConfig) -> PoolRef<T> {
        Arc::new(Self::new(config))
    }

    /// Largest pooled array length
    #[inline]
    pub fn max_array_length(&self) -> Size {
        self.max_array_length
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            buckets: self
                .buckets
                .iter()
                .enumerate()
                .map(|(index, queue)| BucketStats {
                    array_length: Self::bucket_length(index),
                    retained: queue.len(),
                })
                .collect(),
        }
    }

    #[inline]
    fn bucket_length(index: usize) -> Size {
        MIN_POOLED_ARRAY_LENGTH << index
    }

    /// Bucket serving a request of `len` elements
    #[inline]
    fn bucket_for_request(&self, len: Size) -> Option<usize> {
        if len > self.max_array_length {
            return None;
        }
        let rounded = len.max(MIN_POOLED_ARRAY_LENGTH).next_power_of_two();
        Some((rounded.trailing_zeros() - MIN_POOLED_ARRAY_LENGTH.trailing_zeros()) as usize)
    }

    /// Bucket owning an array of exactly `len` elements
    #[inline]
    fn bucket_for_array(&self, len: Size) -> Option<usize> {
        if len < MIN_POOLED_ARRAY_LENGTH || !len.is_power_of_two() {
            return None;
        }
        self.bucket_for_request(len)
    }

    fn allocate(len: Size) -> MemoryResult<Vec<T>> {
        let mut array = Vec::new();
        array
            .try_reserve_exact(len)
            .map_err(|_| MemoryError::OutOfMemory {
                requested: len.saturating_mul(std::mem::size_of::<T>()),
            })?;
        array.resize(len, T::ZERO);
        Ok(array)
    }
}

impl<T: Element> ArrayPool<T> for SharedArrayPool<T> {
    fn rent(&self, min_len: Size, zero: bool) -> MemoryResult<Vec<T>> {
        if min_len == 0 {
            return Ok(Vec::new());
        }

        let Some(index) = self.bucket_for_request(min_len) else {
            debug!(len = min_len, "Renting unpooled oversized array");
            return Self::allocate(min_len);
        };

        match self.buckets[index].pop() {
            Some(mut array) => {
                if zero {
                    array.fill(T::ZERO);
                }
                trace!(len = min_len, array_length = array.len(), "Reused pooled array");
                Ok(array)
            }
            // Fresh arrays are always zeroed
            None => Self::allocate(Self::bucket_length(index)),
        }
    }

    fn release(&self, array: Vec<T>) {
        let len = array.len();
        let Some(index) = self.bucket_for_array(len) else {
            trace!(array_length = len, "Dropping array that does not fit a bucket");
            return;
        };

        if self.buckets[index].push(array).is_err() {
            trace!(array_length = len, "Bucket full, dropping array");
        }
    }
}

impl<T: Element> Default for SharedArrayPool<T> {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl<T: Element> Clone for SharedArrayPool<T> {
    fn clone(&self) -> Self {
        Self {
            buckets: Arc::clone(&self.buckets),
            max_array_length: self.max_array_length,
        }
    }
}
