/*!
 * Pooled Buffers
 * Owning wrapper around one rented array, sized to the caller's request
 */

use super::handle::HandleType;
use super::manager::BufferManager;
use super::pin::MemoryPin;
use super::pool::PoolRef;
use crate::core::errors::{MemoryError, MemoryResult};
use crate::core::guard::{Guard, GuardDrop, GuardMetadata};
use crate::core::types::{Element, Size};
use std::ptr::NonNull;
use tracing::debug;

const RESOURCE: &str = "pooled buffer";

/// Rented array that exposes exactly the requested length
///
/// The pool may grant a longer array; the extra capacity is never visible.
/// Every accessor fails with `Disposed` once the buffer has been released.
///
/// # Example
///
/// ```ignore
/// let mut buf = PooledBuffer::rent(&pool, 100, true)?;
/// buf.set(0, 7)?;
/// buf.release()?; // or let it drop
/// ```
pub struct PooledBuffer<T: Element> {
    pool: PoolRef<T>,
    array: Option<Vec<T>>,
    len: Size,
    metadata: GuardMetadata,
}

impl<T: Element> PooledBuffer<T> {
    /// Rent a buffer of `len` elements, zero-filled when `zero` is set
    pub fn rent(pool: &PoolRef<T>, len: Size, zero: bool) -> MemoryResult<Self> {
        let array = pool.rent(len, zero)?;
        if array.len() < len {
            pool.release(array);
            return Err(MemoryError::InvalidArgument(
                "pool returned an array shorter than requested",
            ));
        }

        debug!(len, zero, "Rented pooled buffer");

        Ok(Self {
            pool: PoolRef::clone(pool),
            array: Some(array),
            len,
            metadata: GuardMetadata::new("pooled_buffer")
                .with_size(len * std::mem::size_of::<T>()),
        })
    }

    /// Logical length requested at construction
    #[inline]
    pub fn len(&self) -> Size {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.array.is_none()
    }

    pub fn as_slice(&self) -> MemoryResult<&[T]> {
        let len = self.len;
        self.array
            .as_deref()
            .map(|array| &array[..len])
            .ok_or(MemoryError::Disposed(RESOURCE))
    }

    pub fn as_mut_slice(&mut self) -> MemoryResult<&mut [T]> {
        let len = self.len;
        self.array
            .as_deref_mut()
            .map(|array| &mut array[..len])
            .ok_or(MemoryError::Disposed(RESOURCE))
    }

    /// Element at `index`
    pub fn get(&self, index: Size) -> MemoryResult<T> {
        let len = self.len;
        self.as_slice()?
            .get(index)
            .copied()
            .ok_or(MemoryError::IndexOutOfRange { index, len })
    }

    /// Overwrite the element at `index`
    pub fn set(&mut self, index: Size, value: T) -> MemoryResult<()> {
        let len = self.len;
        let slot = self
            .as_mut_slice()?
            .get_mut(index)
            .ok_or(MemoryError::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Sub-range `[offset, offset + len)`
    pub fn slice(&self, offset: Size, len: Size) -> MemoryResult<&[T]> {
        let all = self.as_slice()?;
        let end = Self::range_end(offset, len, all.len())?;
        Ok(&all[offset..end])
    }

    /// Mutable sub-range `[offset, offset + len)`
    pub fn slice_mut(&mut self, offset: Size, len: Size) -> MemoryResult<&mut [T]> {
        let all = self.as_mut_slice()?;
        let end = Self::range_end(offset, len, all.len())?;
        Ok(&mut all[offset..end])
    }

    #[inline]
    fn range_end(offset: Size, len: Size, bound: Size) -> MemoryResult<Size> {
        offset
            .checked_add(len)
            .filter(|end| *end <= bound)
            .ok_or(MemoryError::out_of_range(offset, len, bound))
    }
}

impl<T: Element> Guard for PooledBuffer<T> {
    fn resource_type(&self) -> &'static str {
        "pooled_buffer"
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.array.is_some()
    }

    fn release(&mut self) -> MemoryResult<()> {
        if let Some(array) = self.array.take() {
            self.pool.release(array);
            debug!(
                len = self.len,
                lifetime_us = self.metadata.lifetime_micros(),
                "Returned pooled buffer"
            );
        }
        Ok(())
    }
}

impl<T: Element> GuardDrop for PooledBuffer<T> {}

impl<T: Element> Drop for PooledBuffer<T> {
    fn drop(&mut self) {
        self.on_drop();
    }
}

impl<T: Element> BufferManager<T> for PooledBuffer<T> {
    fn memory(&mut self) -> MemoryResult<&mut [T]> {
        self.as_mut_slice()
    }

    fn pin(&mut self, index: Size) -> MemoryResult<MemoryPin<'_, T>> {
        let len = self.len;
        let element = self
            .as_mut_slice()?
            .get_mut(index)
            .ok_or(MemoryError::IndexOutOfRange { index, len })?;
        Ok(MemoryPin::new(NonNull::from(element), index, HandleType::Pool))
    }
}

impl<T: Element> std::fmt::Debug for PooledBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.len)
            .field("released", &self.is_released())
            .finish()
    }
}
