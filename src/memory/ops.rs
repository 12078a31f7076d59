/*!
 * Block Operations
 * Bounds-checked copies and resize helpers over handles and slices
 */

use super::handle::MemoryHandle;
use super::heap::HeapRef;
use crate::core::errors::{MemoryError, MemoryResult};
use crate::core::types::{Element, Size};
use tracing::debug;

/// Copy `count` elements from `src[src_offset..]` into `dst[dst_offset..]`
pub fn copy<T: Copy>(
    src: &[T],
    src_offset: Size,
    dst: &mut [T],
    dst_offset: Size,
    count: Size,
) -> MemoryResult<()> {
    let src_end = checked_end(src_offset, count, src.len())?;
    let dst_end = checked_end(dst_offset, count, dst.len())?;
    dst[dst_offset..dst_end].copy_from_slice(&src[src_offset..src_end]);
    Ok(())
}

#[inline]
fn checked_end(offset: Size, count: Size, bound: Size) -> MemoryResult<Size> {
    offset
        .checked_add(count)
        .filter(|end| *end <= bound)
        .ok_or(MemoryError::out_of_range(offset, count, bound))
}

/// Fill a block with zero elements
#[inline]
pub fn zero_block<T: Element>(block: &mut [T]) {
    block.fill(T::ZERO);
}

/// Resize `handle`, falling back to allocate + copy when resize is unsupported
///
/// The fallback allocates a zeroed block of `new_len` elements on `heap`,
/// copies the common prefix and replaces the handle, releasing the old block.
pub fn resize_or_copy<T: Element>(
    handle: &mut MemoryHandle<T>,
    heap: &HeapRef,
    new_len: Size,
) -> MemoryResult<()> {
    match handle.resize(new_len) {
        Err(MemoryError::NotSupported(reason)) => {
            debug!(len = new_len, reason, "Resize unsupported, copying to a new block");
            let mut replacement = MemoryHandle::alloc(heap, new_len)?;
            let keep = handle.len().min(new_len);
            replacement.as_mut_slice()[..keep].copy_from_slice(&handle.as_slice()[..keep]);
            std::mem::replace(handle, replacement).dispose()
        }
        other => other,
    }
}

/// Grow `handle` to `new_len` elements; never shrinks
///
/// Returns whether the handle was resized.
pub fn resize_if_smaller<T: Element>(
    handle: &mut MemoryHandle<T>,
    new_len: Size,
) -> MemoryResult<bool> {
    if handle.len() >= new_len {
        return Ok(false);
    }
    handle.resize(new_len)?;
    Ok(true)
}
