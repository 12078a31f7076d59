/*!
 * Unmanaged Heap
 *
 * Contract for allocate/resize/free against an allocator this crate does not
 * implement. Handles own blocks obtained through this contract and release
 * them through the heap that produced them.
 *
 * # Flags
 *
 * - `GLOBAL_ZERO`: every allocation is zeroed
 * - `USE_SYNCHRONIZATION`: the allocator serializes its own calls; says
 *   nothing about concurrent access to block contents
 * - `IS_SHARED`: the heap is the process-wide heap
 * - `SUPPORTS_REALLOC`: `resize` is available
 */

mod flags;
mod system;

pub use flags::{HeapConfig, HeapCreationFlags};
pub use system::{HeapStats, SystemHeap};

use crate::core::errors::{MemoryError, MemoryResult};
use crate::core::types::{Element, Size};
use crate::memory::handle::MemoryHandle;
use std::ptr::NonNull;
use std::sync::Arc;

/// Shared reference to a heap
pub type HeapRef = Arc<dyn UnmanagedHeap>;

/// Unmanaged heap interface
pub trait UnmanagedHeap: Send + Sync {
    /// Flags the heap was created with
    fn creation_flags(&self) -> HeapCreationFlags;

    /// Allocate a block of `elements * element_size` bytes
    ///
    /// `zero` forces a zero-filled block regardless of `GLOBAL_ZERO`.
    /// Fails with `OutOfMemory` when the allocator cannot satisfy the request
    /// and with `Overflow` when the byte size does not fit.
    fn alloc(&self, elements: Size, element_size: Size, zero: bool) -> MemoryResult<NonNull<u8>>;

    /// Resize a block, possibly moving it
    ///
    /// The retained prefix is preserved. The grown tail is zeroed only when
    /// `zero` is set. Heaps without `SUPPORTS_REALLOC` return `NotSupported`
    /// and leave the block untouched.
    fn resize(
        &self,
        block: NonNull<u8>,
        elements: Size,
        element_size: Size,
        zero: bool,
    ) -> MemoryResult<NonNull<u8>>;

    /// Free a block, returning whether the heap released it
    ///
    /// Freeing the same block twice is the caller's bug.
    fn free(&self, block: NonNull<u8>) -> bool;
}

/// Byte size of a block, validated against overflow
#[inline]
pub(crate) fn block_size(elements: Size, element_size: Size) -> MemoryResult<Size> {
    elements
        .checked_mul(element_size)
        .filter(|bytes| *bytes <= isize::MAX as usize)
        .ok_or(MemoryError::Overflow {
            elements,
            element_size,
        })
}

/// Handle constructors on a heap reference
pub trait HeapExt {
    /// Allocate a zeroed heap-backed handle of `len` elements
    fn alloc_handle<T: Element>(&self, len: Size) -> MemoryResult<MemoryHandle<T>>;

    /// Allocate a heap-backed handle without zeroing it
    ///
    /// # Safety
    ///
    /// The block contents are uninitialized. The caller must write every
    /// element before reading it.
    unsafe fn alloc_handle_uninit<T: Element>(&self, len: Size) -> MemoryResult<MemoryHandle<T>>;
}

impl HeapExt for HeapRef {
    fn alloc_handle<T: Element>(&self, len: Size) -> MemoryResult<MemoryHandle<T>> {
        MemoryHandle::alloc(self, len)
    }

    unsafe fn alloc_handle_uninit<T: Element>(&self, len: Size) -> MemoryResult<MemoryHandle<T>> {
        MemoryHandle::alloc_uninit(self, len)
    }
}
