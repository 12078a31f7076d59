/*!
 * Memory Handles
 *
 * One owning handle over three kinds of storage:
 * - **None**: no block, zero length
 * - **Pool**: a rented array, returned to its pool on release
 * - **Heap**: a raw block, freed through its heap on release
 *
 * Equality is identity: two handles are equal when they wrap the same block
 * with the same length, never because their contents match.
 */

use super::heap::{block_size, HeapRef};
use super::pin::MemoryPin;
use super::pool::PoolRef;
use crate::core::errors::{MemoryError, MemoryResult};
use crate::core::guard::{Guard, GuardDrop, GuardMetadata};
use crate::core::types::{byte_len_of, Address, Element, Size};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ptr::NonNull;
use tracing::debug;

/// Kind of storage behind a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleType {
    None,
    Pool,
    Heap,
}

enum HandleKind<T: Element> {
    Empty,
    Pooled {
        pool: PoolRef<T>,
        array: Vec<T>,
        len: Size,
    },
    Heap {
        heap: HeapRef,
        block: NonNull<T>,
        len: Size,
    },
}

/// Owning handle to one contiguous block of `T`
///
/// The element count is fixed when the block is obtained; [`resize`] swaps
/// in a new block rather than stretching the view. The block is released
/// exactly once, by [`dispose`], [`Guard::release`] or `Drop`.
///
/// [`resize`]: MemoryHandle::resize
/// [`dispose`]: MemoryHandle::dispose
pub struct MemoryHandle<T: Element> {
    kind: HandleKind<T>,
    metadata: GuardMetadata,
}

// SAFETY: the handle owns its block exclusively and only hands out borrows
// tied to its own lifetime; pool and heap references are Send + Sync
unsafe impl<T: Element> Send for MemoryHandle<T> {}
// SAFETY: shared access only yields `&[T]`, and `T: Sync`
unsafe impl<T: Element> Sync for MemoryHandle<T> {}

impl<T: Element> MemoryHandle<T> {
    /// A handle with no backing block
    pub fn empty() -> Self {
        Self {
            kind: HandleKind::Empty,
            metadata: GuardMetadata::new("memory_handle"),
        }
    }

    /// Rent a pool-backed handle of exactly `len` elements
    pub fn rent(pool: &PoolRef<T>, len: Size, zero: bool) -> MemoryResult<Self> {
        if len == 0 {
            return Ok(Self::empty());
        }
        let bytes = Self::checked_bytes(len)?;

        let array = pool.rent(len, zero)?;
        if array.len() < len {
            pool.release(array);
            return Err(MemoryError::InvalidArgument(
                "pool returned an array shorter than requested",
            ));
        }

        debug!(len, array_length = array.len(), zero, "Rented pool-backed handle");

        Ok(Self {
            kind: HandleKind::Pooled {
                pool: PoolRef::clone(pool),
                array,
                len,
            },
            metadata: GuardMetadata::new("memory_handle").with_size(bytes),
        })
    }

    /// Allocate a zeroed heap-backed handle of `len` elements
    pub fn alloc(heap: &HeapRef, len: Size) -> MemoryResult<Self> {
        // SAFETY: the block is zeroed and zero is a valid `Element`
        unsafe { Self::heap_alloc(heap, len, true) }
    }

    /// Allocate a heap-backed handle without zeroing it
    ///
    /// # Safety
    ///
    /// Unless the heap was created with `GLOBAL_ZERO`, the block contents are
    /// uninitialized. Every element must be written before it is read.
    pub unsafe fn alloc_uninit(heap: &HeapRef, len: Size) -> MemoryResult<Self> {
        Self::heap_alloc(heap, len, false)
    }

    unsafe fn heap_alloc(heap: &HeapRef, len: Size, zero: bool) -> MemoryResult<Self> {
        if len == 0 {
            return Ok(Self::empty());
        }
        let bytes = Self::checked_bytes(len)?;

        let raw = heap.alloc(len, mem::size_of::<T>(), zero)?;
        if (raw.as_ptr() as Address) % mem::align_of::<T>() != 0 {
            heap.free(raw);
            return Err(MemoryError::InvalidArgument(
                "heap returned a block misaligned for the element type",
            ));
        }

        debug!(len, bytes, zero, "Allocated heap-backed handle");

        Ok(Self {
            kind: HandleKind::Heap {
                heap: HeapRef::clone(heap),
                block: raw.cast(),
                len,
            },
            metadata: GuardMetadata::new("memory_handle").with_size(bytes),
        })
    }

    fn checked_bytes(len: Size) -> MemoryResult<Size> {
        byte_len_of::<T>(len).ok_or(MemoryError::Overflow {
            elements: len,
            element_size: mem::size_of::<T>(),
        })
    }

    /// Number of elements in the view
    #[inline]
    pub fn len(&self) -> Size {
        match &self.kind {
            HandleKind::Empty => 0,
            HandleKind::Pooled { len, .. } | HandleKind::Heap { len, .. } => *len,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the view in bytes
    #[inline]
    pub fn byte_len(&self) -> Size {
        self.len() * mem::size_of::<T>()
    }

    #[inline]
    pub fn handle_type(&self) -> HandleType {
        match &self.kind {
            HandleKind::Empty => HandleType::None,
            HandleKind::Pooled { .. } => HandleType::Pool,
            HandleKind::Heap { .. } => HandleType::Heap,
        }
    }

    /// Contiguous view of exactly `len()` elements
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match &self.kind {
            HandleKind::Empty => &[],
            HandleKind::Pooled { array, len, .. } => &array[..*len],
            // SAFETY: the block holds `len` elements, is aligned for T and is
            // owned by this handle for the lifetime of the borrow
            HandleKind::Heap { block, len, .. } => unsafe {
                std::slice::from_raw_parts(block.as_ptr(), *len)
            },
        }
    }

    /// Mutable contiguous view of exactly `len()` elements
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.kind {
            HandleKind::Empty => &mut [],
            HandleKind::Pooled { array, len, .. } => &mut array[..*len],
            // SAFETY: as in `as_slice`, and the borrow is exclusive
            HandleKind::Heap { block, len, .. } => unsafe {
                std::slice::from_raw_parts_mut(block.as_ptr(), *len)
            },
        }
    }

    /// Pin the element at `index` and return its stable address
    pub fn pin(&mut self, index: Size) -> MemoryResult<MemoryPin<'_, T>> {
        let len = self.len();
        if index >= len {
            return Err(MemoryError::IndexOutOfRange { index, len });
        }

        let source = self.handle_type();
        let element = &mut self.as_mut_slice()[index];
        Ok(MemoryPin::new(NonNull::from(element), index, source))
    }

    /// Replace the block with one of `new_len` elements
    ///
    /// The common prefix is kept and any new tail is zeroed. Resizing to zero
    /// releases the block. On error the handle is unchanged, except when the
    /// heap hands back a misaligned block: that block is freed and the handle
    /// is left empty.
    pub fn resize(&mut self, new_len: Size) -> MemoryResult<()> {
        if new_len == self.len() {
            return Ok(());
        }
        if new_len == 0 {
            return self.release_block();
        }
        let new_bytes = Self::checked_bytes(new_len)?;

        match &mut self.kind {
            HandleKind::Empty => {
                return Err(MemoryError::NotSupported("empty handle has no backing source"))
            }
            HandleKind::Pooled { pool, array, len } => {
                let keep = (*len).min(new_len);
                if new_len <= array.len() {
                    array[keep..new_len].fill(T::ZERO);
                } else {
                    let mut replacement = pool.rent(new_len, false)?;
                    if replacement.len() < new_len {
                        pool.release(replacement);
                        return Err(MemoryError::InvalidArgument(
                            "pool returned an array shorter than requested",
                        ));
                    }
                    replacement[..keep].copy_from_slice(&array[..keep]);
                    replacement[keep..new_len].fill(T::ZERO);
                    pool.release(mem::replace(array, replacement));
                }
                *len = new_len;
            }
            HandleKind::Heap { heap, block, len } => {
                let resized = heap.resize(block.cast(), new_len, mem::size_of::<T>(), true)?;
                if (resized.as_ptr() as Address) % mem::align_of::<T>() != 0 {
                    // The old block is gone once the heap has resized it
                    heap.free(resized);
                    self.kind = HandleKind::Empty;
                    self.metadata.size_bytes = 0;
                    return Err(MemoryError::InvalidArgument(
                        "heap returned a block misaligned for the element type",
                    ));
                }
                *block = resized.cast();
                *len = new_len;
            }
        }

        self.metadata.size_bytes = new_bytes;
        debug!(len = new_len, handle_type = ?self.handle_type(), "Resized handle");
        Ok(())
    }

    /// Release the block now
    ///
    /// Consumes the handle, so it cannot be disposed twice.
    pub fn dispose(mut self) -> MemoryResult<()> {
        self.release_block()
    }

    fn release_block(&mut self) -> MemoryResult<()> {
        match mem::replace(&mut self.kind, HandleKind::Empty) {
            HandleKind::Empty => Ok(()),
            HandleKind::Pooled { pool, array, len } => {
                pool.release(array);
                debug!(len, "Returned pool-backed handle");
                Ok(())
            }
            HandleKind::Heap { heap, block, len } => {
                let address = block.as_ptr() as Address;
                if heap.free(block.cast()) {
                    debug!(len, "Freed heap-backed handle");
                    Ok(())
                } else {
                    Err(MemoryError::FreeFailed { address })
                }
            }
        }
    }

    /// Identity of the backing block
    fn identity(&self) -> (HandleType, Size, Address) {
        let address = match &self.kind {
            HandleKind::Empty => 0,
            HandleKind::Pooled { array, .. } => array.as_ptr() as Address,
            HandleKind::Heap { block, .. } => block.as_ptr() as Address,
        };
        (self.handle_type(), self.len(), address)
    }
}

impl<T: Element> Default for MemoryHandle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Element> Guard for MemoryHandle<T> {
    fn resource_type(&self) -> &'static str {
        "memory_handle"
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        !matches!(self.kind, HandleKind::Empty)
    }

    fn release(&mut self) -> MemoryResult<()> {
        self.release_block()
    }
}

impl<T: Element> GuardDrop for MemoryHandle<T> {}

impl<T: Element> Drop for MemoryHandle<T> {
    fn drop(&mut self) {
        self.on_drop();
    }
}

impl<T: Element> PartialEq for MemoryHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl<T: Element> Eq for MemoryHandle<T> {}

impl<T: Element> Hash for MemoryHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl<T: Element> fmt::Debug for MemoryHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (handle_type, len, address) = self.identity();
        f.debug_struct("MemoryHandle")
            .field("type", &handle_type)
            .field("len", &len)
            .field("address", &format_args!("0x{:x}", address))
            .finish()
    }
}

// Surfaced so callers can size raw interop buffers without a handle
#[inline]
pub fn handle_byte_size<T: Element>(len: Size) -> MemoryResult<Size> {
    block_size(len, mem::size_of::<T>())
}
