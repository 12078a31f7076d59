/*!
 * System Heap
 * Reference unmanaged heap backed by the Rust global allocator
 */

use super::flags::{HeapConfig, HeapCreationFlags};
use super::{block_size, UnmanagedHeap};
use crate::core::errors::{MemoryError, MemoryResult};
use crate::core::limits::HEAP_BLOCK_ALIGNMENT;
use crate::core::types::{Address, Size};
use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::alloc::{self, Layout};
use std::ptr::NonNull;
use tracing::{debug, warn};

/// Heap statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeapStats {
    pub live_blocks: usize,
    pub live_bytes: Size,
}

/// Unmanaged heap over `std::alloc`
///
/// Every live block is tracked with its byte size, which lets `free` reject
/// unknown or already-freed blocks instead of corrupting the allocator.
/// Blocks still live when the heap is dropped are released and reported.
pub struct SystemHeap {
    flags: HeapCreationFlags,
    blocks: DashMap<Address, Size, RandomState>,
    serializer: Option<Mutex<()>>,
}

impl SystemHeap {
    /// Create a heap from a configuration
    pub fn new(config: HeapConfig) -> Self {
        let flags = config.effective_flags();
        let serializer = flags
            .contains(HeapCreationFlags::USE_SYNCHRONIZATION)
            .then(|| Mutex::new(()));

        debug!(flags = %flags, "System heap created");

        Self {
            flags,
            blocks: DashMap::with_hasher(RandomState::new()),
            serializer,
        }
    }

    /// Get heap statistics
    pub fn stats(&self) -> HeapStats {
        let mut stats = HeapStats::default();
        for entry in self.blocks.iter() {
            stats.live_blocks += 1;
            stats.live_bytes += *entry.value();
        }
        stats
    }

    #[inline]
    fn serialize(&self) -> Option<MutexGuard<'_, ()>> {
        self.serializer.as_ref().map(|lock| lock.lock())
    }

    #[inline]
    fn zero_requested(&self, zero: bool) -> bool {
        zero || self.flags.contains(HeapCreationFlags::GLOBAL_ZERO)
    }

    fn layout_for(bytes: Size) -> MemoryResult<Layout> {
        if bytes == 0 {
            return Err(MemoryError::InvalidArgument("zero-byte heap block"));
        }
        Layout::from_size_align(bytes, HEAP_BLOCK_ALIGNMENT).map_err(|_| MemoryError::Overflow {
            elements: bytes,
            element_size: 1,
        })
    }
}

impl Default for SystemHeap {
    fn default() -> Self {
        Self::new(HeapConfig::default())
    }
}

impl UnmanagedHeap for SystemHeap {
    fn creation_flags(&self) -> HeapCreationFlags {
        self.flags
    }

    fn alloc(&self, elements: Size, element_size: Size, zero: bool) -> MemoryResult<NonNull<u8>> {
        let bytes = block_size(elements, element_size)?;
        let layout = Self::layout_for(bytes)?;
        let zero = self.zero_requested(zero);

        let _serial = self.serialize();

        // SAFETY: layout has a non-zero size
        let raw = unsafe {
            if zero {
                alloc::alloc_zeroed(layout)
            } else {
                alloc::alloc(layout)
            }
        };
        let block = NonNull::new(raw).ok_or(MemoryError::OutOfMemory { requested: bytes })?;
        self.blocks.insert(block.as_ptr() as Address, bytes);

        debug!(
            bytes,
            zero,
            address = format!("0x{:x}", block.as_ptr() as Address),
            "Allocated heap block"
        );
        Ok(block)
    }

    fn resize(
        &self,
        block: NonNull<u8>,
        elements: Size,
        element_size: Size,
        zero: bool,
    ) -> MemoryResult<NonNull<u8>> {
        if !self.flags.contains(HeapCreationFlags::SUPPORTS_REALLOC) {
            return Err(MemoryError::NotSupported("heap cannot resize blocks"));
        }

        let new_bytes = block_size(elements, element_size)?;
        Self::layout_for(new_bytes)?;
        let zero = self.zero_requested(zero);

        let _serial = self.serialize();

        let address = block.as_ptr() as Address;
        // Unregister before realloc frees the old address, so a concurrent
        // alloc landing there keeps its own entry
        let Some((_, old_bytes)) = self.blocks.remove(&address) else {
            return Err(MemoryError::InvalidArgument("block is not owned by this heap"));
        };
        let old_layout = match Self::layout_for(old_bytes) {
            Ok(layout) => layout,
            Err(e) => {
                self.blocks.insert(address, old_bytes);
                return Err(e);
            }
        };

        // SAFETY: block was allocated by this heap with old_layout, and
        // new_bytes is non-zero and fits a valid layout at the same alignment
        let raw = unsafe { alloc::realloc(block.as_ptr(), old_layout, new_bytes) };
        let Some(resized) = NonNull::new(raw) else {
            // realloc leaves the original block in place on failure
            self.blocks.insert(address, old_bytes);
            return Err(MemoryError::OutOfMemory {
                requested: new_bytes,
            });
        };

        if zero && new_bytes > old_bytes {
            // SAFETY: [old_bytes, new_bytes) lies inside the resized block
            unsafe {
                resized
                    .as_ptr()
                    .add(old_bytes)
                    .write_bytes(0, new_bytes - old_bytes);
            }
        }

        self.blocks.insert(resized.as_ptr() as Address, new_bytes);

        debug!(
            old_bytes,
            new_bytes,
            moved = resized != block,
            "Resized heap block"
        );
        Ok(resized)
    }

    fn free(&self, block: NonNull<u8>) -> bool {
        let _serial = self.serialize();

        let address = block.as_ptr() as Address;
        let Some((_, bytes)) = self.blocks.remove(&address) else {
            warn!(
                address = format!("0x{:x}", address),
                "Free of a block this heap does not own"
            );
            return false;
        };

        match Self::layout_for(bytes) {
            Ok(layout) => {
                // SAFETY: block was allocated by this heap with this layout and
                // has just been removed from the live set
                unsafe { alloc::dealloc(block.as_ptr(), layout) };
                debug!(bytes, "Freed heap block");
                true
            }
            Err(_) => false,
        }
    }
}

impl Drop for SystemHeap {
    fn drop(&mut self) {
        let leaked = self.stats();
        if leaked.live_blocks == 0 {
            return;
        }

        warn!(
            blocks = leaked.live_blocks,
            bytes = leaked.live_bytes,
            "System heap dropped with live blocks, releasing them"
        );

        for entry in self.blocks.iter() {
            if let Ok(layout) = Self::layout_for(*entry.value()) {
                // SAFETY: every tracked block was allocated with this layout
                unsafe { alloc::dealloc(*entry.key() as *mut u8, layout) };
            }
        }
        self.blocks.clear();
    }
}
