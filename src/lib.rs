/*!
 * memhandle
 *
 * Uniform handles over pooled arrays and unmanaged heap blocks, with
 * bounds-checked windows, forward-only cursors and interop pins.
 *
 * # Example
 *
 * ```
 * use memhandle::{MemoryHandle, PoolRef, SharedArrayPool, SubSequence};
 *
 * let pool: PoolRef<u8> = SharedArrayPool::shared(Default::default());
 * let mut handle = MemoryHandle::rent(&pool, 5, true)?;
 * handle.as_mut_slice().copy_from_slice(b"hello");
 *
 * let window = SubSequence::whole(&handle).slice(1, 3)?;
 * assert_eq!(window.as_slice(), b"ell");
 * # Ok::<(), memhandle::MemoryError>(())
 * ```
 */

pub mod core;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::{Element, Guard, GuardDrop, MemoryError, MemoryResult};
pub use memory::{
    ArrayPool, BufferManager, ForwardOnlyReader, ForwardOnlyWriter, HandleBufferManager,
    HandleType, HeapConfig, HeapCreationFlags, HeapExt, HeapRef, MemoryHandle, MemoryPin,
    PoolConfig, PoolRef, PooledBuffer, SharedArrayPool, SubSequence, SubSequenceMut, SystemHeap,
    UnmanagedHeap,
};
pub use monitoring::init_tracing;
