/*!
 * Memory Module
 * Handles, pools, heaps and the views built on top of them
 */

pub mod cursor;
pub mod handle;
pub mod heap;
pub mod manager;
pub mod ops;
pub mod pin;
pub mod pool;
pub mod pooled_buffer;
pub mod subsequence;

// Re-export for convenience
pub use cursor::{ForwardOnlyReader, ForwardOnlyWriter};
pub use handle::{handle_byte_size, HandleType, MemoryHandle};
pub use heap::{
    HeapConfig, HeapCreationFlags, HeapExt, HeapRef, HeapStats, SystemHeap, UnmanagedHeap,
};
pub use manager::{BufferManager, HandleBufferManager};
pub use pin::MemoryPin;
pub use pool::{ArrayPool, BucketStats, PoolConfig, PoolRef, PoolStats, SharedArrayPool};
pub use pooled_buffer::PooledBuffer;
pub use subsequence::{SubSequence, SubSequenceMut};
