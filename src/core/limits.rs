/*!
 * System Limits and Constants
 *
 * Centralized location for pool bucket bounds, heap alignment and other
 * magic numbers used across the memory subsystem.
 */

// =============================================================================
// ARRAY POOL
// =============================================================================

/// Smallest pooled array length, in elements
/// Requests below this are rounded up to the first bucket
pub const MIN_POOLED_ARRAY_LENGTH: usize = 16;

/// Default largest pooled array length (1M elements)
/// Larger requests get an exact-size array that is dropped on release
pub const DEFAULT_MAX_POOLED_ARRAY_LENGTH: usize = 1024 * 1024;

/// Default number of arrays retained per bucket
/// [PERF] Bounds idle memory held by a pool
pub const DEFAULT_ARRAYS_PER_BUCKET: usize = 32;

// =============================================================================
// UNMANAGED HEAP
// =============================================================================

/// Alignment of every block handed out by the system heap (16 bytes)
/// Covers the alignment of every `Element` type, including `u128`
pub const HEAP_BLOCK_ALIGNMENT: usize = 16;
