/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use super::types::{Address, Size};
use miette::Diagnostic;
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
///
/// Variants fall into four groups: exhaustion (`OutOfMemory`), contract
/// violations (ranges, overflow, bad arguments), unsupported operations and
/// use after release. None of them are retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MemoryError {
    #[error("Out of memory: requested {requested} bytes")]
    #[diagnostic(
        code(memory::out_of_memory),
        help("The allocator could not satisfy the request. Release unused blocks or request less.")
    )]
    OutOfMemory { requested: Size },

    #[error("Range out of bounds: offset {offset} + length {length} exceeds {bound}")]
    #[diagnostic(
        code(memory::out_of_range),
        help("Windows must satisfy offset + length <= the length of the underlying block.")
    )]
    OutOfRange {
        offset: Size,
        length: Size,
        bound: Size,
    },

    #[error("Index {index} out of range for length {len}")]
    #[diagnostic(code(memory::index_out_of_range))]
    IndexOutOfRange { index: Size, len: Size },

    #[error("Insufficient space: requested {requested} elements, {remaining} remaining")]
    #[diagnostic(
        code(memory::insufficient_space),
        help("Cursors never truncate. Check remaining() before advancing or appending.")
    )]
    InsufficientSpace { requested: Size, remaining: Size },

    #[error("Size overflow: {elements} elements of {element_size} bytes")]
    #[diagnostic(code(memory::overflow))]
    Overflow { elements: Size, element_size: Size },

    #[error("Invalid argument: {0}")]
    #[diagnostic(code(memory::invalid_argument))]
    InvalidArgument(&'static str),

    #[error("Operation not supported: {0}")]
    #[diagnostic(
        code(memory::not_supported),
        help("Fall back to allocate + copy + free.")
    )]
    NotSupported(&'static str),

    #[error("{0} has already been released")]
    #[diagnostic(
        code(memory::disposed),
        help("The resource was disposed. Keep it alive for as long as it is used.")
    )]
    Disposed(&'static str),

    #[error("Heap failed to free block at 0x{address:x}")]
    #[diagnostic(code(memory::free_failed))]
    FreeFailed { address: Address },
}

impl MemoryError {
    /// Range error for a window that does not fit its bound
    #[inline]
    pub(crate) fn out_of_range(offset: Size, length: Size, bound: Size) -> Self {
        MemoryError::OutOfRange {
            offset,
            length,
            bound,
        }
    }

    /// Whether this error is a caller contract violation
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            MemoryError::OutOfRange { .. }
                | MemoryError::IndexOutOfRange { .. }
                | MemoryError::InsufficientSpace { .. }
                | MemoryError::Overflow { .. }
                | MemoryError::InvalidArgument(_)
        )
    }
}
