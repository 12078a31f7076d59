/*!
 * Forward-Only Reader
 */

use crate::core::errors::{MemoryError, MemoryResult};
use crate::core::types::Size;

/// Consumes a fixed range from front to back
#[derive(Debug, Clone)]
pub struct ForwardOnlyReader<'a, T> {
    buffer: &'a [T],
    position: Size,
}

impl<'a, T> ForwardOnlyReader<'a, T> {
    pub fn new(buffer: &'a [T]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Unread part of the range
    #[inline]
    pub fn window(&self) -> &'a [T] {
        &self.buffer[self.position..]
    }

    #[inline]
    pub fn remaining(&self) -> Size {
        self.buffer.len() - self.position
    }

    #[inline]
    pub fn position(&self) -> Size {
        self.position
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Skip `count` elements, all or nothing
    pub fn advance(&mut self, count: Size) -> MemoryResult<()> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(MemoryError::InsufficientSpace {
                requested: count,
                remaining,
            });
        }
        self.position += count;
        Ok(())
    }

    /// Rewind to the start of the range
    #[inline]
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

impl<T: Copy> ForwardOnlyReader<'_, T> {
    /// Copy the next `dst.len()` elements into `dst` and advance past them
    pub fn read_into(&mut self, dst: &mut [T]) -> MemoryResult<()> {
        let count = dst.len();
        let remaining = self.remaining();
        if count > remaining {
            return Err(MemoryError::InsufficientSpace {
                requested: count,
                remaining,
            });
        }
        dst.copy_from_slice(&self.buffer[self.position..self.position + count]);
        self.position += count;
        Ok(())
    }
}
