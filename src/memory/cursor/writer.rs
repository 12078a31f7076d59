/*!
 * Forward-Only Writer
 */

use crate::core::errors::{MemoryError, MemoryResult};
use crate::core::types::Size;
use std::fmt;
use std::io;

/// Produces into a fixed range from front to back
///
/// A failed append leaves the written length unchanged.
#[derive(Debug)]
pub struct ForwardOnlyWriter<'a, T> {
    buffer: &'a mut [T],
    written: Size,
}

impl<'a, T> ForwardOnlyWriter<'a, T> {
    pub fn new(buffer: &'a mut [T]) -> Self {
        Self { buffer, written: 0 }
    }

    /// Number of elements written so far
    #[inline]
    pub fn written(&self) -> Size {
        self.written
    }

    #[inline]
    pub fn remaining(&self) -> Size {
        self.buffer.len() - self.written
    }

    #[inline]
    pub fn capacity(&self) -> Size {
        self.buffer.len()
    }

    /// Unwritten tail, for callers that write out of band and then `advance`
    #[inline]
    pub fn remaining_mut(&mut self) -> &mut [T] {
        &mut self.buffer[self.written..]
    }

    /// Written prefix of the range
    #[inline]
    pub fn materialize(&self) -> &[T] {
        &self.buffer[..self.written]
    }

    /// Count `count` elements written out of band
    pub fn advance(&mut self, count: Size) -> MemoryResult<()> {
        self.check_space(count)?;
        self.written += count;
        Ok(())
    }

    /// Forget everything written
    #[inline]
    pub fn reset(&mut self) {
        self.written = 0;
    }

    #[inline]
    fn check_space(&self, count: Size) -> MemoryResult<()> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(MemoryError::InsufficientSpace {
                requested: count,
                remaining,
            });
        }
        Ok(())
    }
}

impl<T: Copy> ForwardOnlyWriter<'_, T> {
    /// Append a whole sequence or nothing
    pub fn append(&mut self, data: &[T]) -> MemoryResult<()> {
        self.check_space(data.len())?;
        self.buffer[self.written..self.written + data.len()].copy_from_slice(data);
        self.written += data.len();
        Ok(())
    }

    /// Append a single element
    pub fn append_one(&mut self, value: T) -> MemoryResult<()> {
        self.check_space(1)?;
        self.buffer[self.written] = value;
        self.written += 1;
        Ok(())
    }
}

impl fmt::Write for ForwardOnlyWriter<'_, char> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let needed = s.chars().count();
        if needed > self.remaining() {
            return Err(fmt::Error);
        }
        for (slot, c) in self.buffer[self.written..].iter_mut().zip(s.chars()) {
            *slot = c;
        }
        self.written += needed;
        Ok(())
    }
}

/// Assembled text of a character writer
impl fmt::Display for ForwardOnlyWriter<'_, char> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.materialize()
            .iter()
            .try_for_each(|c| fmt::Write::write_char(f, *c))
    }
}

impl io::Write for ForwardOnlyWriter<'_, u8> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.append(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::WriteZero, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
