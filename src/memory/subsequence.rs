/*!
 * Subsequences
 * Non-owning offset + length windows onto a memory handle
 */

use super::handle::MemoryHandle;
use crate::core::errors::{MemoryError, MemoryResult};
use crate::core::types::{Element, Size};

/// Validate a window and return its end offset
#[inline]
fn window_end(offset: Size, len: Size, bound: Size) -> MemoryResult<Size> {
    offset
        .checked_add(len)
        .filter(|end| *end <= bound)
        .ok_or_else(|| MemoryError::out_of_range(offset, len, bound))
}

/// Compose a relative window inside `(offset, len)`, clamping the length
#[inline]
fn compose(offset: Size, len: Size, relative: Size, new_len: Size) -> MemoryResult<(Size, Size)> {
    if relative > len {
        return Err(MemoryError::out_of_range(relative, 0, len));
    }
    let start = offset
        .checked_add(relative)
        .ok_or_else(|| MemoryError::out_of_range(offset, relative, Size::MAX))?;
    Ok((start, new_len.min(len - relative)))
}

/// Read-only window onto a handle
///
/// The view is recomputed from the handle on every access.
#[derive(Debug)]
pub struct SubSequence<'a, T: Element> {
    handle: &'a MemoryHandle<T>,
    offset: Size,
    len: Size,
}

impl<T: Element> Clone for SubSequence<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Element> Copy for SubSequence<'_, T> {}

impl<'a, T: Element> SubSequence<'a, T> {
    /// Create a window, failing with `OutOfRange` if it does not fit
    pub fn new(handle: &'a MemoryHandle<T>, offset: Size, len: Size) -> MemoryResult<Self> {
        window_end(offset, len, handle.len())?;
        Ok(Self {
            handle,
            offset,
            len,
        })
    }

    /// Window covering the whole handle
    pub fn whole(handle: &'a MemoryHandle<T>) -> Self {
        Self {
            handle,
            offset: 0,
            len: handle.len(),
        }
    }

    #[inline]
    pub fn offset(&self) -> Size {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> Size {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn handle(&self) -> &'a MemoryHandle<T> {
        self.handle
    }

    /// Elements in the window
    pub fn as_slice(&self) -> &'a [T] {
        if self.len == 0 {
            return &[];
        }
        &self.handle.as_slice()[self.offset..self.offset + self.len]
    }

    /// Narrow the window; `len` is clamped to the space after `relative`
    pub fn slice(&self, relative: Size, len: Size) -> MemoryResult<Self> {
        let (offset, len) = compose(self.offset, self.len, relative, len)?;
        Ok(Self {
            handle: self.handle,
            offset,
            len,
        })
    }

    /// Narrow the window to everything after `relative`
    pub fn slice_from(&self, relative: Size) -> MemoryResult<Self> {
        self.slice(relative, Size::MAX)
    }

    /// Copy the window into a new vector
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

/// Read-write window onto a handle
#[derive(Debug)]
pub struct SubSequenceMut<'a, T: Element> {
    handle: &'a mut MemoryHandle<T>,
    offset: Size,
    len: Size,
}

impl<'a, T: Element> SubSequenceMut<'a, T> {
    /// Create a window, failing with `OutOfRange` if it does not fit
    pub fn new(handle: &'a mut MemoryHandle<T>, offset: Size, len: Size) -> MemoryResult<Self> {
        window_end(offset, len, handle.len())?;
        Ok(Self {
            handle,
            offset,
            len,
        })
    }

    #[inline]
    pub fn offset(&self) -> Size {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> Size {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[T] {
        if self.len == 0 {
            return &[];
        }
        &self.handle.as_slice()[self.offset..self.offset + self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.len == 0 {
            return &mut [];
        }
        &mut self.handle.as_mut_slice()[self.offset..self.offset + self.len]
    }

    /// Read-only view of the same window
    pub fn as_sub_sequence(&self) -> SubSequence<'_, T> {
        SubSequence {
            handle: &*self.handle,
            offset: self.offset,
            len: self.len,
        }
    }

    /// Narrow the window, reborrowing the handle
    pub fn slice(&mut self, relative: Size, len: Size) -> MemoryResult<SubSequenceMut<'_, T>> {
        let (offset, len) = compose(self.offset, self.len, relative, len)?;
        Ok(SubSequenceMut {
            handle: &mut *self.handle,
            offset,
            len,
        })
    }

    pub fn slice_from(&mut self, relative: Size) -> MemoryResult<SubSequenceMut<'_, T>> {
        self.slice(relative, Size::MAX)
    }

    /// Narrow the window, keeping the original borrow
    pub fn into_slice(self, relative: Size, len: Size) -> MemoryResult<Self> {
        let (offset, len) = compose(self.offset, self.len, relative, len)?;
        Ok(Self {
            handle: self.handle,
            offset,
            len,
        })
    }

    /// Fill the window with `value`
    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }
}
