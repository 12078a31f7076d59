/*!
 * Pin Tokens
 * Stable addresses handed to code outside the borrow checker
 */

use super::handle::HandleType;
use crate::core::types::{Address, Size};
use std::marker::PhantomData;
use std::ptr::NonNull;
use tracing::trace;

/// A stable element address plus the token bounding its validity
///
/// Pool arrays and heap blocks never move while their owner is alive, so
/// pinning only computes the address. The token mutably borrows its owner:
/// the address stays valid until the token is unpinned or dropped, and the
/// owner cannot be used, resized or released in the meantime.
#[must_use = "the address is only valid while the pin is held"]
pub struct MemoryPin<'a, T> {
    ptr: NonNull<T>,
    index: Size,
    source: HandleType,
    _borrow: PhantomData<&'a mut T>,
}

impl<'a, T> MemoryPin<'a, T> {
    pub(crate) fn new(ptr: NonNull<T>, index: Size, source: HandleType) -> Self {
        trace!(index, source = ?source, "Pinned element");
        Self {
            ptr,
            index,
            source,
            _borrow: PhantomData,
        }
    }

    /// Raw pointer to the pinned element
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Pinned address as an integer
    #[inline]
    pub fn address(&self) -> Address {
        self.ptr.as_ptr() as Address
    }

    /// Element index the pin points at
    #[inline]
    pub fn index(&self) -> Size {
        self.index
    }

    /// Kind of storage behind the pin
    #[inline]
    pub fn source(&self) -> HandleType {
        self.source
    }

    /// Release the pin
    #[inline]
    pub fn unpin(self) {}
}

impl<T> Drop for MemoryPin<'_, T> {
    fn drop(&mut self) {
        trace!(index = self.index, "Unpinned element");
    }
}

impl<T> std::fmt::Debug for MemoryPin<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPin")
            .field("address", &format_args!("0x{:x}", self.address()))
            .field("index", &self.index)
            .field("source", &self.source)
            .finish()
    }
}
