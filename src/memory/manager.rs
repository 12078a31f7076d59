/*!
 * Buffer Manager
 * Interop surface exposing a handle's memory and element pins
 */

use super::handle::MemoryHandle;
use super::pin::MemoryPin;
use crate::core::errors::{MemoryError, MemoryResult};
use crate::core::guard::{Guard, GuardDrop, GuardMetadata};
use crate::core::types::{Element, Size};
use tracing::debug;

const RESOURCE: &str = "buffer manager";

/// Exposes a contiguous view and element pins to interop consumers
///
/// Releasing the manager (explicitly or on drop) ends access; every
/// accessor then fails with `Disposed`.
pub trait BufferManager<T: Element>: Guard {
    /// Writable view of the managed memory
    fn memory(&mut self) -> MemoryResult<&mut [T]>;

    /// Pin the element at `index`; drop or `unpin` the token to unpin
    fn pin(&mut self, index: Size) -> MemoryResult<MemoryPin<'_, T>>;
}

enum ManagedHandle<'a, T: Element> {
    Owned(MemoryHandle<T>),
    Borrowed(&'a mut MemoryHandle<T>),
}

impl<T: Element> ManagedHandle<'_, T> {
    fn handle_mut(&mut self) -> &mut MemoryHandle<T> {
        match self {
            ManagedHandle::Owned(handle) => handle,
            ManagedHandle::Borrowed(handle) => &mut **handle,
        }
    }
}

/// `BufferManager` over a [`MemoryHandle`]
///
/// An owning manager disposes the handle on release. A borrowing manager
/// only ends its own access and leaves the handle to its owner.
pub struct HandleBufferManager<'a, T: Element> {
    slot: Option<ManagedHandle<'a, T>>,
    metadata: GuardMetadata,
}

impl<T: Element> HandleBufferManager<'static, T> {
    /// Take ownership of `handle`
    pub fn owned(handle: MemoryHandle<T>) -> Self {
        let metadata = Self::metadata_for(&handle);
        Self {
            slot: Some(ManagedHandle::Owned(handle)),
            metadata,
        }
    }
}

impl<'a, T: Element> HandleBufferManager<'a, T> {
    /// Borrow `handle` for the manager's lifetime
    pub fn borrowed(handle: &'a mut MemoryHandle<T>) -> Self {
        let metadata = Self::metadata_for(handle);
        Self {
            slot: Some(ManagedHandle::Borrowed(handle)),
            metadata,
        }
    }

    fn metadata_for(handle: &MemoryHandle<T>) -> GuardMetadata {
        GuardMetadata::new("buffer_manager").with_size(handle.byte_len())
    }

    /// Whether release disposes the handle
    pub fn owns_handle(&self) -> bool {
        matches!(self.slot, Some(ManagedHandle::Owned(_)))
    }

    /// The managed handle
    pub fn handle_mut(&mut self) -> MemoryResult<&mut MemoryHandle<T>> {
        self.slot
            .as_mut()
            .map(ManagedHandle::handle_mut)
            .ok_or(MemoryError::Disposed(RESOURCE))
    }
}

impl<T: Element> Guard for HandleBufferManager<'_, T> {
    fn resource_type(&self) -> &'static str {
        "buffer_manager"
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.slot.is_some()
    }

    fn release(&mut self) -> MemoryResult<()> {
        match self.slot.take() {
            Some(ManagedHandle::Owned(handle)) => {
                debug!(len = handle.len(), "Buffer manager disposing owned handle");
                handle.dispose()
            }
            Some(ManagedHandle::Borrowed(_)) | None => Ok(()),
        }
    }
}

impl<T: Element> GuardDrop for HandleBufferManager<'_, T> {}

impl<T: Element> Drop for HandleBufferManager<'_, T> {
    fn drop(&mut self) {
        self.on_drop();
    }
}

impl<T: Element> BufferManager<T> for HandleBufferManager<'_, T> {
    fn memory(&mut self) -> MemoryResult<&mut [T]> {
        Ok(self.handle_mut()?.as_mut_slice())
    }

    fn pin(&mut self, index: Size) -> MemoryResult<MemoryPin<'_, T>> {
        self.handle_mut()?.pin(index)
    }
}
