/*!
 * Heap Contract Tests
 * Handle behavior against scripted heaps
 */

use memhandle::memory::ops;
use memhandle::{
    Guard, HandleType, HeapConfig, HeapCreationFlags, HeapRef, MemoryError, MemoryHandle,
    MemoryResult, SystemHeap, UnmanagedHeap,
};
use mockall::mock;
use pretty_assertions::assert_eq;
use std::ptr::NonNull;
use std::sync::Arc;

mock! {
    pub Heap {}

    impl UnmanagedHeap for Heap {
        fn creation_flags(&self) -> HeapCreationFlags;
        fn alloc(&self, elements: usize, element_size: usize, zero: bool) -> MemoryResult<NonNull<u8>>;
        fn resize(
            &self,
            block: NonNull<u8>,
            elements: usize,
            element_size: usize,
            zero: bool,
        ) -> MemoryResult<NonNull<u8>>;
        fn free(&self, block: NonNull<u8>) -> bool;
    }
}

/// Heap that hands out `backing` for a single allocation
fn heap_over(backing: &mut [u64], free_ok: bool) -> MockHeap {
    let address = backing.as_mut_ptr() as usize;
    let mut heap = MockHeap::new();
    heap.expect_alloc()
        .times(1)
        .returning(move |_, _, _| Ok(NonNull::new(address as *mut u8).unwrap()));
    heap.expect_free()
        .withf(move |block| block.as_ptr() as usize == address)
        .times(1)
        .return_const(free_ok);
    heap
}

#[test]
fn test_alloc_forwards_element_geometry() {
    let mut backing = vec![0u64; 2];
    let address = backing.as_mut_ptr() as usize;

    let mut mock = MockHeap::new();
    mock.expect_alloc()
        .withf(|elements, element_size, zero| *elements == 4 && *element_size == 4 && *zero)
        .times(1)
        .returning(move |_, _, _| Ok(NonNull::new(address as *mut u8).unwrap()));
    mock.expect_free().times(1).return_const(true);

    let heap: HeapRef = Arc::new(mock);
    let handle = MemoryHandle::<u32>::alloc(&heap, 4).unwrap();
    assert_eq!(handle.as_slice(), &[0, 0, 0, 0]);
    assert_eq!(handle.as_slice().as_ptr() as usize, address);
}

#[test]
fn test_alloc_failure_propagates() {
    let mut mock = MockHeap::new();
    mock.expect_alloc()
        .returning(|elements, size, _| Err(MemoryError::OutOfMemory { requested: elements * size }));
    mock.expect_free().never();

    let heap: HeapRef = Arc::new(mock);
    let result = MemoryHandle::<u16>::alloc(&heap, 32);
    assert_eq!(result.err(), Some(MemoryError::OutOfMemory { requested: 64 }));
}

#[test]
fn test_failed_free_is_reported() {
    let mut backing = vec![0u64; 4];
    let address = backing.as_mut_ptr() as usize;
    let heap: HeapRef = Arc::new(heap_over(&mut backing, false));

    let handle = MemoryHandle::<u8>::alloc(&heap, 16).unwrap();
    assert_eq!(handle.dispose(), Err(MemoryError::FreeFailed { address }));
}

#[test]
fn test_block_freed_exactly_once() {
    let mut backing = vec![0u64; 4];
    let heap: HeapRef = Arc::new(heap_over(&mut backing, true));

    let mut handle = MemoryHandle::<u32>::alloc(&heap, 8).unwrap();
    handle.release().unwrap();
    handle.release().unwrap();
    drop(handle);
}

#[test]
fn test_unsupported_resize_leaves_handle() {
    let mut backing = vec![0u64; 4];
    let address = backing.as_mut_ptr() as usize;
    let mut mock = heap_over(&mut backing, true);
    mock.expect_resize()
        .times(1)
        .returning(|_, _, _, _| Err(MemoryError::NotSupported("realloc")));

    let heap: HeapRef = Arc::new(mock);
    let mut handle = MemoryHandle::<u8>::alloc(&heap, 32).unwrap();

    assert_eq!(handle.resize(64), Err(MemoryError::NotSupported("realloc")));
    assert_eq!(handle.len(), 32);
    assert_eq!(handle.as_slice().as_ptr() as usize, address);
}

#[test]
fn test_resize_or_copy_moves_to_fallback_heap() {
    let mut backing = vec![0u64; 1];
    let mut mock = heap_over(&mut backing, true);
    mock.expect_resize()
        .returning(|_, _, _, _| Err(MemoryError::NotSupported("realloc")));
    let fixed: HeapRef = Arc::new(mock);
    let system: HeapRef = Arc::new(SystemHeap::default());

    let mut handle = MemoryHandle::<u8>::alloc(&fixed, 8).unwrap();
    handle.as_mut_slice().copy_from_slice(b"8 bytes!");

    ops::resize_or_copy(&mut handle, &system, 12).unwrap();
    assert_eq!(handle.handle_type(), HandleType::Heap);
    assert_eq!(handle.as_slice(), b"8 bytes!\0\0\0\0");
}

#[test]
fn test_system_heap_flags() {
    let shared = SystemHeap::new(HeapConfig::shared());
    assert!(shared.creation_flags().contains(HeapCreationFlags::IS_SHARED));
    assert!(!shared
        .creation_flags()
        .contains(HeapCreationFlags::USE_SYNCHRONIZATION));

    let private = SystemHeap::new(HeapConfig::private_synchronized());
    assert!(private
        .creation_flags()
        .contains(HeapCreationFlags::USE_SYNCHRONIZATION));
}

#[test]
fn test_global_zero_heap_zeroes_uninit_allocations() {
    let heap: HeapRef = Arc::new(SystemHeap::new(HeapConfig::default().with_global_zero(true)));
    // SAFETY: GLOBAL_ZERO guarantees zeroed contents
    let handle = unsafe { MemoryHandle::<u64>::alloc_uninit(&heap, 16) }.unwrap();
    assert!(handle.as_slice().iter().all(|v| *v == 0));
}

#[test]
fn test_misaligned_resize_is_rejected() {
    let mut backing = vec![0u64; 4];
    let base = backing.as_mut_ptr() as usize;

    let mut mock = MockHeap::new();
    mock.expect_alloc()
        .times(1)
        .returning(move |_, _, _| Ok(NonNull::new(base as *mut u8).unwrap()));
    mock.expect_resize()
        .times(1)
        .returning(move |_, _, _, _| Ok(NonNull::new((base + 1) as *mut u8).unwrap()));
    mock.expect_free()
        .withf(move |block| block.as_ptr() as usize == base + 1)
        .times(1)
        .return_const(true);

    let heap: HeapRef = Arc::new(mock);
    let mut handle = MemoryHandle::<u32>::alloc(&heap, 4).unwrap();

    assert_eq!(
        handle.resize(8),
        Err(MemoryError::InvalidArgument(
            "heap returned a block misaligned for the element type"
        ))
    );
    assert_eq!(handle.handle_type(), HandleType::None);
    assert!(handle.as_slice().is_empty());
    assert!(!handle.is_active());
}
