/*!
 * Memory Handle Tests
 * Allocation, rental, identity and release across handle kinds
 */

use memhandle::memory::ops;
use memhandle::{
    Element, Guard, HandleType, HeapExt, HeapRef, MemoryError, MemoryHandle, PoolConfig, PoolRef,
    SharedArrayPool, SystemHeap,
};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn small_pool<T: Element>() -> PoolRef<T> {
    SharedArrayPool::shared(PoolConfig::small())
}

#[test]
fn test_zeroed_heap_allocation() {
    let heap: HeapRef = Arc::new(SystemHeap::default());

    for len in [1usize, 7, 64, 1000] {
        let handle = heap.alloc_handle::<u64>(len).unwrap();
        assert_eq!(handle.len(), len);
        assert_eq!(handle.handle_type(), HandleType::Heap);
        assert!(handle.as_slice().iter().all(|v| *v == 0));
    }
}

#[test]
fn test_pool_handle_identity() {
    let pool = small_pool::<u8>();
    let a = MemoryHandle::rent(&pool, 40, true).unwrap();
    let b = MemoryHandle::rent(&pool, 40, true).unwrap();

    assert!(a == a);
    assert!(a != b);

    let mut seen = HashSet::new();
    seen.insert(&a);
    assert!(seen.contains(&a));
    assert!(!seen.contains(&b));
}

#[test]
fn test_pool_reuse_after_dispose() {
    let shared = Arc::new(SharedArrayPool::<u32>::new(PoolConfig::small()));
    let pool: PoolRef<u32> = shared.clone();

    let mut first = MemoryHandle::rent(&pool, 30, true).unwrap();
    first.as_mut_slice().fill(5);
    let address = first.as_slice().as_ptr() as usize;
    first.dispose().unwrap();
    assert_eq!(shared.stats().total_retained(), 1);

    let second = MemoryHandle::rent(&pool, 30, true).unwrap();
    assert_eq!(second.as_slice().as_ptr() as usize, address);
    assert!(second.as_slice().iter().all(|v| *v == 0));
}

#[test]
fn test_pin_reads_element() {
    let heap: HeapRef = Arc::new(SystemHeap::default());
    let mut handle = heap.alloc_handle::<i16>(3).unwrap();
    handle.as_mut_slice().copy_from_slice(&[1, 2, 3]);

    let pin = handle.pin(1).unwrap();
    // SAFETY: the pin keeps the handle borrowed
    let value = unsafe { pin.as_ptr().read() };
    assert_eq!(value, 2);
    assert_eq!(pin.index(), 1);
}

#[test]
fn test_resize_grow_and_shrink_keep_prefix() {
    let heap: HeapRef = Arc::new(SystemHeap::default());
    let pool = small_pool::<u8>();

    for mut handle in [
        heap.alloc_handle::<u8>(4).unwrap(),
        MemoryHandle::rent(&pool, 4, true).unwrap(),
    ] {
        handle.as_mut_slice().copy_from_slice(b"abcd");
        handle.resize(9).unwrap();
        assert_eq!(handle.as_slice(), b"abcd\0\0\0\0\0");
        handle.resize(2).unwrap();
        assert_eq!(handle.as_slice(), b"ab");
    }
}

#[test]
fn test_resize_if_smaller_only_grows() {
    let pool = small_pool::<u8>();
    let mut handle = MemoryHandle::rent(&pool, 10, true).unwrap();

    assert_eq!(ops::resize_if_smaller(&mut handle, 5), Ok(false));
    assert_eq!(ops::resize_if_smaller(&mut handle, 50), Ok(true));
    assert_eq!(handle.len(), 50);
}

#[test]
fn test_overflowing_request_is_rejected() {
    let heap: HeapRef = Arc::new(SystemHeap::default());
    let result = heap.alloc_handle::<u64>(usize::MAX / 4);
    assert!(matches!(result, Err(MemoryError::Overflow { .. })));
}

#[test]
fn test_release_then_drop_frees_once() {
    let system = Arc::new(SystemHeap::default());
    let heap: HeapRef = system.clone();

    let mut handle = heap.alloc_handle::<u8>(32).unwrap();
    handle.release().unwrap();
    assert_eq!(system.stats().live_blocks, 0);
    drop(handle);
    assert_eq!(system.stats().live_blocks, 0);
}

#[test]
fn test_handles_move_across_threads() {
    let heap: HeapRef = Arc::new(SystemHeap::default());
    let pool = small_pool::<u32>();

    let workers: Vec<_> = (0..4u32)
        .map(|i| {
            let heap = heap.clone();
            let pool = pool.clone();
            thread::spawn(move || {
                let mut pooled = MemoryHandle::rent(&pool, 64, true).unwrap();
                let mut raw = heap.alloc_handle::<u32>(64).unwrap();
                pooled.as_mut_slice().fill(i);
                raw.as_mut_slice().copy_from_slice(pooled.as_slice());
                raw.as_slice().iter().sum::<u32>()
            })
        })
        .collect();

    let sums: Vec<u32> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    assert_eq!(sums, vec![0, 64, 128, 192]);
}
