/*!
 * Cursor Tests
 * Forward-only reader and writer behavior over handle views
 */

use memhandle::{
    ForwardOnlyReader, ForwardOnlyWriter, HeapExt, HeapRef, MemoryError, SubSequence, SystemHeap,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::fmt::Write as _;
use std::sync::Arc;

#[test]
fn test_writer_append_sequence() {
    let mut buffer = [0i32; 5];
    let mut writer = ForwardOnlyWriter::new(&mut buffer);

    writer.append(&[1, 2, 3]).unwrap();
    assert_eq!(writer.written(), 3);
    assert_eq!(writer.remaining(), 2);

    assert_eq!(
        writer.append(&[4, 5, 6]),
        Err(MemoryError::InsufficientSpace { requested: 3, remaining: 2 })
    );
    assert_eq!(writer.written(), 3);

    writer.append(&[4, 5]).unwrap();
    assert_eq!(writer.materialize(), &[1, 2, 3, 4, 5]);
}

#[test]
fn test_reader_advance_and_reset() {
    let text: Vec<char> = "ABCDE".chars().collect();
    let mut reader = ForwardOnlyReader::new(&text);

    reader.advance(2).unwrap();
    assert_eq!(reader.window(), &['C', 'D', 'E']);

    assert!(reader.advance(4).is_err());
    assert_eq!(reader.position(), 2);

    reader.reset();
    assert_eq!(reader.window().len(), 5);
    reader.advance(5).unwrap();
    assert!(reader.is_exhausted());
}

#[test]
fn test_partial_write_round_trips_through_materialize() {
    let mut buffer = [0u8; 5];
    let mut writer = ForwardOnlyWriter::new(&mut buffer);
    writer.append(&[1, 2, 3]).unwrap();

    let mut reader = ForwardOnlyReader::new(writer.materialize());
    assert_eq!(reader.remaining(), 3);

    let mut out = [0u8; 3];
    reader.read_into(&mut out).unwrap();
    assert_eq!(out, [1, 2, 3]);
    assert!(reader.is_exhausted());
    assert!(reader.advance(1).is_err());
}

#[test]
fn test_writer_to_reader_round_trip_over_heap_handle() {
    let heap: HeapRef = Arc::new(SystemHeap::default());
    let mut handle = heap.alloc_handle::<u16>(3).unwrap();

    let mut writer = ForwardOnlyWriter::new(handle.as_mut_slice());
    for value in [1u16, 2, 3] {
        writer.append_one(value).unwrap();
    }
    assert_eq!(writer.remaining(), 0);

    let window = SubSequence::whole(&handle);
    let mut reader = ForwardOnlyReader::new(window.as_slice());
    let mut out = [0u16; 3];
    reader.read_into(&mut out).unwrap();
    assert_eq!(out, [1, 2, 3]);
    assert!(reader.is_exhausted());
}

#[test]
fn test_char_writer_formats_without_truncation() {
    let mut buffer = ['\0'; 8];
    let mut writer = ForwardOnlyWriter::new(&mut buffer);

    write!(writer, "pid={}", 42).unwrap();
    assert!(write!(writer, "{}", "overflow").is_err());
    assert_eq!(writer.to_string(), "pid=42");
}

proptest! {
    #[test]
    fn prop_written_tracks_successful_appends(
        capacity in 0usize..64,
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..12),
    ) {
        let mut buffer = vec![0u8; capacity];
        let mut writer = ForwardOnlyWriter::new(&mut buffer);
        let mut expected = Vec::new();

        for chunk in &chunks {
            let before = writer.written();
            match writer.append(chunk) {
                Ok(()) => expected.extend_from_slice(chunk),
                Err(_) => {
                    prop_assert!(chunk.len() > capacity - before);
                    prop_assert_eq!(writer.written(), before);
                }
            }
        }

        prop_assert_eq!(writer.materialize(), expected.as_slice());
        prop_assert!(writer.written() <= capacity);
    }

    #[test]
    fn prop_reader_position_never_exceeds_length(
        len in 0usize..64,
        steps in prop::collection::vec(0usize..20, 0..16),
    ) {
        let data = vec![7u8; len];
        let mut reader = ForwardOnlyReader::new(&data);

        for step in steps {
            let before = reader.position();
            if reader.advance(step).is_err() {
                prop_assert_eq!(reader.position(), before);
            }
            prop_assert!(reader.position() <= len);
            prop_assert_eq!(reader.remaining(), len - reader.position());
        }
    }
}
