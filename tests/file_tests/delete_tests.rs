//! Delete Tests

use std::io::{self, Read};
use std::sync::Arc;

use rowvault::{Error, MemoryNode};

use crate::common::{columns, open_counting_session, open_session, payload, CF};

#[test]
fn test_delete_file_removes_every_row() {
    let mut session = open_session(16, 5);
    session
        .put_file(CF, "doc", io::Cursor::new(payload(40)), None)
        .unwrap();

    session.delete_file(CF, "doc").unwrap();

    assert!(!session.exists(CF, "doc").unwrap());
    for index in 0..3 {
        assert!(!session.exists(CF, &format!("doc-chunk-{}", index)).unwrap());
    }
    assert!(session.get_file_content(CF, "doc").unwrap().is_none());
}

#[test]
fn test_delete_missing_file_is_a_no_op() {
    let mut session = open_session(16, 5);
    session.delete_file(CF, "nothing").unwrap();
    session.delete(CF, "nothing").unwrap();
}

#[test]
fn test_generic_delete_handles_files_and_records() {
    let mut session = open_session(16, 5);
    session
        .put_file(CF, "blob", io::Cursor::new(payload(20)), None)
        .unwrap();
    session
        .put_record(CF, "row", &columns(&[("a", "1")]))
        .unwrap();

    session.delete(CF, "blob").unwrap();
    session.delete(CF, "row").unwrap();

    assert!(!session.exists(CF, "blob").unwrap());
    assert!(!session.exists(CF, "blob-chunk-0").unwrap());
    assert!(!session.exists(CF, "blob-chunk-1").unwrap());
    assert!(!session.exists(CF, "row").unwrap());
}

#[test]
fn test_file_can_be_rewritten_after_delete() {
    let mut session = open_session(16, 5);
    session
        .put_file(CF, "doc", io::Cursor::new(payload(20)), None)
        .unwrap();
    session.delete_file(CF, "doc").unwrap();

    session
        .put_file(CF, "doc", io::Cursor::new(b"again".to_vec()), None)
        .unwrap();

    let mut content = session.get_file_content(CF, "doc").unwrap().unwrap();
    let mut out = Vec::new();
    content.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"again");
}

#[test]
fn test_missing_chunk_surfaces_on_read() {
    let mut session = open_session(16, 5);
    session
        .put_file(CF, "torn", io::Cursor::new(payload(40)), None)
        .unwrap();

    // Simulate a delete interrupted after the first chunk row
    session.delete_record(CF, "torn-chunk-1").unwrap();

    let mut content = session.get_file_content(CF, "torn").unwrap().unwrap();
    let mut first = [0u8; 16];
    content.read_exact(&mut first).unwrap();
    assert_eq!(&first[..], &payload(40)[..16]);

    let err = content.read(&mut [0u8; 16]).unwrap_err();
    let inner = err
        .into_inner()
        .and_then(|e| e.downcast::<Error>().ok())
        .expect("session error inside io::Error");
    assert!(matches!(*inner, Error::MissingChunk { ref key } if key == "torn-chunk-1"));

    // The stream is finished after an error
    assert_eq!(content.read(&mut [0u8; 16]).unwrap(), 0);
}

#[test]
fn test_chunks_are_fetched_lazily() {
    let node = Arc::new(MemoryNode::new());
    let (mut session, slices, _) = open_counting_session(node, 10, 5);
    session
        .put_file(CF, "lazy", io::Cursor::new(payload(50)), None)
        .unwrap();

    let before = slices.get();
    let mut content = session.get_file_content(CF, "lazy").unwrap().unwrap();

    // Only the metadata row has been read
    assert_eq!(slices.get(), before + 1);

    let mut buf = [0u8; 4];
    content.read_exact(&mut buf).unwrap();
    assert_eq!(slices.get(), before + 2);

    let mut rest = Vec::new();
    content.read_to_end(&mut rest).unwrap();
    assert_eq!(rest.len(), 46);
    assert_eq!(slices.get(), before + 1 + 5);

    // Nothing past the last chunk is requested
    assert_eq!(content.read(&mut buf).unwrap(), 0);
    assert_eq!(slices.get(), before + 1 + 5);
}

#[test]
fn test_zero_byte_file_reads_no_chunks() {
    let node = Arc::new(MemoryNode::new());
    let (mut session, slices, _) = open_counting_session(node, 10, 5);
    session.put_file(CF, "none", io::empty(), None).unwrap();

    let before = slices.get();
    let mut content = session.get_file_content(CF, "none").unwrap().unwrap();
    let mut out = Vec::new();
    content.read_to_end(&mut out).unwrap();

    assert!(out.is_empty());
    assert_eq!(slices.get(), before + 1);
}
