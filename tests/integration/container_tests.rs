//! Container walking integration tests.
//!
//! Tests verify:
//! - The XML description round-trips through a file on disk
//! - The data offset follows the last complete header block
//! - Truncated or malformed blocks roll the offset back to their start
//! - Header errors are reported with the file path

use std::io::Cursor;

use lif_meta::{extract_lif_metadata, ContainerError, ErrorKind, LifContainer, ScanEnd};

use super::test_utils::{image_payload, write_temp, LifBuilder, SAMPLE_XML};

// =============================================================================
// Data Offset Tests
// =============================================================================

#[test]
fn test_no_blocks_offset_is_header_plus_xml() {
    let builder = LifBuilder::new(SAMPLE_XML);
    let expected = 13 + 2 * SAMPLE_XML.encode_utf16().count() as u64;
    assert_eq!(builder.xml_end(), expected);

    let file = builder.write_temp();
    let (xml, offset) = extract_lif_metadata(file.path()).unwrap();
    assert_eq!(xml, SAMPLE_XML);
    assert_eq!(offset, expected);
}

#[test]
fn test_one_block_then_payload() {
    let builder = LifBuilder::new(SAMPLE_XML).block("MemBlock_233");
    let (_, block_end) = builder.block_bounds()[0];
    // Payload starting with a non-marker byte at position 17
    let mut payload = image_payload(4096);
    payload[17] = 0;
    let file = builder.raw(&payload).write_temp();

    let (_, offset) = extract_lif_metadata(file.path()).unwrap();
    assert_eq!(offset, block_end as u64);
}

#[test]
fn test_first_marker_not_continuation() {
    let builder = LifBuilder::new(SAMPLE_XML);
    let xml_end = builder.xml_end();
    let file = builder.block_with_marker(0x2B, "not-a-block").write_temp();

    let container = LifContainer::open(file.path()).unwrap();
    assert_eq!(container.data_offset, xml_end);
    assert!(container.blocks.is_empty());
    assert_eq!(container.scan_end, ScanEnd::MarkerMismatch(0x2B));
}

#[test]
fn test_truncated_prefix_offset_is_block_start() {
    let builder = LifBuilder::new(SAMPLE_XML);
    let xml_end = builder.xml_end();
    let file = builder.raw(&[0x5A; 10]).write_temp();

    let (_, offset) = extract_lif_metadata(file.path()).unwrap();
    assert_eq!(offset, xml_end);
}

#[test]
fn test_truncated_after_blocks_keeps_last_boundary() {
    let builder = LifBuilder::new(SAMPLE_XML).block("A").block("BB");
    let (_, last_end) = builder.block_bounds()[1];

    let mut partial = LifBuilder::new("").block("MemBlock_with_long_id").build();
    // Keep the partial block's prefix, marker, length and half of its id
    let partial_block = partial.split_off(13);
    let cut = partial_block.len() - 10;

    let file = builder.raw(&partial_block[..cut]).write_temp();
    let container = LifContainer::open(file.path()).unwrap();

    assert_eq!(container.blocks.len(), 2);
    assert_eq!(container.data_offset, last_end as u64);
    assert_eq!(container.scan_end, ScanEnd::TruncatedIdentifier);
}

#[test]
fn test_block_chain_records_identifiers() {
    let builder = LifBuilder::new(SAMPLE_XML)
        .block("MemBlock_1")
        .block("MemBlock_2")
        .block("MemBlock_3");
    let bounds = builder.block_bounds().to_vec();
    let file = builder.write_temp();

    let container = LifContainer::open(file.path()).unwrap();
    let ids: Vec<_> = container
        .blocks
        .iter()
        .map(|block| block.identifier.as_str())
        .collect();
    assert_eq!(ids, vec!["MemBlock_1", "MemBlock_2", "MemBlock_3"]);

    for (block, (start, end)) in container.blocks.iter().zip(bounds) {
        assert_eq!(block.start, start as u64);
        assert_eq!(block.end, end as u64);
    }
    assert_eq!(container.data_offset, container.blocks[2].end);
}

#[test]
fn test_offset_never_exceeds_file_length() {
    for cut in 0..40 {
        let bytes = LifBuilder::new("<x/>").block("MemBlock_7").build();
        let truncated = bytes[..bytes.len() - cut.min(bytes.len() - 21)].to_vec();
        let len = truncated.len() as u64;

        let container = LifContainer::from_reader(Cursor::new(truncated), "cut.lif").unwrap();
        assert!(container.data_offset <= len);
        for block in &container.blocks {
            assert!(block.end <= container.data_offset);
        }
    }
}

#[test]
fn test_file_and_reader_agree() {
    let bytes = LifBuilder::new(SAMPLE_XML)
        .block("MemBlock_1")
        .raw(&image_payload(1000))
        .build();
    let file = write_temp(&bytes);

    let from_file = LifContainer::open(file.path()).unwrap();
    let from_memory = LifContainer::from_reader(Cursor::new(bytes), "memory").unwrap();
    assert_eq!(from_file.data_offset, from_memory.data_offset);
    assert_eq!(from_file.xml, from_memory.xml);
    assert_eq!(from_file.blocks, from_memory.blocks);
}

// =============================================================================
// Header Error Tests
// =============================================================================

#[test]
fn test_wrong_magic_reports_path() {
    let file = LifBuilder::with_magic(113, 42, SAMPLE_XML).write_temp();
    let path = file.path().display().to_string();

    let err = extract_lif_metadata(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(err.to_string().contains(&path));
}

#[test]
fn test_wrong_header_marker() {
    let file = LifBuilder::with_magic(112, 0, SAMPLE_XML).write_temp();

    let err = LifContainer::open(file.path()).unwrap_err();
    assert!(matches!(
        err,
        ContainerError::InvalidMagic {
            field: "continuation marker",
            expected: 42,
            actual: 0,
            ..
        }
    ));
}

#[test]
fn test_truncated_header() {
    let file = write_temp(&[0x70, 0x00, 0x00, 0x00, 0x00, 0x00]);

    let err = extract_lif_metadata(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncation);
}

#[test]
fn test_truncated_xml() {
    let mut bytes = LifBuilder::new(SAMPLE_XML).build();
    bytes.truncate(bytes.len() / 2);
    let file = write_temp(&bytes);

    let err = extract_lif_metadata(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncation);
}

#[test]
fn test_missing_file() {
    let err = extract_lif_metadata("/nonexistent/path/scan.lif").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("scan.lif"));
}
