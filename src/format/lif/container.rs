//! LIF container walking.
//!
//! A LIF file starts with a small fixed header, followed by the UTF-16 XML
//! description of the acquisition, a chain of header blocks and finally the
//! raw image data.
//!
//! # Layout
//! ```text
//! Bytes 0-3:   Magic number (i32 LE, 112)
//! Bytes 4-7:   Reserved (not interpreted)
//! Byte  8:     Continuation marker (42)
//! Bytes 9-12:  XML character count N (i32 LE, UTF-16 code units)
//! Bytes 13-..: XML description (2*N bytes, UTF-16LE)
//!
//! Zero or more header blocks:
//!   17 bytes   opaque prefix
//!   1 byte     continuation marker (42)
//!   4 bytes    identifier character count M (i32 LE)
//!   2*M bytes  identifier (UTF-16LE)
//!
//! Raw image data
//! ```
//!
//! The block chain carries no record count. The only way to find where it
//! ends is to try to parse one more block: a marker mismatch means the data
//! starts where the attempt began, and running out of bytes means the last
//! complete block is authoritative. The data offset therefore never points
//! inside a partially read block.

use std::io::Read;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{ContainerError, LifError};
use crate::io::{read_i32_le, read_u32_le, StreamReader};

// =============================================================================
// Constants
// =============================================================================

/// Expected value of the leading magic number.
pub const MAGIC_NUMBER: i32 = 112;

/// Marker byte that precedes the XML length and every header block identifier.
pub const CONTINUATION_MARKER: u8 = 42;

/// Size of the fixed file header in bytes (magic + reserved + marker + XML length).
pub const FILE_HEADER_SIZE: usize = 13;

/// Size of the opaque prefix at the start of each header block.
pub const BLOCK_PREFIX_SIZE: u64 = 17;

/// UTF-16 byte-order mark, dropped from the start of decoded text.
const BYTE_ORDER_MARK: char = '\u{FEFF}';

// =============================================================================
// FileHeader
// =============================================================================

/// Parsed fixed-size LIF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Reserved word following the magic number (not interpreted)
    pub reserved: u32,

    /// Number of UTF-16 code units in the XML description
    pub xml_char_count: u32,
}

impl FileHeader {
    /// Parse the fixed header from raw bytes.
    ///
    /// Fields are validated in file order, so a wrong magic number is
    /// reported as such even when the rest of the header is missing.
    ///
    /// # Errors
    /// - `Truncated` if the bytes end before a field is complete
    /// - `InvalidMagic` if the magic number or continuation marker is wrong
    /// - `InvalidXmlLength` if the XML character count is negative
    pub fn parse(bytes: &[u8], path: &str) -> Result<Self, ContainerError> {
        let truncated = |field: &'static str, start: usize, required: usize| {
            ContainerError::Truncated {
                path: path.to_string(),
                field,
                required: required as u64,
                actual: bytes.len().saturating_sub(start) as u64,
            }
        };

        if bytes.len() < 4 {
            return Err(truncated("magic number", 0, 4));
        }
        let magic = read_i32_le(&bytes[0..4]);
        if magic != MAGIC_NUMBER {
            return Err(ContainerError::InvalidMagic {
                path: path.to_string(),
                field: "magic number",
                expected: MAGIC_NUMBER as i64,
                actual: magic as i64,
            });
        }

        if bytes.len() < 8 {
            return Err(truncated("reserved word", 4, 4));
        }
        let reserved = read_u32_le(&bytes[4..8]);

        if bytes.len() < 9 {
            return Err(truncated("continuation marker", 8, 1));
        }
        let marker = bytes[8];
        if marker != CONTINUATION_MARKER {
            return Err(ContainerError::InvalidMagic {
                path: path.to_string(),
                field: "continuation marker",
                expected: CONTINUATION_MARKER as i64,
                actual: marker as i64,
            });
        }

        if bytes.len() < FILE_HEADER_SIZE {
            return Err(truncated("XML character count", 9, 4));
        }
        let count = read_i32_le(&bytes[9..13]);
        let xml_char_count = u32::try_from(count).map_err(|_| ContainerError::InvalidXmlLength {
            path: path.to_string(),
            count,
        })?;

        Ok(FileHeader {
            reserved,
            xml_char_count,
        })
    }

    /// Size of the XML description in bytes.
    #[inline]
    pub const fn xml_byte_length(&self) -> u64 {
        self.xml_char_count as u64 * 2
    }
}

// =============================================================================
// HeaderBlock
// =============================================================================

/// A fully parsed header block from the chain following the XML description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    /// Byte position of the block's opaque prefix
    pub start: u64,

    /// Byte position immediately after the block's identifier
    pub end: u64,

    /// Decoded block identifier
    pub identifier: String,
}

/// Why the header block scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEnd {
    /// The file ended before a block prefix or its marker could be read
    EndOfFile,

    /// The byte after the prefix was not the continuation marker
    MarkerMismatch(u8),

    /// The file ended inside the identifier length
    TruncatedLength,

    /// The identifier length was negative
    InvalidLength(i32),

    /// The file ended inside the identifier
    TruncatedIdentifier,
}

/// Outcome of one attempt to parse a header block.
enum BlockAttempt {
    Parsed(HeaderBlock),
    Stop(ScanEnd),
}

// =============================================================================
// LifContainer
// =============================================================================

/// The structural parts of a LIF file up to the start of the image data.
#[derive(Debug, Clone)]
pub struct LifContainer {
    /// Identifier of the source (file path)
    pub path: String,

    /// The fixed file header
    pub header: FileHeader,

    /// The XML acquisition description
    pub xml: String,

    /// Fully parsed header blocks, in file order
    pub blocks: Vec<HeaderBlock>,

    /// Byte position where the raw image data starts
    pub data_offset: u64,

    /// Why the block scan stopped
    pub scan_end: ScanEnd,
}

impl LifContainer {
    /// Open a LIF file and walk its structure.
    ///
    /// The file handle lives only for the duration of this call.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
        let reader = StreamReader::open(path.as_ref())?;
        Self::walk(reader)
    }

    /// Walk a LIF container from any byte source.
    ///
    /// `identifier` names the source in error messages.
    pub fn from_reader<R: Read>(
        reader: R,
        identifier: impl Into<String>,
    ) -> Result<Self, ContainerError> {
        Self::walk(StreamReader::new(reader, identifier))
    }

    fn walk<R: Read>(mut reader: StreamReader<R>) -> Result<Self, ContainerError> {
        let path = reader.identifier().to_string();

        let header_bytes = reader.read_up_to(FILE_HEADER_SIZE as u64)?;
        let header = FileHeader::parse(&header_bytes, &path)?;
        debug!(
            path = %path,
            reserved = format_args!("{:#010x}", header.reserved),
            xml_chars = header.xml_char_count,
            "LIF header validated"
        );

        let required = header.xml_byte_length();
        let xml_bytes = reader.read_up_to(required)?;
        if (xml_bytes.len() as u64) < required {
            return Err(ContainerError::Truncated {
                path,
                field: "XML description",
                required,
                actual: xml_bytes.len() as u64,
            });
        }
        let xml = decode_utf16_le(&xml_bytes)
            .ok_or_else(|| ContainerError::InvalidXmlText { path: path.clone() })?;

        let mut data_offset = reader.position();
        let mut blocks = Vec::new();

        let scan_end = loop {
            let block_start = reader.position();
            match read_header_block(&mut reader)? {
                BlockAttempt::Parsed(block) => {
                    trace!(
                        start = block.start,
                        end = block.end,
                        identifier = %block.identifier,
                        "Parsed header block"
                    );
                    data_offset = block.end;
                    blocks.push(block);
                }
                BlockAttempt::Stop(ScanEnd::EndOfFile) => break ScanEnd::EndOfFile,
                BlockAttempt::Stop(end) => {
                    data_offset = block_start;
                    break end;
                }
            }
        };

        debug!(
            path = %path,
            blocks = blocks.len(),
            data_offset,
            reason = ?scan_end,
            "Header block scan finished"
        );

        Ok(LifContainer {
            path,
            header,
            xml,
            blocks,
            data_offset,
            scan_end,
        })
    }
}

/// Attempt to parse one header block at the reader's current position.
///
/// Returns `Stop` when the bytes at this position are not a complete block.
/// I/O failures other than running out of bytes are propagated.
fn read_header_block<R: Read>(
    reader: &mut StreamReader<R>,
) -> Result<BlockAttempt, ContainerError> {
    let start = reader.position();

    let prefix = reader.read_up_to(BLOCK_PREFIX_SIZE)?;
    if (prefix.len() as u64) < BLOCK_PREFIX_SIZE {
        return Ok(BlockAttempt::Stop(ScanEnd::EndOfFile));
    }

    let marker = match reader.read_up_to(1)?.first() {
        Some(&marker) => marker,
        None => return Ok(BlockAttempt::Stop(ScanEnd::EndOfFile)),
    };
    if marker != CONTINUATION_MARKER {
        return Ok(BlockAttempt::Stop(ScanEnd::MarkerMismatch(marker)));
    }

    let length_bytes = reader.read_up_to(4)?;
    if length_bytes.len() < 4 {
        return Ok(BlockAttempt::Stop(ScanEnd::TruncatedLength));
    }
    let char_count = read_i32_le(&length_bytes);
    if char_count < 0 {
        return Ok(BlockAttempt::Stop(ScanEnd::InvalidLength(char_count)));
    }

    let byte_length = char_count as u64 * 2;
    let id_bytes = reader.read_up_to(byte_length)?;
    if (id_bytes.len() as u64) < byte_length {
        return Ok(BlockAttempt::Stop(ScanEnd::TruncatedIdentifier));
    }

    Ok(BlockAttempt::Parsed(HeaderBlock {
        start,
        end: reader.position(),
        identifier: decode_utf16_le_lossy(&id_bytes),
    }))
}

/// Walk a LIF file and return its XML description and data offset.
pub fn extract_lif_metadata(path: impl AsRef<Path>) -> Result<(String, u64), LifError> {
    let container = LifContainer::open(path)?;
    Ok((container.xml, container.data_offset))
}

// =============================================================================
// UTF-16 Decoding
// =============================================================================

fn utf16_units(bytes: &[u8]) -> impl Iterator<Item = u16> + '_ {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
}

fn strip_bom(mut text: String) -> String {
    if text.starts_with(BYTE_ORDER_MARK) {
        text.replace_range(..BYTE_ORDER_MARK.len_utf8(), "");
    }
    text
}

/// Decode UTF-16LE text, rejecting unpaired surrogates.
fn decode_utf16_le(bytes: &[u8]) -> Option<String> {
    let units: Vec<u16> = utf16_units(bytes).collect();
    String::from_utf16(&units).ok().map(strip_bom)
}

/// Decode UTF-16LE text, replacing unpaired surrogates.
fn decode_utf16_le_lossy(bytes: &[u8]) -> String {
    let units: Vec<u16> = utf16_units(bytes).collect();
    strip_bom(String::from_utf16_lossy(&units))
}

// =============================================================================
// Tests
// =============================================================================
