//! Test utilities for integration tests.
//!
//! This module provides a builder for synthetic LIF files and helpers for
//! writing them to temporary files.

use std::io::Write;

use tempfile::NamedTempFile;

// =============================================================================
// Sample XML
// =============================================================================

/// A minimal XML description with everything the metadata extractor reads.
pub const SAMPLE_XML: &str = r#"<LMSDataContainerHeader Version="2">
  <Element Name="Region 1">
    <Data>
      <Image>
        <ImageDescription>
          <Dimensions>
            <DimensionDescription DimID="1" NumberOfElements="11" Origin="0" Length="100.0" Unit="um"/>
            <DimensionDescription DimID="2" NumberOfElements="21" Origin="0" Length="50.0" Unit="um"/>
          </Dimensions>
        </ImageDescription>
        <Attachment Name="HardwareSetting">
          <ATLConfocalSettingDefinition FlipX="0" FlipY="1" SwapXY="1" BitSize="16" MicroscopeModel="DMI8-CS"/>
        </Attachment>
        <Attachment Name="TileScanInfo">
          <Tile FieldX="0" FieldY="0" PosX="0.0451" PosY="0.0213"/>
        </Attachment>
      </Image>
    </Data>
  </Element>
</LMSDataContainerHeader>"#;

// =============================================================================
// LIF Builder
// =============================================================================

/// Encode text as UTF-16LE bytes.
pub fn utf16_le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

/// Builds synthetic LIF containers byte by byte.
///
/// Positions of interest (end of the XML, start and end of each block) are
/// recorded so tests can assert offsets without recomputing them.
#[derive(Debug, Clone)]
pub struct LifBuilder {
    bytes: Vec<u8>,
    xml_end: usize,
    block_bounds: Vec<(usize, usize)>,
}

impl LifBuilder {
    /// Start a container with a valid header and the given XML description.
    pub fn new(xml: &str) -> Self {
        Self::with_magic(112, 42, xml)
    }

    /// Start a container with explicit magic values.
    pub fn with_magic(magic: i32, marker: u8, xml: &str) -> Self {
        let xml_bytes = utf16_le(xml);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&magic.to_le_bytes());
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        bytes.push(marker);
        bytes.extend_from_slice(&((xml_bytes.len() / 2) as i32).to_le_bytes());
        bytes.extend_from_slice(&xml_bytes);

        let xml_end = bytes.len();
        Self {
            bytes,
            xml_end,
            block_bounds: Vec::new(),
        }
    }

    /// Append a well-formed header block.
    pub fn block(self, identifier: &str) -> Self {
        self.block_with_marker(42, identifier)
    }

    /// Append a header block with an explicit continuation marker.
    pub fn block_with_marker(mut self, marker: u8, identifier: &str) -> Self {
        let start = self.bytes.len();
        let id_bytes = utf16_le(identifier);

        self.bytes.extend_from_slice(&[0x5A; 17]);
        self.bytes.push(marker);
        self.bytes
            .extend_from_slice(&((id_bytes.len() / 2) as i32).to_le_bytes());
        self.bytes.extend_from_slice(&id_bytes);

        if marker == 42 {
            self.block_bounds.push((start, self.bytes.len()));
        }
        self
    }

    /// Append arbitrary bytes (image data, garbage, partial blocks).
    pub fn raw(mut self, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(data);
        self
    }

    /// Byte position immediately after the XML description.
    pub fn xml_end(&self) -> u64 {
        self.xml_end as u64
    }

    /// Start and end positions of each well-formed block appended so far.
    pub fn block_bounds(&self) -> &[(usize, usize)] {
        &self.block_bounds
    }

    /// Finish and return the container bytes.
    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    /// Finish and write the container to a temporary file.
    pub fn write_temp(self) -> NamedTempFile {
        write_temp(&self.bytes)
    }
}

/// Write bytes to a new temporary file with a `.lif` suffix.
pub fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".lif")
        .tempfile()
        .expect("create temp file");
    file.write_all(bytes).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Deterministic pseudo image data.
pub fn image_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}
