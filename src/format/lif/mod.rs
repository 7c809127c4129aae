//! Leica LIF container parsing.
//!
//! # Key Concepts
//!
//! - **Container walk**: the fixed header is validated, the UTF-16 XML
//!   description is decoded, and the chain of header blocks is scanned to
//!   find where the raw image data starts. See [`container`].
//!
//! - **Metadata extraction**: a few attributes of the XML description are
//!   read with typed coercions and combined with the data offset into
//!   [`LifMetadata`]. See [`metadata`] and [`xml`].

pub mod container;
pub mod metadata;
pub mod xml;

pub use container::{
    extract_lif_metadata, FileHeader, HeaderBlock, LifContainer, ScanEnd, BLOCK_PREFIX_SIZE,
    CONTINUATION_MARKER, FILE_HEADER_SIZE, MAGIC_NUMBER,
};
pub use metadata::{pixel_resolution, read_lif_metadata, LifMetadata};
pub use xml::{AttributeReader, XmlDocument, XmlElement};
