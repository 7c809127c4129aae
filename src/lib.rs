//! # lif-meta
//!
//! Acquisition metadata extraction for Leica LIF microscope containers.
//!
//! A LIF file bundles a UTF-16 XML description of the acquisition, a chain
//! of binary header blocks and the raw image data. This library walks the
//! container to find the XML and the byte offset where the image data
//! starts, then reads the few values a region-of-interest finder needs:
//! orientation flags, bit depth, image dimensions, pixel size and stage
//! position.
//!
//! ## Architecture
//!
//! - [`io`] - Forward-only positioned reader and little-endian helpers
//! - [`mod@format`] - LIF container walker and XML metadata extraction
//! - [`error`] - Typed errors, classified by [`ErrorKind`]
//! - [`config`] - CLI configuration for the `lif-meta` binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use lif_meta::{read_lif_metadata, ErrorKind};
//!
//! match read_lif_metadata("scan.lif") {
//!     Ok(metadata) => {
//!         println!("{} x {} pixels, data at byte {}", metadata.x_dim, metadata.y_dim, metadata.offset);
//!     }
//!     Err(err) if err.kind() == ErrorKind::Format => eprintln!("not a LIF file: {}", err),
//!     Err(err) => eprintln!("failed: {}", err),
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;

// Re-export commonly used types
pub use config::{Config, OutputFormat};
pub use error::{ContainerError, ErrorKind, IoError, LifError, MetadataError};
pub use format::lif::{
    extract_lif_metadata, pixel_resolution, read_lif_metadata, AttributeReader, FileHeader,
    HeaderBlock, LifContainer, LifMetadata, ScanEnd, XmlDocument, XmlElement, BLOCK_PREFIX_SIZE,
    CONTINUATION_MARKER, FILE_HEADER_SIZE, MAGIC_NUMBER,
};
pub use io::StreamReader;
