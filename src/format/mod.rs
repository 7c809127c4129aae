//! Format parsers for microscope image containers.
//!
//! Currently supported formats:
//!
//! - **Leica LIF**: XML description, header block chain and raw image data
//!   in a single file

pub mod lif;

pub use lif::{extract_lif_metadata, read_lif_metadata, LifContainer, LifMetadata};
