use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::IoError;

/// Upper bound on the buffer reserved up front for a single read.
///
/// Lengths come from the file itself, so a corrupt length field must not
/// turn into a multi-gigabyte allocation before a single byte is read.
const MAX_PREALLOCATION: usize = 64 * 1024;

/// Sequential, forward-only reader that tracks its byte position.
///
/// The container walker needs to know exactly where each structure starts
/// and ends, and must tell "fewer bytes than requested" apart from a real
/// I/O failure. This wrapper provides both over any [`Read`] source: a file
/// handle in production, an in-memory buffer in tests.
#[derive(Debug)]
pub struct StreamReader<R> {
    inner: R,
    position: u64,
    identifier: String,
}

impl StreamReader<BufReader<File>> {
    /// Open a file for sequential reading.
    ///
    /// The handle is owned by the returned reader and closed when it drops.
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let identifier = path.display().to_string();
        let file = File::open(path).map_err(|e| IoError::Open {
            path: identifier.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::new(BufReader::new(file), identifier))
    }
}

impl<R: Read> StreamReader<R> {
    /// Wrap a reader positioned at the start of the container.
    pub fn new(inner: R, identifier: impl Into<String>) -> Self {
        Self {
            inner,
            position: 0,
            identifier: identifier.into(),
        }
    }

    /// Current byte position from the start of the source.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Identifier of the source (the file path), used in error messages.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Read up to `len` bytes.
    ///
    /// Returns fewer than `len` bytes only when the source is exhausted.
    /// The position advances by the number of bytes actually returned.
    pub fn read_up_to(&mut self, len: u64) -> Result<Vec<u8>, IoError> {
        let capacity = usize::try_from(len)
            .unwrap_or(usize::MAX)
            .min(MAX_PREALLOCATION);
        let mut buf = Vec::with_capacity(capacity);

        let read = self
            .inner
            .by_ref()
            .take(len)
            .read_to_end(&mut buf)
            .map_err(|e| IoError::Read {
                path: self.identifier.clone(),
                offset: self.position,
                message: e.to_string(),
            })?;

        self.position += read as u64;
        Ok(buf)
    }
}

// =============================================================================
// Endian Helper Functions
// =============================================================================
//
// Every multi-byte integer in a LIF container is little-endian.

/// Read a little-endian u32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Read a little-endian signed i32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_i32_le(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
