use thiserror::Error;

/// I/O errors that can occur when reading a container from disk
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// The file could not be opened
    #[error("Failed to open {path}: {message}")]
    Open { path: String, message: String },

    /// A read failed for a reason other than end of file
    #[error("Failed to read {path} at offset {offset}: {message}")]
    Read {
        path: String,
        offset: u64,
        message: String,
    },
}

/// Errors raised while walking the binary container structure
#[derive(Debug, Clone, Error)]
pub enum ContainerError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// A magic number did not match (file is not a LIF container)
    #[error("Invalid LIF file: {path} ({field} is {actual}, expected {expected})")]
    InvalidMagic {
        path: String,
        field: &'static str,
        expected: i64,
        actual: i64,
    },

    /// The XML character count in the header is negative
    #[error("Invalid LIF file: {path} (XML character count is {count})")]
    InvalidXmlLength { path: String, count: i32 },

    /// The XML blob is not valid UTF-16
    #[error("Invalid LIF file: {path} (XML description is not valid UTF-16)")]
    InvalidXmlText { path: String },

    /// The file ended before a fixed-size field was complete
    #[error("Truncated LIF file: {path} ({field} needs {required} bytes, got {actual})")]
    Truncated {
        path: String,
        field: &'static str,
        required: u64,
        actual: u64,
    },
}

/// Errors raised while extracting metadata from the XML description
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    /// The XML description is not well-formed
    #[error("Malformed XML description: {0}")]
    Xml(String),

    /// A required element is absent
    #[error("Missing element: {0}")]
    MissingElement(&'static str),

    /// Fewer than two DimensionDescription elements
    #[error("Missing DimensionDescription: need 2 (X and Y), found {found}")]
    MissingDimension { found: usize },

    /// A required attribute is absent from an element
    #[error("Missing attribute {attribute} on {element}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// An attribute could not be coerced to its expected type
    #[error("Invalid value for {element}@{attribute}: expected {expected}, got {value:?}")]
    InvalidValue {
        element: &'static str,
        attribute: &'static str,
        expected: &'static str,
        value: String,
    },

    /// A dimension has too few elements to derive a pixel resolution
    #[error("Degenerate dimension: {axis} has {count} element(s), need at least 2")]
    DegenerateDimension { axis: &'static str, count: i64 },
}

/// Broad classification of a [`LifError`], for callers that branch on the
/// failure class rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file could not be opened or read
    Io,
    /// The file is not this container format
    Format,
    /// The file ends inside the fixed header or XML blob
    Truncation,
    /// An expected XML element or attribute is absent or unparseable
    Schema,
    /// An attribute is present but holds an unusable value
    Value,
}

/// Top-level error for reading LIF metadata
#[derive(Debug, Clone, Error)]
pub enum LifError {
    /// Container walking error
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// XML metadata extraction error
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

impl LifError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifError::Container(err) => err.kind(),
            LifError::Metadata(err) => err.kind(),
        }
    }
}

impl ContainerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContainerError::Io(_) => ErrorKind::Io,
            ContainerError::InvalidMagic { .. }
            | ContainerError::InvalidXmlLength { .. }
            | ContainerError::InvalidXmlText { .. } => ErrorKind::Format,
            ContainerError::Truncated { .. } => ErrorKind::Truncation,
        }
    }
}

impl MetadataError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetadataError::Xml(_)
            | MetadataError::MissingElement(_)
            | MetadataError::MissingDimension { .. }
            | MetadataError::MissingAttribute { .. } => ErrorKind::Schema,
            MetadataError::InvalidValue { .. } | MetadataError::DegenerateDimension { .. } => {
                ErrorKind::Value
            }
        }
    }
}
