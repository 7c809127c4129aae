//! Typed attribute extraction from the LIF XML description.
//!
//! The description is flattened into its elements in document order; only
//! element names and attributes are kept, text content is not needed. Lookups
//! go through [`AttributeReader`], which checks presence before coercion so a
//! failure always names the element and attribute involved.

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::MetadataError;

// =============================================================================
// XmlElement
// =============================================================================

/// An element of the XML description with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>, decoder: Decoder) -> Result<Self, MetadataError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| MetadataError::Xml(format!("in <{}>: {}", name, e)))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .decode_and_unescape_value(decoder)
                .map_err(|e| MetadataError::Xml(format!("in <{}> @{}: {}", name, key, e)))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(XmlElement { name, attributes })
    }

    /// Local name of the element (namespace prefix removed).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get an attribute's unescaped value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

// =============================================================================
// XmlDocument
// =============================================================================

/// Parsed XML description, as a flat list of elements in document order.
///
/// Lookups search below the root element only; the root itself never matches.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    elements: Vec<XmlElement>,
}

impl XmlDocument {
    /// Parse an XML string.
    ///
    /// # Errors
    /// Returns `MetadataError::Xml` if the text is not well-formed: a
    /// mismatched or missing end tag, no root element, or more than one.
    pub fn parse(xml: &str) -> Result<Self, MetadataError> {
        let mut reader = Reader::from_str(xml);
        let mut elements = Vec::new();
        let mut depth = 0usize;
        let mut roots = 0usize;

        loop {
            let event = reader.read_event().map_err(|e| {
                MetadataError::Xml(format!("at position {}: {}", reader.buffer_position(), e))
            })?;

            match &event {
                Event::Start(start) | Event::Empty(start) => {
                    if depth == 0 {
                        roots += 1;
                        if roots > 1 {
                            return Err(MetadataError::Xml(format!(
                                "at position {}: more than one root element",
                                reader.buffer_position()
                            )));
                        }
                    }
                    elements.push(XmlElement::from_start(start, reader.decoder())?);
                    if matches!(event, Event::Start(_)) {
                        depth += 1;
                    }
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => break,
                _ => {}
            }
        }

        if roots == 0 {
            return Err(MetadataError::Xml("no root element".to_string()));
        }
        if depth != 0 {
            return Err(MetadataError::Xml(format!(
                "{} element(s) not closed at end of document",
                depth
            )));
        }

        Ok(XmlDocument { elements })
    }

    /// Elements below the root, in document order.
    fn descendants(&self) -> impl Iterator<Item = &XmlElement> {
        self.elements.iter().skip(1)
    }

    /// First element below the root with the given name, in document order.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.descendants().find(|element| element.name == name)
    }

    /// All elements below the root with the given name, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.descendants()
            .filter(move |element| element.name == name)
    }

    /// First element below the root with the given name, or a
    /// `MissingElement` error.
    pub fn require(&self, name: &'static str) -> Result<AttributeReader<'_>, MetadataError> {
        self.find(name)
            .map(|element| AttributeReader::new(name, element))
            .ok_or(MetadataError::MissingElement(name))
    }
}

// =============================================================================
// AttributeReader
// =============================================================================

/// Reads typed attribute values from one element.
///
/// Every accessor first checks that the attribute exists, then coerces it.
/// Errors carry the element and attribute names.
#[derive(Debug, Clone, Copy)]
pub struct AttributeReader<'a> {
    element_name: &'static str,
    element: &'a XmlElement,
}

impl<'a> AttributeReader<'a> {
    /// Create a reader over `element`, reported as `element_name` in errors.
    pub fn new(element_name: &'static str, element: &'a XmlElement) -> Self {
        Self {
            element_name,
            element,
        }
    }

    /// Read an attribute's raw string value.
    pub fn string(&self, attribute: &'static str) -> Result<&'a str, MetadataError> {
        self.element
            .attribute(attribute)
            .ok_or(MetadataError::MissingAttribute {
                element: self.element_name,
                attribute,
            })
    }

    /// Read an integer attribute. Surrounding whitespace is ignored.
    pub fn int(&self, attribute: &'static str) -> Result<i64, MetadataError> {
        let raw = self.string(attribute)?;
        raw.trim()
            .parse::<i64>()
            .map_err(|_| self.invalid(attribute, "integer", raw))
    }

    /// Read a floating point attribute. Surrounding whitespace is ignored.
    pub fn float(&self, attribute: &'static str) -> Result<f64, MetadataError> {
        let raw = self.string(attribute)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| self.invalid(attribute, "float", raw))
    }

    /// Read a `0`/`1` flag attribute.
    pub fn flag(&self, attribute: &'static str) -> Result<bool, MetadataError> {
        let raw = self.string(attribute)?;
        match raw.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(self.invalid(attribute, "0 or 1", raw)),
        }
    }

    fn invalid(&self, attribute: &'static str, expected: &'static str, raw: &str) -> MetadataError {
        MetadataError::InvalidValue {
            element: self.element_name,
            attribute,
            expected,
            value: raw.to_string(),
        }
    }
}
