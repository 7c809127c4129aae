//! Acquisition metadata for the ROI finder.
//!
//! The XML description of a LIF file is large; the ROI finder only needs a
//! handful of values from it:
//! - Orientation flags, bit depth and microscope model from the first
//!   `ATLConfocalSettingDefinition`
//! - Pixel counts and physical extents of the first two `DimensionDescription`
//!   elements (X then Y, by position)
//! - Stage position from the first `Tile`
//!
//! These are combined with the data offset found by the container walker.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{LifError, MetadataError};

use super::container::LifContainer;
use super::xml::{AttributeReader, XmlDocument};

const CONFOCAL_SETTINGS: &str = "ATLConfocalSettingDefinition";
const DIMENSION: &str = "DimensionDescription";
const TILE: &str = "Tile";

// =============================================================================
// LifMetadata
// =============================================================================

/// Metadata needed to locate regions of interest in a LIF image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifMetadata {
    /// Image is mirrored horizontally
    pub flip_x: bool,

    /// Image is mirrored vertically
    pub flip_y: bool,

    /// X and Y axes are swapped
    #[serde(rename = "SwapXY")]
    pub swap_xy: bool,

    /// Bits per sample
    pub bit_size: i64,

    /// Microscope model name
    pub microscope_model: String,

    /// Byte position of the raw image data
    pub offset: u64,

    /// Number of pixels along X
    pub x_dim: i64,

    /// Number of pixels along Y
    pub y_dim: i64,

    /// Physical size of one pixel along X
    pub x_res: f64,

    /// Physical size of one pixel along Y
    pub y_res: f64,

    /// Stage X position of the imaged field
    pub pos_x: f64,

    /// Stage Y position of the imaged field
    pub pos_y: f64,
}

impl LifMetadata {
    /// Extract metadata from an XML description and a data offset.
    ///
    /// # Errors
    /// - Schema errors (`MissingElement`, `MissingDimension`,
    ///   `MissingAttribute`, `Xml`) when the description lacks a required part
    /// - Value errors (`InvalidValue`, `DegenerateDimension`) when a value
    ///   cannot be used
    pub fn parse(xml: &str, offset: u64) -> Result<Self, MetadataError> {
        let doc = XmlDocument::parse(xml)?;

        let settings = doc.require(CONFOCAL_SETTINGS)?;
        let flip_x = settings.flag("FlipX")?;
        let flip_y = settings.flag("FlipY")?;
        let swap_xy = settings.flag("SwapXY")?;
        let bit_size = settings.int("BitSize")?;
        let microscope_model = settings.string("MicroscopeModel")?.to_string();

        // Axes are assigned by position only; DimID is not consulted.
        let dimensions: Vec<_> = doc
            .find_all(DIMENSION)
            .take(2)
            .map(|element| AttributeReader::new(DIMENSION, element))
            .collect();
        if dimensions.len() < 2 {
            return Err(MetadataError::MissingDimension { found: dimensions.len() });
        }
        let x = Dimension::read(&dimensions[0])?;
        let y = Dimension::read(&dimensions[1])?;
        let x_res = pixel_resolution("X", x.length, x.count)?;
        let y_res = pixel_resolution("Y", y.length, y.count)?;

        let tile = doc.require(TILE)?;
        let pos_x = tile.float("PosX")?;
        let pos_y = tile.float("PosY")?;

        debug!(
            model = %microscope_model,
            x_dim = x.count,
            y_dim = y.count,
            offset,
            "Extracted LIF metadata"
        );

        Ok(LifMetadata {
            flip_x,
            flip_y,
            swap_xy,
            bit_size,
            microscope_model,
            offset,
            x_dim: x.count,
            y_dim: y.count,
            x_res,
            y_res,
            pos_x,
            pos_y,
        })
    }

    /// Extract metadata from an already walked container.
    pub fn from_container(container: &LifContainer) -> Result<Self, MetadataError> {
        Self::parse(&container.xml, container.data_offset)
    }
}

/// Sample count and physical extent of one axis.
#[derive(Debug, Clone, Copy)]
struct Dimension {
    count: i64,
    length: f64,
}

impl Dimension {
    fn read(attributes: &AttributeReader<'_>) -> Result<Self, MetadataError> {
        Ok(Dimension {
            count: attributes.int("NumberOfElements")?,
            length: attributes.float("Length")?,
        })
    }
}

/// Physical size of one pixel along an axis.
///
/// `length` spans pixel centre to pixel centre, so `count` samples cover
/// `count - 1` intervals.
///
/// # Errors
/// Returns `DegenerateDimension` if `count` is 1 or less.
pub fn pixel_resolution(axis: &'static str, length: f64, count: i64) -> Result<f64, MetadataError> {
    if count <= 1 {
        return Err(MetadataError::DegenerateDimension { axis, count });
    }
    Ok(length / (count - 1) as f64)
}

/// Read the ROI finder metadata from a LIF file.
pub fn read_lif_metadata(path: impl AsRef<Path>) -> Result<LifMetadata, LifError> {
    let container = LifContainer::open(path)?;
    Ok(LifMetadata::from_container(&container)?)
}

// =============================================================================
// Tests
// =============================================================================
