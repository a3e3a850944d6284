//! Crop rectangle geometry.
//!
//! Crop rectangles are expressed in percentage units of the *displayed*
//! bitmap, making the selection independent of the rendering resolution.
//! Geometry stays in percentage space until the final raster-sizing step,
//! where it is resolved once against concrete pixel dimensions.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner, (100, 100) = bottom-right corner
//! - width/height are percentages of the displayed dimensions

use serde::{Deserialize, Serialize};

/// A crop rectangle in percentage units of the displayed bitmap.
///
/// Invariant for committed use: 0 <= x, y and x + width <= 100,
/// y + height <= 100. Values may transiently violate this during an
/// interactive drag; call [`CropRect::clamped`] before consuming the rect
/// downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge as a percentage of displayed width.
    pub x: f64,
    /// Top edge as a percentage of displayed height.
    pub y: f64,
    /// Width as a percentage of displayed width.
    pub width: f64,
    /// Height as a percentage of displayed height.
    pub height: f64,
}

impl CropRect {
    /// Create a new crop rect from percentage values.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The zero rect, meaning "nothing selected".
    pub fn zero() -> Self {
        Self::default()
    }

    /// Check if this rect selects no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Clamp the rect into the [0, 100] percentage space.
    ///
    /// Origin is clamped first, then the extent is reduced so that
    /// x + width <= 100 and y + height <= 100.
    pub fn clamped(&self) -> Self {
        let x = self.x.clamp(0.0, 100.0);
        let y = self.y.clamp(0.0, 100.0);
        let width = self.width.clamp(0.0, 100.0 - x);
        let height = self.height.clamp(0.0, 100.0 - y);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Resolve percentages against concrete displayed dimensions.
    ///
    /// This is the single point where percentage space becomes pixel space.
    pub fn to_pixels(&self, displayed_width: f64, displayed_height: f64) -> PixelRect {
        PixelRect {
            x: self.x / 100.0 * displayed_width,
            y: self.y / 100.0 * displayed_height,
            width: self.width / 100.0 * displayed_width,
            height: self.height / 100.0 * displayed_height,
        }
    }
}

/// A rectangle in absolute pixel units (displayed or natural space).
///
/// The committed crop is a `PixelRect` in displayed pixels; the sampling
/// rectangle handed to the raster compositor is a `PixelRect` in natural
/// (source bitmap) pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    /// Create a new pixel rect.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if this rect covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Compute the largest centered crop rect with the given aspect ratio that
/// fits inside the displayed bitmap bounds.
///
/// The result is in percentage units of the displayed dimensions. Pure and
/// total: degenerate input (zero or negative dimensions, non-positive or
/// non-finite aspect) yields the zero rect, which downstream treats as
/// "nothing to export".
///
/// # Arguments
///
/// * `displayed_width` - Displayed bitmap width in pixels
/// * `displayed_height` - Displayed bitmap height in pixels
/// * `aspect_ratio` - Desired width/height ratio (e.g. 16.0 / 9.0)
pub fn centered_rect_for_aspect(
    displayed_width: f64,
    displayed_height: f64,
    aspect_ratio: f64,
) -> CropRect {
    if displayed_width <= 0.0
        || displayed_height <= 0.0
        || aspect_ratio <= 0.0
        || !aspect_ratio.is_finite()
    {
        return CropRect::zero();
    }

    let crop_width = displayed_width.min(displayed_height * aspect_ratio);
    let crop_height = crop_width / aspect_ratio;

    CropRect {
        x: (displayed_width - crop_width) / 2.0 / displayed_width * 100.0,
        y: (displayed_height - crop_height) / 2.0 / displayed_height * 100.0,
        width: crop_width / displayed_width * 100.0,
        height: crop_height / displayed_height * 100.0,
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
