//! Composition of the crop sampling rectangle and the view transform.
//!
//! The committed crop arrives in displayed-pixel space. The bitmap may be
//! rendered smaller or larger than its native resolution, so the crop is
//! first scaled into natural (source bitmap) space, then the rotate/zoom
//! view transform and the device-pixel-ratio correction are composed around
//! it.
//!
//! Zoom and rotation changes without an accompanying crop commit reuse the
//! same sampling rectangle; only the transform is recomposed.
//!
//! # Known limitation
//!
//! Rotation and zoom anchor at the natural image center while the crop
//! rectangle is defined in the un-rotated displayed frame. For off-center
//! crops under rotation or zoom the sampling region can therefore extend
//! outside the nominally selected rectangle. This mirrors the behavior of
//! the on-screen preview and is kept deliberately.

use crate::bitmap::Bitmap;
use crate::geometry::PixelRect;
use crate::transform::Transform2d;
use crate::ViewTransform;

/// Per-axis scale factors from displayed space to natural space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    /// natural_width / displayed_width
    pub x: f64,
    /// natural_height / displayed_height
    pub y: f64,
}

impl ScaleFactors {
    /// Check whether either factor is degenerate.
    pub fn is_degenerate(&self) -> bool {
        !(self.x > 0.0 && self.y > 0.0) || !self.x.is_finite() || !self.y.is_finite()
    }
}

/// Compute the displayed-to-natural scale factors for a bitmap.
///
/// A degenerate displayed size yields zero factors, which downstream treats
/// as "nothing to export".
pub fn scale_factors(bitmap: &Bitmap) -> ScaleFactors {
    if bitmap.displayed_width <= 0.0 || bitmap.displayed_height <= 0.0 {
        return ScaleFactors { x: 0.0, y: 0.0 };
    }
    ScaleFactors {
        x: bitmap.natural_width as f64 / bitmap.displayed_width,
        y: bitmap.natural_height as f64 / bitmap.displayed_height,
    }
}

/// Map a committed crop from displayed-pixel space into the source-bitmap
/// sampling rectangle in natural pixels.
pub fn sampling_rect(committed: &PixelRect, scale: ScaleFactors) -> PixelRect {
    PixelRect {
        x: committed.x * scale.x,
        y: committed.y * scale.y,
        width: committed.width * scale.x,
        height: committed.height * scale.y,
    }
}

/// Build the rotate/zoom view transform anchored at the natural bitmap
/// center.
///
/// Applied to a source point, the sequence is: translate to center, apply
/// the uniform zoom, rotate clockwise, translate back. Rotation and zoom are
/// defined relative to the whole image, independent of where the crop sits.
pub fn view_transform(natural_width: f64, natural_height: f64, view: &ViewTransform) -> Transform2d {
    let cx = natural_width / 2.0;
    let cy = natural_height / 2.0;

    Transform2d::translation(-cx, -cy)
        .then(&Transform2d::scale(view.zoom, view.zoom))
        .then(&Transform2d::rotation_degrees(view.rotation_degrees))
        .then(&Transform2d::translation(cx, cy))
}

/// Build the full forward transform from natural source space to output
/// device space.
///
/// Composition, outermost first: device-pixel-ratio scale, translation of
/// the sampling rectangle to the output origin, then the center-anchored
/// view transform.
pub fn export_transform(
    sampling: &PixelRect,
    natural_width: f64,
    natural_height: f64,
    view: &ViewTransform,
    device_pixel_ratio: f64,
) -> Transform2d {
    view_transform(natural_width, natural_height, view)
        .then(&Transform2d::translation(-sampling.x, -sampling.y))
        .then(&Transform2d::scale(device_pixel_ratio, device_pixel_ratio))
}
