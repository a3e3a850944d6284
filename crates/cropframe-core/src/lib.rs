//! Cropframe Core - Crop/zoom/rotate export pipeline
//!
//! This crate provides the core compositing functionality for Cropframe:
//! aspect-locked crop geometry, the center-anchored rotate/zoom transform,
//! and pixel-density-corrected raster export of the selected region.

pub mod bitmap;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod raster;
pub mod session;
pub mod transform;

pub use bitmap::{Bitmap, OutputRaster};
pub use geometry::{centered_rect_for_aspect, CropRect, PixelRect};
pub use raster::{compose_raster, output_dimensions, SampleFilter};
pub use session::{Event, Phase, Session};
pub use transform::{sampling_rect, scale_factors, ScaleFactors, Transform2d};

/// Minimum zoom factor. Zooming out below the original size is not allowed.
pub const ZOOM_MIN: f64 = 1.0;

/// Maximum zoom factor exposed by the zoom control.
pub const ZOOM_MAX: f64 = 3.0;

/// Rotation increment applied by the rotate-step control, in degrees.
pub const ROTATION_STEP_DEGREES: f64 = 90.0;

/// View transform applied to the whole image: uniform zoom and rotation
/// around the natural image center.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewTransform {
    /// Uniform zoom factor (1.0 = no zoom, always >= 1.0)
    pub zoom: f64,
    /// Clockwise rotation in degrees, normalized to [0, 360)
    pub rotation_degrees: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: ZOOM_MIN,
            rotation_degrees: 0.0,
        }
    }
}

impl ViewTransform {
    /// Create a new identity view transform (no zoom, no rotation)
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if both zoom and rotation are at their defaults
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Set the zoom factor, clamped to the exposed control range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Set the rotation angle, wrapped into [0, 360).
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation_degrees = degrees.rem_euclid(360.0);
    }

    /// Advance rotation by one fixed step (+90 degrees), wrapping modulo 360.
    pub fn rotate_step(&mut self) {
        self.set_rotation(self.rotation_degrees + ROTATION_STEP_DEGREES);
    }
}
