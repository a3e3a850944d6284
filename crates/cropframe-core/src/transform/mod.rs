//! Transform composition for the export pipeline.
//!
//! This module builds the center-anchored rotate/zoom transform and maps the
//! committed crop from displayed-pixel space into the source-bitmap sampling
//! rectangle.
//!
//! # Transform Order
//!
//! The composed export transform is, outermost first:
//! 1. Device-pixel-ratio scale
//! 2. Translate the sampling rectangle to the output origin
//! 3. Translate to the natural image center
//! 4. Rotate (clockwise degrees)
//! 5. Uniform zoom scale
//! 6. Translate back from the center
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, y grows downward
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - The rotate/zoom anchor is the *natural* bitmap center, not the crop
//!   center, so preview (which transforms the whole displayed image) and
//!   export stay visually consistent

mod compose;
mod matrix;

pub use compose::{export_transform, sampling_rect, scale_factors, view_transform, ScaleFactors};
pub use matrix::Transform2d;
