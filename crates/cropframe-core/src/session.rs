//! Session orchestration: state machine driving the compositing pipeline.
//!
//! A session moves through three phases: `Empty` (no bitmap), `Loaded`
//! (bitmap present, nothing committed yet) and `Ready` (bitmap and committed
//! crop present, output raster valid). Every input event is handled
//! synchronously and fully recomputes dependent outputs before returning;
//! there is no background work and no re-entrancy.
//!
//! Missing inputs (no bitmap, no committed crop) make events silent no-ops,
//! leaving any prior output untouched; downstream must tolerate a stale or
//! empty output raster.

use crate::bitmap::{Bitmap, OutputRaster};
use crate::encode::{encode_png, EncodeError};
use crate::geometry::{centered_rect_for_aspect, CropRect, PixelRect};
use crate::raster::{compose_raster, SampleFilter};
use crate::ViewTransform;

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No bitmap loaded.
    Empty,
    /// Bitmap present, no committed crop yet.
    Loaded,
    /// Bitmap and committed crop present, output raster valid.
    Ready,
}

/// A discrete user-input event delivered to the session.
#[derive(Debug, Clone)]
pub enum Event {
    /// A new bitmap finished decoding. Replaces the current one wholesale.
    LoadBitmap(Bitmap),
    /// Provisional crop rectangle change during an interactive drag.
    UpdateCrop(CropRect),
    /// Interaction-complete: the user finished editing the crop rectangle.
    CommitCrop(CropRect),
    /// Zoom slider moved.
    SetZoom(f64),
    /// Rotation slider moved.
    SetRotation(f64),
    /// Rotate-step button pressed (+90 degrees).
    RotateStep,
    /// Aspect lock toggled; Some(ratio) enables, None disables.
    SetAspectLock(Option<f64>),
    /// The rendering surface's device pixel ratio became known or changed.
    SetDevicePixelRatio(f64),
}

/// Session state: current bitmap, crop rectangle, view transform, aspect
/// lock and the most recent output raster.
#[derive(Debug)]
pub struct Session {
    bitmap: Option<Bitmap>,
    crop: Option<CropRect>,
    committed: Option<PixelRect>,
    view: ViewTransform,
    aspect_lock: Option<f64>,
    device_pixel_ratio: f64,
    filter: SampleFilter,
    output: Option<OutputRaster>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            bitmap: None,
            crop: None,
            committed: None,
            view: ViewTransform::default(),
            aspect_lock: None,
            device_pixel_ratio: 1.0,
            filter: SampleFilter::default(),
            output: None,
        }
    }
}

impl Session {
    /// Create a new empty session with device pixel ratio 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that composes with the given resampling filter.
    pub fn with_filter(filter: SampleFilter) -> Self {
        Self {
            filter,
            ..Self::new()
        }
    }

    /// Current lifecycle phase, derived from held state.
    pub fn phase(&self) -> Phase {
        match (&self.bitmap, &self.committed) {
            (None, _) => Phase::Empty,
            (Some(_), None) => Phase::Loaded,
            (Some(_), Some(_)) => Phase::Ready,
        }
    }

    /// The loaded source bitmap, if any.
    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    /// The provisional crop rectangle (percentage space), if any.
    pub fn crop(&self) -> Option<&CropRect> {
        self.crop.as_ref()
    }

    /// The committed crop in displayed-pixel units, if any.
    pub fn committed_crop(&self) -> Option<&PixelRect> {
        self.committed.as_ref()
    }

    /// The current view transform.
    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// The active aspect lock ratio, if any.
    pub fn aspect_lock(&self) -> Option<f64> {
        self.aspect_lock
    }

    /// The device pixel ratio used for output sizing.
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// The most recent output raster, if one has been composed.
    pub fn output(&self) -> Option<&OutputRaster> {
        self.output.as_ref()
    }

    /// Dispatch a single input event, recomputing dependent outputs before
    /// returning.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::LoadBitmap(bitmap) => self.load_bitmap(bitmap),
            Event::UpdateCrop(rect) => self.update_crop(rect),
            Event::CommitCrop(rect) => self.commit_crop(rect),
            Event::SetZoom(zoom) => self.set_zoom(zoom),
            Event::SetRotation(degrees) => self.set_rotation(degrees),
            Event::RotateStep => self.rotate_step(),
            Event::SetAspectLock(ratio) => self.set_aspect_lock(ratio),
            Event::SetDevicePixelRatio(ratio) => self.set_device_pixel_ratio(ratio),
        }
    }

    /// Load a new bitmap, discarding any prior crop, committed crop and
    /// output.
    ///
    /// If an aspect lock is already active, the initial crop rectangle is
    /// seeded immediately from the displayed size.
    pub fn load_bitmap(&mut self, bitmap: Bitmap) {
        self.crop = None;
        self.committed = None;
        self.output = None;

        self.crop = self.aspect_lock.and_then(|ratio| {
            let rect =
                centered_rect_for_aspect(bitmap.displayed_width, bitmap.displayed_height, ratio);
            (!rect.is_empty()).then_some(rect)
        });

        self.bitmap = Some(bitmap);
    }

    /// Record a provisional crop rectangle change (interactive drag).
    ///
    /// The rect is stored as delivered; it may transiently violate the
    /// percentage-space invariant and is only clamped on commit. No-op
    /// without a bitmap.
    pub fn update_crop(&mut self, rect: CropRect) {
        if self.bitmap.is_none() {
            return;
        }
        self.crop = Some(rect);
    }

    /// Commit a crop rectangle: clamp it, promote it to displayed-pixel
    /// units and recompose the output raster. No-op without a bitmap.
    pub fn commit_crop(&mut self, rect: CropRect) {
        let Some(bitmap) = &self.bitmap else {
            return;
        };

        let clamped = rect.clamped();
        self.crop = Some(clamped);
        self.committed = Some(clamped.to_pixels(bitmap.displayed_width, bitmap.displayed_height));
        self.recompose();
    }

    /// Set the zoom factor (clamped to the exposed range) and recompose.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.view.set_zoom(zoom);
        self.recompose();
    }

    /// Set the rotation angle (wrapped into [0, 360)) and recompose.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.view.set_rotation(degrees);
        self.recompose();
    }

    /// Advance rotation by the fixed +90 degree step and recompose.
    pub fn rotate_step(&mut self) {
        self.view.rotate_step();
        self.recompose();
    }

    /// Enable or disable the aspect lock.
    ///
    /// Enabling recomputes the crop rectangle from the displayed size when a
    /// bitmap is present; without one, seeding is deferred to the next load.
    /// Disabling leaves the rectangle as last computed.
    pub fn set_aspect_lock(&mut self, ratio: Option<f64>) {
        self.aspect_lock = ratio;

        let (Some(ratio), Some(bitmap)) = (ratio, &self.bitmap) else {
            return;
        };

        let rect = centered_rect_for_aspect(bitmap.displayed_width, bitmap.displayed_height, ratio);
        if !rect.is_empty() {
            self.crop = Some(rect);
        }
    }

    /// Update the device pixel ratio and recompose. Invalid values are
    /// ignored, keeping the previous ratio (which defaults to 1).
    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        if !ratio.is_finite() || ratio <= 0.0 {
            return;
        }
        self.device_pixel_ratio = ratio;
        self.recompose();
    }

    /// Snapshot the current output raster as PNG bytes.
    ///
    /// Returns None when nothing has been composed yet. The snapshot has no
    /// ordering dependency on later recompositions.
    pub fn export_png(&self) -> Option<Result<Vec<u8>, EncodeError>> {
        self.output.as_ref().map(encode_png)
    }

    /// Recompute the output raster from the current bitmap, committed crop
    /// and view transform. Missing inputs leave the prior output untouched.
    fn recompose(&mut self) {
        let (Some(bitmap), Some(committed)) = (&self.bitmap, &self.committed) else {
            return;
        };

        self.output = Some(compose_raster(
            bitmap,
            committed,
            &self.view,
            self.device_pixel_ratio,
            self.filter,
        ));
    }
}
