//! Source bitmap and output raster types.
//!
//! A `Bitmap` is the decoded source image together with its on-screen
//! displayed size. It is loaded once per session and shared read-only by
//! the compositing pipeline; a new file selection replaces it wholesale.

/// A decoded source image with RGB pixel data and layout information.
///
/// Natural dimensions are the intrinsic decoded pixel dimensions; displayed
/// dimensions are the size the bitmap is currently rendered at on screen,
/// which may differ due to layout scaling.
#[derive(Debug, Clone)]
pub struct Bitmap {
    /// Intrinsic width in pixels.
    pub natural_width: u32,
    /// Intrinsic height in pixels.
    pub natural_height: u32,
    /// On-screen rendered width in logical pixels.
    pub displayed_width: f64,
    /// On-screen rendered height in logical pixels.
    pub displayed_height: f64,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be natural_width * natural_height * 3.
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a new Bitmap displayed at its natural size.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            natural_width: width,
            natural_height: height,
            displayed_width: width as f64,
            displayed_height: height as f64,
            pixels,
        }
    }

    /// Set the displayed (layout) size, returning the updated bitmap.
    pub fn with_displayed_size(mut self, width: f64, height: f64) -> Self {
        self.displayed_width = width;
        self.displayed_height = height;
        self
    }

    /// Create a Bitmap from an image::RgbImage, displayed at natural size.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// Convert to an image::RgbImage for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.natural_width, self.natural_height, self.pixels.clone())
    }

    /// Check if this is an empty/invalid bitmap.
    pub fn is_empty(&self) -> bool {
        self.natural_width == 0
            || self.natural_height == 0
            || self.displayed_width <= 0.0
            || self.displayed_height <= 0.0
            || self.pixels.is_empty()
    }
}

/// The export pixel buffer produced by the raster compositor.
///
/// Sized to the committed crop resolved to natural pixels and corrected for
/// device pixel density. A zero-area raster is valid and means "nothing to
/// export".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRaster {
    /// Buffer width in device pixels.
    pub width: u32,
    /// Buffer height in device pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl OutputRaster {
    /// Create a new raster. Zero dimensions yield an empty buffer.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a zero-area raster.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    /// Convert to an image::RgbImage for encoding.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Check if this raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
