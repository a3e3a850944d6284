//! Raster compositing: sizing and sampling the output buffer.
//!
//! The compositor allocates the export buffer and fills it by inverse
//! mapping: for each output pixel, the composed export transform is inverted
//! to find the contributing source location, which is then sampled with
//! bilinear or Lanczos3 interpolation. Nearest-neighbor is deliberately not
//! offered; the export contract requires high-quality resampling.
//!
//! Output dimensions are floored so the buffer never exceeds the available
//! source samples; the device pixel ratio supplies the density upscaling for
//! high-DPI exports. A zero-area crop produces a zero-area raster, never a
//! failure, and identical inputs always produce byte-identical output.

use crate::bitmap::{Bitmap, OutputRaster};
use crate::geometry::PixelRect;
use crate::transform::{export_transform, sampling_rect, scale_factors, ScaleFactors};
use crate::ViewTransform;

/// Resampling filter for the compositing draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFilter {
    /// Fast bilinear interpolation - good for interactive recomposition.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation - good for final export.
    Lanczos3,
}

/// Compute the output raster dimensions for a committed crop.
///
/// Width is `floor(crop.width * scale.x * device_pixel_ratio)`, analogously
/// for height. Flooring is deliberate: the buffer must never exceed the
/// available source samples. Degenerate input yields zero dimensions.
pub fn output_dimensions(
    committed: &PixelRect,
    scale: ScaleFactors,
    device_pixel_ratio: f64,
) -> (u32, u32) {
    if committed.is_empty() || scale.is_degenerate() {
        return (0, 0);
    }
    if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
        return (0, 0);
    }

    let w = (committed.width * scale.x * device_pixel_ratio).floor();
    let h = (committed.height * scale.y * device_pixel_ratio).floor();

    (w.max(0.0) as u32, h.max(0.0) as u32)
}

/// Compose the output raster for a committed crop under the given view
/// transform.
///
/// The committed crop is in displayed-pixel space; it is resolved into the
/// natural-space sampling rectangle, the rotate/zoom/pixel-ratio transform
/// is composed around it, and each output pixel is inverse-mapped into the
/// source bitmap. Samples that fall outside the source are black.
///
/// Degenerate inputs (empty bitmap, zero-area crop, unusable pixel ratio)
/// yield an empty raster.
pub fn compose_raster(
    bitmap: &Bitmap,
    committed: &PixelRect,
    view: &ViewTransform,
    device_pixel_ratio: f64,
    filter: SampleFilter,
) -> OutputRaster {
    if bitmap.is_empty() {
        return OutputRaster::empty();
    }

    let scale = scale_factors(bitmap);
    let (out_w, out_h) = output_dimensions(committed, scale, device_pixel_ratio);
    if out_w == 0 || out_h == 0 {
        return OutputRaster::empty();
    }

    let src_rect = sampling_rect(committed, scale);
    let forward = export_transform(
        &src_rect,
        bitmap.natural_width as f64,
        bitmap.natural_height as f64,
        view,
        device_pixel_ratio,
    );
    let inverse = match forward.invert() {
        Some(inv) => inv,
        // Singular transform cannot be drawn; leave the output empty
        None => return OutputRaster::empty(),
    };

    let mut output = vec![0u8; (out_w as usize) * (out_h as usize) * 3];

    for out_y in 0..out_h {
        let row_start = (out_y as usize) * (out_w as usize) * 3;
        for out_x in 0..out_w {
            let (src_x, src_y) = inverse.apply(out_x as f64, out_y as f64);

            let pixel = match filter {
                SampleFilter::Bilinear => sample_bilinear(bitmap, src_x, src_y),
                SampleFilter::Lanczos3 => sample_lanczos3(bitmap, src_x, src_y),
            };

            let idx = row_start + (out_x as usize) * 3;
            output[idx] = pixel[0];
            output[idx + 1] = pixel[1];
            output[idx + 2] = pixel[2];
        }
    }

    OutputRaster::new(out_w, out_h, output)
}

/// Get a pixel as [f64; 3] from the bitmap at the given coordinates.
#[inline]
fn get_pixel_f64(bitmap: &Bitmap, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * bitmap.natural_width as usize + px) * 3;
    [
        bitmap.pixels[idx] as f64,
        bitmap.pixels[idx + 1] as f64,
        bitmap.pixels[idx + 2] as f64,
    ]
}

/// Sample a pixel using bilinear interpolation.
///
/// Integer coordinates address pixel centers. The 4 nearest pixels are
/// weighted by distance; the neighborhood is clamped at the last row/column
/// so that exact integer coordinates on the far edge still resolve to their
/// pixel value. Out-of-bounds samples are black.
fn sample_bilinear(bitmap: &Bitmap, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (
        bitmap.natural_width as usize,
        bitmap.natural_height as usize,
    );

    if x < 0.0 || y < 0.0 || x > (w - 1) as f64 || y > (h - 1) as f64 {
        return [0, 0, 0];
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(bitmap, x0, y0);
    let p10 = get_pixel_f64(bitmap, x1, y0);
    let p01 = get_pixel_f64(bitmap, x0, y1);
    let p11 = get_pixel_f64(bitmap, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}

/// Sample a pixel using Lanczos3 interpolation.
///
/// Considers a 6x6 neighborhood, producing sharper results than bilinear.
/// Falls back to bilinear near the image edges where the kernel does not
/// fit.
fn sample_lanczos3(bitmap: &Bitmap, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (
        bitmap.natural_width as i64,
        bitmap.natural_height as i64,
    );

    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(bitmap, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            if px >= 0 && px < w && py >= 0 && py < h {
                let dx = x - px as f64;
                let dy = y - py as f64;
                let weight = lanczos_weight(dx, 3.0) * lanczos_weight(dy, 3.0);

                let pixel = get_pixel_f64(bitmap, px as usize, py as usize);
                sum[0] += pixel[0] * weight;
                sum[1] += pixel[1] * weight;
                sum[2] += pixel[2] * weight;
                weight_sum += weight;
            }
        }
    }

    let mut result = [0u8; 3];
    if weight_sum > 0.0 {
        for i in 0..3 {
            result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
        }
    }

    result
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test bitmap where each pixel has a unique value based on
    /// position, displayed at natural size.
    fn test_bitmap(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.push(v); // R
                pixels.push(v); // G
                pixels.push(v); // B
            }
        }
        Bitmap::new(width, height, pixels)
    }

    fn pixel_at(raster: &OutputRaster, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y * raster.width + x) * 3) as usize;
        [
            raster.pixels[idx],
            raster.pixels[idx + 1],
            raster.pixels[idx + 2],
        ]
    }

    #[test]
    fn test_output_dimensions_floor() {
        let committed = PixelRect::new(0.0, 0.0, 33.3, 21.7);
        let scale = ScaleFactors { x: 1.0, y: 1.0 };

        assert_eq!(output_dimensions(&committed, scale, 1.0), (33, 21));
        assert_eq!(output_dimensions(&committed, scale, 2.0), (66, 43));
    }

    #[test]
    fn test_output_dimensions_scaled_display() {
        // 100px displayed crop on a bitmap rendered at half size
        let committed = PixelRect::new(0.0, 0.0, 100.0, 50.0);
        let scale = ScaleFactors { x: 2.0, y: 2.0 };

        assert_eq!(output_dimensions(&committed, scale, 1.0), (200, 100));
    }

    #[test]
    fn test_output_dimensions_degenerate() {
        let scale = ScaleFactors { x: 1.0, y: 1.0 };
        let empty = PixelRect::new(0.0, 0.0, 0.0, 50.0);
        assert_eq!(output_dimensions(&empty, scale, 1.0), (0, 0));

        let committed = PixelRect::new(0.0, 0.0, 50.0, 50.0);
        let zero_scale = ScaleFactors { x: 0.0, y: 0.0 };
        assert_eq!(output_dimensions(&committed, zero_scale, 1.0), (0, 0));
        assert_eq!(output_dimensions(&committed, scale, 0.0), (0, 0));
        assert_eq!(output_dimensions(&committed, scale, f64::NAN), (0, 0));
    }

    #[test]
    fn test_unit_square_center_crop_is_exact_copy() {
        // 100x100 natural and displayed, crop {25,25,50,50}, identity view:
        // the output is the source's central 50x50 region, pixel for pixel
        let bmp = test_bitmap(100, 100);
        let committed = PixelRect::new(25.0, 25.0, 50.0, 50.0);

        let raster = compose_raster(
            &bmp,
            &committed,
            &ViewTransform::new(),
            1.0,
            SampleFilter::Bilinear,
        );

        assert_eq!(raster.width, 50);
        assert_eq!(raster.height, 50);

        for y in 0..50u32 {
            for x in 0..50u32 {
                let expected = (((y + 25) * 100 + (x + 25)) % 256) as u8;
                assert_eq!(
                    pixel_at(&raster, x, y),
                    [expected; 3],
                    "mismatch at ({}, {})",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_full_frame_identity_copy() {
        let bmp = test_bitmap(40, 30);
        let committed = PixelRect::new(0.0, 0.0, 40.0, 30.0);

        let raster = compose_raster(
            &bmp,
            &committed,
            &ViewTransform::new(),
            1.0,
            SampleFilter::Bilinear,
        );

        assert_eq!(raster.width, 40);
        assert_eq!(raster.height, 30);
        assert_eq!(raster.pixels, bmp.pixels);
    }

    #[test]
    fn test_rotation_180_samples_about_crop_center() {
        // Crop centered on the image: output (x, y) equals the source pixel
        // at (x, y) rotated 180 degrees about the crop's center
        let bmp = test_bitmap(100, 100);
        let committed = PixelRect::new(25.0, 25.0, 50.0, 50.0);
        let mut view = ViewTransform::new();
        view.set_rotation(180.0);

        let raster = compose_raster(&bmp, &committed, &view, 1.0, SampleFilter::Bilinear);

        assert_eq!(raster.width, 50);
        assert_eq!(raster.height, 50);

        for y in 0..50u32 {
            for x in 0..50u32 {
                // Source point (25+x, 25+y) rotated 180 about (50, 50)
                let sx = 75 - x;
                let sy = 75 - y;
                let expected = ((sy * 100 + sx) % 256) as u8;
                assert_eq!(
                    pixel_at(&raster, x, y),
                    [expected; 3],
                    "mismatch at ({}, {})",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_rotation_90_on_square_centered_crop() {
        // 90 degrees clockwise about the center: output (x, y) samples the
        // source at the inverse-rotated point
        let bmp = test_bitmap(100, 100);
        let committed = PixelRect::new(25.0, 25.0, 50.0, 50.0);
        let mut view = ViewTransform::new();
        view.set_rotation(90.0);

        let raster = compose_raster(&bmp, &committed, &view, 1.0, SampleFilter::Bilinear);

        // Inverse of clockwise 90 about (50,50): (x, y) -> (y, 100 - x)
        let (x, y) = (10u32, 20u32);
        let (dx, dy) = ((25 + x) as i64, (25 + y) as i64);
        let (sx, sy) = (dy, 100 - dx);
        let expected = (((sy * 100 + sx) % 256) & 0xff) as u8;
        assert_eq!(pixel_at(&raster, x, y), [expected; 3]);
    }

    #[test]
    fn test_zoom_magnifies_center() {
        // With zoom 2 the output shows a region half the crop size around
        // the image center
        let bmp = test_bitmap(100, 100);
        let committed = PixelRect::new(25.0, 25.0, 50.0, 50.0);
        let mut view = ViewTransform::new();
        view.set_zoom(2.0);

        let raster = compose_raster(&bmp, &committed, &view, 1.0, SampleFilter::Bilinear);

        assert_eq!(raster.width, 50);
        assert_eq!(raster.height, 50);

        // Output center pixel corresponds to the image center
        let center = pixel_at(&raster, 25, 25);
        let expected = ((50 * 100 + 50) % 256) as u8;
        assert_eq!(center, [expected; 3]);
    }

    #[test]
    fn test_device_pixel_ratio_doubles_dimensions() {
        let bmp = test_bitmap(100, 100);
        let committed = PixelRect::new(25.0, 25.0, 50.0, 50.0);

        let raster = compose_raster(
            &bmp,
            &committed,
            &ViewTransform::new(),
            2.0,
            SampleFilter::Bilinear,
        );

        assert_eq!(raster.width, 100);
        assert_eq!(raster.height, 100);

        // Even output pixels land on source pixel centers
        assert_eq!(pixel_at(&raster, 0, 0), [((25 * 100 + 25) % 256) as u8; 3]);
    }

    #[test]
    fn test_displayed_scale_resolves_to_natural_pixels() {
        // 200x200 natural displayed at 100x100: a 50px displayed crop
        // exports 100 natural pixels
        let bmp = test_bitmap(200, 200).with_displayed_size(100.0, 100.0);
        let committed = PixelRect::new(25.0, 25.0, 50.0, 50.0);

        let raster = compose_raster(
            &bmp,
            &committed,
            &ViewTransform::new(),
            1.0,
            SampleFilter::Bilinear,
        );

        assert_eq!(raster.width, 100);
        assert_eq!(raster.height, 100);
        assert_eq!(pixel_at(&raster, 0, 0), [((50 * 200 + 50) % 256) as u8; 3]);
    }

    #[test]
    fn test_zero_area_crop_yields_empty_raster() {
        let bmp = test_bitmap(100, 100);
        let committed = PixelRect::new(10.0, 10.0, 0.0, 50.0);

        let raster = compose_raster(
            &bmp,
            &committed,
            &ViewTransform::new(),
            1.0,
            SampleFilter::Bilinear,
        );

        assert!(raster.is_empty());
    }

    #[test]
    fn test_empty_bitmap_yields_empty_raster() {
        let bmp = Bitmap::new(0, 0, vec![]);
        let committed = PixelRect::new(0.0, 0.0, 50.0, 50.0);

        let raster = compose_raster(
            &bmp,
            &committed,
            &ViewTransform::new(),
            1.0,
            SampleFilter::Bilinear,
        );

        assert!(raster.is_empty());
    }

    #[test]
    fn test_recomposition_is_idempotent() {
        let bmp = test_bitmap(80, 60);
        let committed = PixelRect::new(7.0, 11.0, 42.0, 31.0);
        let mut view = ViewTransform::new();
        view.set_zoom(1.6);
        view.set_rotation(23.0);

        let a = compose_raster(&bmp, &committed, &view, 1.5, SampleFilter::Lanczos3);
        let b = compose_raster(&bmp, &committed, &view, 1.5, SampleFilter::Lanczos3);

        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_bounds_samples_are_black() {
        // An off-center crop rotated 180 samples outside the image; those
        // pixels must be black, not garbage
        let bmp = test_bitmap(100, 100);
        let committed = PixelRect::new(0.0, 0.0, 30.0, 30.0);
        let mut view = ViewTransform::new();
        view.set_rotation(180.0);

        let raster = compose_raster(&bmp, &committed, &view, 1.0, SampleFilter::Bilinear);

        assert_eq!(raster.width, 30);
        // Sampling point for (0,0) is (100, 100) - outside the source
        assert_eq!(pixel_at(&raster, 0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_bilinear_and_lanczos_agree_on_integer_grid() {
        // With an identity view every sample lands on a pixel center, where
        // both kernels must reproduce the source exactly in the interior
        let bmp = test_bitmap(64, 64);
        let committed = PixelRect::new(16.0, 16.0, 32.0, 32.0);

        let bilinear = compose_raster(
            &bmp,
            &committed,
            &ViewTransform::new(),
            1.0,
            SampleFilter::Bilinear,
        );
        let lanczos = compose_raster(
            &bmp,
            &committed,
            &ViewTransform::new(),
            1.0,
            SampleFilter::Lanczos3,
        );

        assert_eq!(bilinear.width, lanczos.width);
        assert_eq!(bilinear.height, lanczos.height);
        assert_eq!(pixel_at(&bilinear, 10, 10), pixel_at(&lanczos, 10, 10));
    }

    #[test]
    fn test_lanczos_weight_at_zero() {
        let w = lanczos_weight(0.0, 3.0);
        assert!((w - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_at_boundary() {
        let w = lanczos_weight(3.0, 3.0);
        assert!(w.abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_symmetry() {
        let w1 = lanczos_weight(1.5, 3.0);
        let w2 = lanczos_weight(-1.5, 3.0);
        assert!((w1 - w2).abs() < 1e-10);
    }

    #[test]
    fn test_1x1_bitmap_does_not_panic() {
        let bmp = Bitmap::new(1, 1, vec![128, 128, 128]);
        let committed = PixelRect::new(0.0, 0.0, 1.0, 1.0);
        let mut view = ViewTransform::new();
        view.set_rotation(45.0);

        let raster = compose_raster(&bmp, &committed, &view, 1.0, SampleFilter::Bilinear);
        assert_eq!(raster.width, 1);
        assert_eq!(raster.height, 1);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
