// THEORY:
// The `RasterImage` is the read-only accessor every detector shares: a thin
// container over decoded pixel data that knows how to summarize itself (samples,
// luminance, regional averages, local gradients) but not what those numbers mean.
//
// Every read is bounds-checked. A coordinate outside `[0,width) x [0,height)`
// yields `ColorSample::BLACK` (luminance 0) instead of failing, so detectors can
// probe fixed offsets on images of any size without guarding each access.

use crate::core_modules::pixel::pixel::{ColorSample, Luminance};
use crate::error::ClassifyResult;
use image::RgbImage;

/// An immutable, decoded RGB image.
#[derive(Debug, Clone)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: RgbImage,
}

impl RasterImage {
    /// Decodes any format the `image` crate recognises and flattens it to RGB8.
    pub fn decode(bytes: &[u8]) -> ClassifyResult<Self> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::from_rgb(decoded.to_rgb8()))
    }

    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self {
            width: pixels.width(),
            height: pixels.height(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Signed width, for coordinate arithmetic.
    pub fn w(&self) -> i32 {
        self.width as i32
    }

    /// Signed height, for coordinate arithmetic.
    pub fn h(&self) -> i32 {
        self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Bounded read: out-of-range coordinates return the black sentinel.
    pub fn sample(&self, x: i32, y: i32) -> ColorSample {
        if !self.contains(x, y) {
            return ColorSample::BLACK;
        }
        ColorSample::from(*self.pixels.get_pixel(x as u32, y as u32))
    }

    pub fn luminance(&self, x: i32, y: i32) -> Luminance {
        self.sample(x, y).luminance()
    }

    /// Mean luminance over `[x0,x1) x [y0,y1)` clipped to the image; 0 when empty.
    pub fn mean_luminance(&self, x0: i32, x1: i32, y0: i32, y1: i32) -> Luminance {
        let mut total = 0.0;
        let mut count = 0usize;
        for y in y0.max(0)..y1.min(self.h()) {
            for x in x0.max(0)..x1.min(self.w()) {
                total += self.luminance(x, y);
                count += 1;
            }
        }
        if count == 0 { 0.0 } else { total / count as f64 }
    }

    /// Central-difference gradient magnitude. Zero on the one-pixel border.
    pub fn edge_strength(&self, x: i32, y: i32) -> f64 {
        if x < 1 || x >= self.w() - 1 || y < 1 || y >= self.h() - 1 {
            return 0.0;
        }
        let horizontal = (self.luminance(x + 1, y) - self.luminance(x - 1, y)).abs();
        let vertical = (self.luminance(x, y + 1) - self.luminance(x, y - 1)).abs();
        (horizontal * horizontal + vertical * vertical).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn split_image() -> RasterImage {
        // Left half black, right half white.
        RasterImage::from_rgb(RgbImage::from_fn(10, 6, |x, _| {
            if x < 5 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        }))
    }

    #[test]
    fn out_of_bounds_reads_return_sentinel() {
        let raster = split_image();
        assert_eq!(raster.sample(-1, 0), ColorSample::BLACK);
        assert_eq!(raster.sample(9, 6), ColorSample::BLACK);
        assert_eq!(raster.sample(100, -100), ColorSample::BLACK);
        assert_eq!(raster.luminance(10, 0), 0.0);
        assert_eq!(raster.sample(9, 5), ColorSample::WHITE);
    }

    #[test]
    fn edge_strength_peaks_on_the_boundary() {
        let raster = split_image();
        assert!(raster.edge_strength(5, 3) > 200.0);
        assert_eq!(raster.edge_strength(2, 3), 0.0);
        assert_eq!(raster.edge_strength(0, 3), 0.0);
    }

    #[test]
    fn mean_luminance_clips_to_image() {
        let raster = split_image();
        assert!((raster.mean_luminance(5, 50, -4, 50) - 255.0).abs() < 1e-6);
        assert_eq!(raster.mean_luminance(20, 30, 0, 6), 0.0);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(RasterImage::decode(b"definitely not an image").is_err());
    }
}
