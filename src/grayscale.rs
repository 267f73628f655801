//! RGB to 8-bit luminance conversion.

use image::DynamicImage;

/// 8-bit luminance samples, row-major, 0 = black and 255 = white.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuminanceGrid {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl LuminanceGrid {
    /// Convert a decoded image using the ITU-R BT.601 luma weights.
    ///
    /// Alpha is ignored, so a transparent pixel keeps the luminance of its
    /// color channels.
    pub fn from_image(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let samples = rgb.pixels().map(|p| luma(p[0], p[1], p[2])).collect();

        LuminanceGrid {
            width: width as usize,
            height: height as usize,
            samples,
        }
    }

    /// Build a grid from row-major samples.
    ///
    /// Returns `None` if `samples.len() != width * height`.
    pub fn from_raw(width: usize, height: usize, samples: Vec<u8>) -> Option<Self> {
        if samples.len() != width * height {
            return None;
        }
        Some(LuminanceGrid {
            width,
            height,
            samples,
        })
    }

    /// Build a grid from a slice of equally long rows.
    ///
    /// Returns `None` for ragged input.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut samples = Vec::with_capacity(width * height);
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return None;
            }
            samples.extend_from_slice(row);
        }
        Some(LuminanceGrid {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.width + x]
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    y.round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn primaries_use_bt601_weights() {
        assert_eq!(luma(255, 0, 0), 76); // 76.245
        assert_eq!(luma(0, 255, 0), 150); // 149.685
        assert_eq!(luma(0, 0, 255), 29); // 29.07
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
    }

    #[test]
    fn rounds_to_nearest() {
        // 0.299 * 10 + 0.587 * 10 + 0.114 * 11 = 10.114
        assert_eq!(luma(10, 10, 11), 10);
        // 0.299 * 100 + 0.587 * 101 + 0.114 * 100 = 100.587
        assert_eq!(luma(100, 101, 100), 101);
    }

    #[test]
    fn from_image_keeps_dimensions() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([255, 255, 255]));
        let grid = LuminanceGrid::from_image(&DynamicImage::ImageRgb8(img));

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(0, 0), 0);
        assert_eq!(grid.get(2, 1), 255);
    }

    #[test]
    fn alpha_is_ignored() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 0]));
        let grid = LuminanceGrid::from_image(&DynamicImage::ImageRgba8(img));
        assert_eq!(grid.get(0, 0), 200);
    }

    #[test]
    fn rejects_mismatched_sample_count() {
        assert!(LuminanceGrid::from_raw(2, 2, vec![0; 3]).is_none());
        assert!(LuminanceGrid::from_rows(&[vec![0u8, 1], vec![2]]).is_none());
    }
}
