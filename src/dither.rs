//! Luminance to monochrome conversion.
//!
//! Every algorithm visits pixels in row-major order and makes one final
//! black/white decision per pixel. The error diffusion variants push the
//! quantization error of each pixel forward onto neighbors that have not
//! been visited yet; error aimed outside the image is dropped.

use std::{fmt, str::FromStr};

use image::{GrayImage, Luma};

use crate::{error::Error, grayscale::LuminanceGrid};

/// Dithering algorithms supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DitherAlgorithm {
    FloydSteinberg,
    Atkinson,
    Threshold,
    Bayer,
    Burkes,
    SierraLite,
    JarvisJudiceNinke,
    Shadura,
}

impl DitherAlgorithm {
    pub const ALL: [DitherAlgorithm; 8] = [
        Self::FloydSteinberg,
        Self::Atkinson,
        Self::Threshold,
        Self::Bayer,
        Self::Burkes,
        Self::SierraLite,
        Self::JarvisJudiceNinke,
        Self::Shadura,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FloydSteinberg => "floyd-steinberg",
            Self::Atkinson => "atkinson",
            Self::Threshold => "threshold",
            Self::Bayer => "bayer",
            Self::Burkes => "burkes",
            Self::SierraLite => "sierra-lite",
            Self::JarvisJudiceNinke => "jarvis-judice-ninke",
            Self::Shadura => "shadura",
        }
    }

    /// Diffusion kernel, or `None` for the ordered algorithms.
    pub fn kernel(&self) -> Option<&'static Kernel> {
        match self {
            Self::FloydSteinberg => Some(&FLOYD_STEINBERG),
            Self::Atkinson => Some(&ATKINSON),
            Self::Burkes => Some(&BURKES),
            Self::SierraLite => Some(&SIERRA_LITE),
            Self::JarvisJudiceNinke => Some(&JARVIS_JUDICE_NINKE),
            Self::Shadura => Some(&SHADURA),
            Self::Threshold | Self::Bayer => None,
        }
    }
}

impl Default for DitherAlgorithm {
    fn default() -> Self {
        Self::FloydSteinberg
    }
}

impl fmt::Display for DitherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DitherAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|algo| algo.name() == lower)
            .ok_or_else(|| Error::UnknownAlgorithm(s.to_string()))
    }
}

/// An error diffusion kernel.
///
/// Each neighbor at offset `(dx, dy)` receives `error * weight / divisor`.
/// `dy` is never negative and entries with `dy == 0` only point right, so
/// error always lands on pixels that are still to be visited.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    pub entries: &'static [(isize, isize, u8)],
    pub divisor: u8,
}

impl Kernel {
    /// Fraction of the quantization error the kernel propagates.
    pub fn propagation(&self) -> f64 {
        let sum: u32 = self.entries.iter().map(|&(_, _, w)| u32::from(w)).sum();
        f64::from(sum) / f64::from(self.divisor)
    }
}

/// ```text
///        X   7
///    3   5   1
/// ```
pub static FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
    divisor: 16,
};

/// Propagates 6/8 of the error.
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
pub static ATKINSON: Kernel = Kernel {
    entries: &[
        (1, 0, 1),
        (2, 0, 1),
        (-1, 1, 1),
        (0, 1, 1),
        (1, 1, 1),
        (0, 2, 1),
    ],
    divisor: 8,
};

/// ```text
///            X   8   4
///    2   4   8   4   2
/// ```
pub static BURKES: Kernel = Kernel {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
    ],
    divisor: 32,
};

/// Sierra-2-4A.
///
/// ```text
///    X   2
///    1   1
/// ```
pub static SIERRA_LITE: Kernel = Kernel {
    entries: &[(1, 0, 2), (-1, 1, 1), (0, 1, 1)],
    divisor: 4,
};

/// ```text
///            X   7   5
///    3   5   7   5   3
///    1   3   5   3   1
/// ```
pub static JARVIS_JUDICE_NINKE: Kernel = Kernel {
    entries: &[
        (1, 0, 7),
        (2, 0, 5),
        (-2, 1, 3),
        (-1, 1, 5),
        (0, 1, 7),
        (1, 1, 5),
        (2, 1, 3),
        (-2, 2, 1),
        (-1, 2, 3),
        (0, 2, 5),
        (1, 2, 3),
        (2, 2, 1),
    ],
    divisor: 48,
};

/// Simplified Shadura, half right and half down.
///
/// ```text
///    X   1
///    1
/// ```
pub static SHADURA: Kernel = Kernel {
    entries: &[(1, 0, 1), (0, 1, 1)],
    divisor: 2,
};

/// 4x4 ordered dither matrix, scaled by 16 to get the threshold.
pub const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

const MIDPOINT: f64 = 128.0;

/// Black and white pixels, row-major, `true` = ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonochromeGrid {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl MonochromeGrid {
    pub fn new(width: usize, height: usize) -> Self {
        MonochromeGrid {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    /// Build a grid from a slice of equally long rows.
    ///
    /// Returns `None` for ragged input.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut pixels = Vec::with_capacity(width * height);
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return None;
            }
            pixels.extend_from_slice(row);
        }
        Some(MonochromeGrid {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, black: bool) {
        self.pixels[y * self.width + x] = black;
    }

    pub fn row(&self, y: usize) -> &[bool] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn black_count(&self) -> usize {
        self.pixels.iter().filter(|&&b| b).count()
    }

    /// Render as an 8-bit gray image, black 0 and white 255.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            if self.get(x as usize, y as usize) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }
}

/// Convert a luminance grid to black and white.
pub fn dither(grid: &LuminanceGrid, algorithm: DitherAlgorithm) -> MonochromeGrid {
    match (algorithm, algorithm.kernel()) {
        (_, Some(kernel)) => diffuse(grid, kernel),
        (DitherAlgorithm::Bayer, None) => bayer(grid),
        (_, None) => threshold(grid),
    }
}

fn threshold(grid: &LuminanceGrid) -> MonochromeGrid {
    let mut out = MonochromeGrid::new(grid.width(), grid.height());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            out.set(x, y, f64::from(grid.get(x, y)) < MIDPOINT);
        }
    }
    out
}

fn bayer(grid: &LuminanceGrid) -> MonochromeGrid {
    let mut out = MonochromeGrid::new(grid.width(), grid.height());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let limit = 16 * u16::from(BAYER_4X4[y % 4][x % 4]);
            out.set(x, y, u16::from(grid.get(x, y)) < limit);
        }
    }
    out
}

fn diffuse(grid: &LuminanceGrid, kernel: &Kernel) -> MonochromeGrid {
    let (width, height) = (grid.width(), grid.height());
    let mut work: Vec<f64> = grid.samples().iter().map(|&v| f64::from(v)).collect();
    let mut out = MonochromeGrid::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let current = work[y * width + x];
            let black = current < MIDPOINT;
            out.set(x, y, black);

            let level = if black { 0.0 } else { 255.0 };
            spread(&mut work, width, (x, y), current - level, kernel);
        }
    }

    out
}

/// Add `error` to the neighbors of `origin`. Taps outside the grid are dropped.
fn spread(work: &mut [f64], width: usize, origin: (usize, usize), error: f64, kernel: &Kernel) {
    let height = if width == 0 { 0 } else { work.len() / width };
    for &(dx, dy, weight) in kernel.entries {
        let nx = origin.0 as isize + dx;
        let ny = origin.1 as isize + dy;
        if nx < 0 || nx >= width as isize || ny >= height as isize {
            continue;
        }
        work[ny as usize * width + nx as usize] +=
            error * f64::from(weight) / f64::from(kernel.divisor);
    }
}
