//! Bit packing of monochrome grids into printer memory layouts.
//!
//! Two layouts are supported:
//!
//! - **Raster** (`GS v 0`): one bit per pixel, MSB first, row by row. Each
//!   row is padded to whole bytes.
//! - **Banded** (`ESC *`): the image is cut into strips of 8 rows. Each strip
//!   is sent column by column, one byte per column with bit 0 at the top.
//!
//! Black pixels are set bits in both layouts.

use std::{fmt, str::FromStr};

use crate::{dither::MonochromeGrid, error::Error};

/// Rows per band in the banded layout.
pub const BAND_HEIGHT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Raster,
    Banded,
}

impl Layout {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::Banded => "bit-image",
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::Raster
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raster" => Ok(Self::Raster),
            "bit-image" | "banded" => Ok(Self::Banded),
            _ => Err(Error::UnknownLayout(s.to_string())),
        }
    }
}

/// Shape of a packed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Raster { bytes_per_row: usize, height: usize },
    Banded { bands: usize, width: usize },
}

/// Packed image data ready for the command encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    data: Vec<u8>,
    geometry: Geometry,
}

impl Bitmap {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn layout(&self) -> Layout {
        match self.geometry {
            Geometry::Raster { .. } => Layout::Raster,
            Geometry::Banded { .. } => Layout::Banded,
        }
    }

    /// Column bytes of band `index`, or `None` past the last band or for a
    /// raster bitmap.
    pub fn band(&self, index: usize) -> Option<&[u8]> {
        match self.geometry {
            Geometry::Banded { bands, width } if index < bands => {
                Some(&self.data[index * width..(index + 1) * width])
            }
            _ => None,
        }
    }

    /// Iterate over bands top to bottom. Empty for a raster bitmap.
    pub fn bands(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let count = match self.geometry {
            Geometry::Banded { bands, .. } => bands,
            Geometry::Raster { .. } => 0,
        };
        (0..count).filter_map(move |i| self.band(i))
    }
}

pub fn pack(grid: &MonochromeGrid, layout: Layout) -> Bitmap {
    match layout {
        Layout::Raster => pack_raster(grid),
        Layout::Banded => pack_banded(grid),
    }
}

fn pack_raster(grid: &MonochromeGrid) -> Bitmap {
    let bytes_per_row = (grid.width() + 7) / 8;
    let height = grid.height();
    let mut data = vec![0u8; bytes_per_row * height];

    for y in 0..height {
        for (x, &black) in grid.row(y).iter().enumerate() {
            if black {
                data[y * bytes_per_row + x / 8] |= 0x80 >> (x % 8);
            }
        }
    }

    Bitmap {
        data,
        geometry: Geometry::Raster {
            bytes_per_row,
            height,
        },
    }
}

fn pack_banded(grid: &MonochromeGrid) -> Bitmap {
    let width = grid.width();
    let height = grid.height();
    let bands = (height + BAND_HEIGHT - 1) / BAND_HEIGHT;
    let mut data = vec![0u8; bands * width];

    for band in 0..bands {
        for x in 0..width {
            let mut column: u8 = 0x00;
            for bit in 0..BAND_HEIGHT {
                let y = band * BAND_HEIGHT + bit;
                // rows past the bottom stay zero
                if y < height && grid.get(x, y) {
                    column |= 1 << bit;
                }
            }
            data[band * width + x] = column;
        }
    }

    Bitmap {
        data,
        geometry: Geometry::Banded { bands, width },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(width: usize, height: usize) -> MonochromeGrid {
        let mut grid = MonochromeGrid::new(width, height);
        for y in 0..height {
            for x in 0..width {
                grid.set(x, y, (x * 7 + y * 3) % 5 < 2);
            }
        }
        grid
    }

    fn unpack_raster(bitmap: &Bitmap, width: usize) -> MonochromeGrid {
        let (bytes_per_row, height) = match bitmap.geometry() {
            Geometry::Raster {
                bytes_per_row,
                height,
            } => (bytes_per_row, height),
            other => panic!("unexpected geometry {:?}", other),
        };
        let mut grid = MonochromeGrid::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let byte = bitmap.data()[y * bytes_per_row + x / 8];
                grid.set(x, y, byte & (0x80 >> (x % 8)) != 0);
            }
        }
        grid
    }

    fn unpack_banded(bitmap: &Bitmap, height: usize) -> MonochromeGrid {
        let width = match bitmap.geometry() {
            Geometry::Banded { width, .. } => width,
            other => panic!("unexpected geometry {:?}", other),
        };
        let mut grid = MonochromeGrid::new(width, height);
        for (band, bytes) in bitmap.bands().enumerate() {
            for (x, &column) in bytes.iter().enumerate() {
                for bit in 0..BAND_HEIGHT {
                    let y = band * BAND_HEIGHT + bit;
                    if y < height {
                        grid.set(x, y, column & (1 << bit) != 0);
                    }
                }
            }
        }
        grid
    }

    #[test]
    fn raster_unpacks_to_the_same_grid() {
        let grid = pattern(13, 10);
        let bitmap = pack(&grid, Layout::Raster);
        assert_eq!(bitmap.data().len(), 2 * 10);
        assert_eq!(unpack_raster(&bitmap, 13), grid);
    }

    #[test]
    fn banded_unpacks_to_the_same_grid() {
        let grid = pattern(13, 10);
        let bitmap = pack(&grid, Layout::Banded);
        assert_eq!(bitmap.data().len(), 2 * 13);
        assert_eq!(unpack_banded(&bitmap, 10), grid);
    }

    #[test]
    fn raster_all_black_16x8() {
        let mut grid = MonochromeGrid::new(16, 8);
        for y in 0..8 {
            for x in 0..16 {
                grid.set(x, y, true);
            }
        }
        let bitmap = pack(&grid, Layout::Raster);

        assert_eq!(
            bitmap.geometry(),
            Geometry::Raster {
                bytes_per_row: 2,
                height: 8
            }
        );
        assert_eq!(bitmap.data().len(), 16);
        assert!(bitmap.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn raster_row_padding_is_zero() {
        let grid = MonochromeGrid::from_rows(&[[true; 9]]).unwrap();
        let bitmap = pack(&grid, Layout::Raster);
        assert_eq!(bitmap.data(), &[0xFF, 0x80]);
    }

    #[test]
    fn banded_all_white_8x10() {
        let grid = MonochromeGrid::new(8, 10);
        let bitmap = pack(&grid, Layout::Banded);

        assert_eq!(bitmap.geometry(), Geometry::Banded { bands: 2, width: 8 });
        assert_eq!(bitmap.band(1), Some(&[0u8; 8][..]));
        assert!(bitmap.band(2).is_none());
    }

    #[test]
    fn banded_padding_rows_stay_clear() {
        let mut grid = MonochromeGrid::new(2, 10);
        for y in 0..10 {
            grid.set(0, y, true);
        }
        let bitmap = pack(&grid, Layout::Banded);

        assert_eq!(bitmap.band(0), Some(&[0xFF, 0x00][..]));
        // rows 8 and 9 map to bits 0 and 1, rows 10..15 do not exist
        assert_eq!(bitmap.band(1), Some(&[0b0000_0011, 0x00][..]));
    }

    #[test]
    fn banded_bit_zero_is_top_row() {
        let mut grid = MonochromeGrid::new(1, 8);
        grid.set(0, 0, true);
        let bitmap = pack(&grid, Layout::Banded);
        assert_eq!(bitmap.data(), &[0x01]);
    }

    #[test]
    fn raster_bitmap_has_no_bands() {
        let bitmap = pack(&MonochromeGrid::new(8, 8), Layout::Raster);
        assert_eq!(bitmap.bands().count(), 0);
        assert!(bitmap.band(0).is_none());
    }

    #[test]
    fn parses_layout_names() {
        assert_eq!("raster".parse::<Layout>().unwrap(), Layout::Raster);
        assert_eq!("bit-image".parse::<Layout>().unwrap(), Layout::Banded);
        assert_eq!("BANDED".parse::<Layout>().unwrap(), Layout::Banded);
        assert!(matches!(
            "column".parse::<Layout>(),
            Err(Error::UnknownLayout(_))
        ));
    }
}
