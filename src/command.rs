//! ESC/POS command generation.

use crate::{
    bitmap::{pack, Bitmap, Geometry, Layout},
    config::Config,
    dither::MonochromeGrid,
};

pub const ESC: u8 = 0x1B;
pub const GS: u8 = 0x1D;
pub const LF: u8 = 0x0A;

/// ESC @ : Initialize printer
pub const INITIALIZE: [u8; 2] = [ESC, b'@'];
/// GS V 1 : Partial cut
pub const PARTIAL_CUT: [u8; 3] = [GS, b'V', 1];

const TEST_PATTERN_TEXT: &str = "ESC/POS Test Pattern";

/// Finished command stream for the printer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuffer {
    bytes: Vec<u8>,
}

impl CommandBuffer {
    fn new() -> Self {
        CommandBuffer { bytes: Vec::new() }
    }

    fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    fn extend(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn feed(&mut self, lines: usize) {
        self.bytes.extend(std::iter::repeat(LF).take(lines));
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for CommandBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Wrap a packed bitmap in the command envelope described by `config`.
///
/// Raster output ends with three line feeds and banded output with two.
/// Printers in the field are tuned to that spacing, so keep it.
pub fn encode(bitmap: &Bitmap, config: &Config) -> CommandBuffer {
    let mut buf = CommandBuffer::new();
    buf.extend(&INITIALIZE);

    if let Some(text) = config.get_caption() {
        buf.extend(text.as_bytes());
        buf.push(LF);
    }

    match bitmap.geometry() {
        Geometry::Raster {
            bytes_per_row,
            height,
        } => {
            write_raster(&mut buf, bytes_per_row, height, bitmap.data());
            buf.feed(3);
        }
        Geometry::Banded { width, .. } => {
            for band in bitmap.bands() {
                write_band(&mut buf, width, band);
            }
            buf.feed(2);
        }
    }

    if config.is_cut_paper() {
        buf.extend(&PARTIAL_CUT);
    }

    buf
}

// GS v 0 m xL xH yL yH d1...dk
fn write_raster(buf: &mut CommandBuffer, bytes_per_row: usize, height: usize, data: &[u8]) {
    buf.extend(&[GS, b'v', b'0', 0x00]); // m = 0 : normal density
    buf.extend(&le16(bytes_per_row));
    buf.extend(&le16(height));
    buf.extend(data);
}

// ESC * m nL nH d1...dk LF
fn write_band(buf: &mut CommandBuffer, width: usize, band: &[u8]) {
    buf.extend(&[ESC, b'*', 0x00]); // m = 0 : 8-dot single density
    buf.extend(&le16(width));
    buf.extend(band);
    buf.push(LF);
}

/// Low and high byte of a 16 bit field. Values above 65535 wrap.
fn le16(value: usize) -> [u8; 2] {
    (value as u16).to_le_bytes()
}

/// Diagnostic page: a caption line and an 8x8 dot checkerboard, then a cut.
pub fn test_pattern(width: usize, height: usize) -> CommandBuffer {
    let mut grid = MonochromeGrid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            grid.set(x, y, (x / 8 + y / 8) % 2 == 0);
        }
    }

    let bitmap = pack(&grid, Layout::Raster);

    let mut buf = CommandBuffer::new();
    buf.extend(&INITIALIZE);
    buf.extend(TEST_PATTERN_TEXT.as_bytes());
    buf.feed(2);
    write_raster(&mut buf, (width + 7) / 8, height, bitmap.data());
    buf.feed(2);
    buf.extend(&PARTIAL_CUT);
    buf
}
