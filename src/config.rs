//! Print job settings and the paper geometry derived from them.

use std::path::{Path, PathBuf};

use crate::{bitmap::Layout, dither::DitherAlgorithm, error::Error};

/// Standard thermal printer resolution.
pub const DPI_203: u32 = 203;
/// High quality thermal printer resolution.
pub const DPI_300: u32 = 300;
/// Older thermal printer models.
pub const DPI_180: u32 = 180;

pub const PAPER_WIDTH_58MM: u32 = 58;
pub const PAPER_WIDTH_80MM: u32 = 80;

pub const DEFAULT_DEBUG_IMAGE_PATH: &str = "debug_output.png";

const MM_PER_INCH: f64 = 25.4;

/// Print job configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    paper_width_mm: u32,
    dpi: u32,
    dithering: DitherAlgorithm,
    layout: Layout,
    caption: Option<String>,
    cut_paper: bool,
    debug_output: bool,
    debug_image_path: PathBuf,
}

impl Config {
    /// Initialize configuration data with default values.
    ///
    /// 80mm paper at 203 DPI, Floyd-Steinberg dithering, raster layout, no
    /// caption, no cut and no debug capture.
    ///
    /// # Example
    ///
    /// ```
    /// use escpos_img::{Config, DitherAlgorithm, Layout};
    ///
    /// let config = Config::new()
    ///     .paper_width_mm(58)
    ///     .dithering(DitherAlgorithm::Atkinson)
    ///     .layout(Layout::Banded)
    ///     .cut_paper(true);
    /// assert_eq!(config.pixel_width(), 464);
    /// ```
    ///
    pub fn new() -> Config {
        Config {
            paper_width_mm: PAPER_WIDTH_80MM,
            dpi: DPI_203,
            dithering: DitherAlgorithm::FloydSteinberg,
            layout: Layout::Raster,
            caption: None,
            cut_paper: false,
            debug_output: false,
            debug_image_path: PathBuf::from(DEFAULT_DEBUG_IMAGE_PATH),
        }
    }

    pub fn paper_width_mm(self, paper_width_mm: u32) -> Self {
        Config {
            paper_width_mm,
            ..self
        }
    }

    pub fn dpi(self, dpi: u32) -> Self {
        Config { dpi, ..self }
    }

    pub fn dithering(self, dithering: DitherAlgorithm) -> Self {
        Config { dithering, ..self }
    }

    pub fn layout(self, layout: Layout) -> Self {
        Config { layout, ..self }
    }

    /// Text printed above the image. An empty string disables it.
    pub fn caption(self, text: impl Into<String>) -> Self {
        let text = text.into();
        Config {
            caption: if text.is_empty() { None } else { Some(text) },
            ..self
        }
    }

    pub fn cut_paper(self, flag: bool) -> Self {
        Config {
            cut_paper: flag,
            ..self
        }
    }

    /// Save the dithered image as PNG at `path` before encoding.
    pub fn debug_capture(self, path: impl Into<PathBuf>) -> Self {
        Config {
            debug_output: true,
            debug_image_path: path.into(),
            ..self
        }
    }

    pub fn disable_debug_capture(self) -> Self {
        Config {
            debug_output: false,
            ..self
        }
    }

    pub fn get_paper_width_mm(&self) -> u32 {
        self.paper_width_mm
    }

    pub fn get_dpi(&self) -> u32 {
        self.dpi
    }

    pub fn get_dithering(&self) -> DitherAlgorithm {
        self.dithering
    }

    pub fn get_layout(&self) -> Layout {
        self.layout
    }

    pub fn get_caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn is_cut_paper(&self) -> bool {
        self.cut_paper
    }

    /// Debug image path when capture is enabled.
    pub fn get_debug_capture(&self) -> Option<&Path> {
        if self.debug_output {
            Some(self.debug_image_path.as_path())
        } else {
            None
        }
    }

    /// Printable width in dots.
    ///
    /// The physical width `paper_width_mm / 25.4 * dpi` is snapped to the
    /// nearest multiple of 8 so raster rows carry no padding bits. The result
    /// may exceed the physical width by up to 4 dots (80 mm at 180 DPI is
    /// 566.9 dots and yields 568); printers clip the overhang.
    pub fn pixel_width(&self) -> u32 {
        let dots = f64::from(self.paper_width_mm) / MM_PER_INCH * f64::from(self.dpi);
        ((dots / 8.0).round() as u32) * 8
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.paper_width_mm == 0 {
            return Err(Error::InvalidConfig("paper width must be positive".to_string()));
        }
        if self.dpi == 0 {
            return Err(Error::InvalidConfig("DPI must be positive".to_string()));
        }
        if self.pixel_width() == 0 {
            return Err(Error::InvalidConfig(format!(
                "{}mm at {} DPI is narrower than one byte",
                self.paper_width_mm, self.dpi
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
