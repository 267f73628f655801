//! ESC/POS image printing
//!
//! This crate turns raster images into ESC/POS command streams for thermal
//! receipt printers: the image is scaled to the paper width, reduced to
//! luminance, dithered to black and white, bit packed and wrapped in printer
//! commands.
//!
//! # Example
//!
//! ```rust,no_run
//! use escpos_img::{print_file, Config, DitherAlgorithm, NetworkOutput};
//!
//! let config = Config::new()
//!     .dithering(DitherAlgorithm::Atkinson)
//!     .cut_paper(true);
//! let mut printer = NetworkOutput::connect("192.168.1.100:9100").unwrap();
//! print_file("receipt.png", &config, &mut printer).unwrap();
//! ```

mod bitmap;
mod command;
mod config;
mod dither;
mod error;
mod grayscale;
mod loader;
mod output;
mod pipeline;

pub use crate::{
    bitmap::{pack, Bitmap, Geometry, Layout, BAND_HEIGHT},
    command::{encode, test_pattern, CommandBuffer},
    config::{
        Config, DEFAULT_DEBUG_IMAGE_PATH, DPI_180, DPI_203, DPI_300, PAPER_WIDTH_58MM,
        PAPER_WIDTH_80MM,
    },
    dither::{dither, DitherAlgorithm, Kernel, MonochromeGrid, BAYER_4X4},
    error::Error,
    grayscale::LuminanceGrid,
    loader::{load, save_debug_image, scale_to_width},
    output::{open_output, FileOutput, NetworkOutput, Output, OutputKind, StdoutOutput},
    pipeline::{print_file, process, process_with, Event, LogObserver, NoopObserver, Observer},
};

/// Crate version, as printed by `escpos-img --version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
