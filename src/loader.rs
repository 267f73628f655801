//! Image file I/O around the core pipeline: decoding, fitting to the paper
//! width, and saving the dithered result for inspection.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader};
use log::debug;

use crate::{dither::MonochromeGrid, error::Error};

/// Load a PNG or JPEG image.
///
/// The format is sniffed from the file contents, not the extension.
pub fn load(path: impl AsRef<Path>) -> Result<DynamicImage, Error> {
    let path = path.as_ref();
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?;

    match reader.format() {
        Some(ImageFormat::Png) | Some(ImageFormat::Jpeg) => {}
        Some(other) => return Err(Error::UnsupportedFormat(format!("{:?}", other))),
        None => return Err(Error::UnsupportedFormat("unknown".to_string())),
    }
    debug!("Decoding {:?} as {:?}", path, reader.format());

    let image = reader.decode().map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Image loaded: {}x{}", image.width(), image.height());
    Ok(image)
}

/// Resize an image to a target width while maintaining aspect ratio.
///
/// Uses Lanczos3 filtering. Returns the image unchanged if it already
/// matches the target width or has no pixels.
pub fn scale_to_width(image: &DynamicImage, width: u32) -> DynamicImage {
    let (orig_w, orig_h) = (image.width(), image.height());

    if orig_w == 0 || orig_h == 0 {
        debug!("Image has no pixels, nothing to scale");
        return image.clone();
    }

    if orig_w == width {
        debug!("Image already at target width {}, no scaling needed", width);
        return image.clone();
    }

    let ratio = f64::from(width) / f64::from(orig_w);
    let new_height = ((f64::from(orig_h) * ratio).round() as u32).max(1);

    debug!(
        "Scaling image {}x{} -> {}x{}",
        orig_w, orig_h, width, new_height
    );

    image.resize_exact(width, new_height, FilterType::Lanczos3)
}

/// Save the dithered image as PNG.
pub fn save_debug_image(grid: &MonochromeGrid, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    grid.to_image()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| Error::DebugCapture {
            path: path.to_path_buf(),
            source,
        })
}
