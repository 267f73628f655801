//! End to end print job: image in, ESC/POS bytes out.

use std::path::Path;

use image::DynamicImage;
use log::{debug, info, warn};

use crate::{
    bitmap::pack,
    command::{encode, CommandBuffer},
    config::Config,
    dither::dither,
    error::Error,
    grayscale::LuminanceGrid,
    loader,
    output::Output,
};

/// A stage boundary reported to an [`Observer`].
#[derive(Debug)]
pub enum Event<'a> {
    Scaled { width: u32, height: u32 },
    Dithered { algorithm: &'a str, black_pixels: usize },
    DebugCaptured { path: &'a Path },
    DebugCaptureFailed { error: &'a Error },
    Packed { layout: &'a str, bytes: usize },
    Encoded { bytes: usize },
}

/// Receives stage boundaries from [`process_with`].
///
/// The stages themselves never log; whatever wants to watch a job plugs in
/// here.
pub trait Observer {
    fn on_event(&self, event: &Event<'_>);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_event(&self, event: &Event<'_>) {
        match event {
            Event::DebugCaptureFailed { error } => warn!("Failed to save debug image: {}", error),
            Event::DebugCaptured { path } => info!("Debug image saved to {:?}", path),
            other => debug!("{:?}", other),
        }
    }
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_event(&self, _event: &Event<'_>) {}
}

/// Turn a decoded image into a printer command stream, logging each stage.
pub fn process(image: &DynamicImage, config: &Config) -> Result<CommandBuffer, Error> {
    process_with(image, config, &LogObserver)
}

/// Same as [`process`] but reports stage boundaries to `observer`.
///
/// A failed debug capture is reported through the observer and does not
/// stop the job.
pub fn process_with(
    image: &DynamicImage,
    config: &Config,
    observer: &dyn Observer,
) -> Result<CommandBuffer, Error> {
    config.validate()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }

    let scaled = loader::scale_to_width(image, config.pixel_width());
    observer.on_event(&Event::Scaled {
        width: scaled.width(),
        height: scaled.height(),
    });

    let gray = LuminanceGrid::from_image(&scaled);
    let mono = dither(&gray, config.get_dithering());
    observer.on_event(&Event::Dithered {
        algorithm: config.get_dithering().name(),
        black_pixels: mono.black_count(),
    });

    if let Some(path) = config.get_debug_capture() {
        match loader::save_debug_image(&mono, path) {
            Ok(()) => observer.on_event(&Event::DebugCaptured { path }),
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => observer.on_event(&Event::DebugCaptureFailed { error: &error }),
        }
    }

    let bitmap = pack(&mono, config.get_layout());
    observer.on_event(&Event::Packed {
        layout: config.get_layout().name(),
        bytes: bitmap.data().len(),
    });

    let commands = encode(&bitmap, config);
    observer.on_event(&Event::Encoded {
        bytes: commands.len(),
    });
    Ok(commands)
}

/// Load `path`, convert it and send the result to `output`.
///
/// The output is closed after a successful write.
pub fn print_file(
    path: impl AsRef<Path>,
    config: &Config,
    output: &mut dyn Output,
) -> Result<(), Error> {
    let path = path.as_ref();
    debug!("Starting image processing {:?} {:?}", path, config);

    let image = loader::load(path)?;
    let commands = process(&image, config)?;

    output.write(commands.as_bytes())?;
    output.close()?;

    info!("Image processing completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bitmap::Layout, dither::DitherAlgorithm};
    use image::{GrayImage, Luma};
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl Observer for Recorder {
        fn on_event(&self, event: &Event<'_>) {
            let name = match event {
                Event::Scaled { .. } => "scaled",
                Event::Dithered { .. } => "dithered",
                Event::DebugCaptured { .. } => "captured",
                Event::DebugCaptureFailed { .. } => "capture-failed",
                Event::Packed { .. } => "packed",
                Event::Encoded { .. } => "encoded",
            };
            self.events.borrow_mut().push(name.to_string());
        }
    }

    fn gray_image(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
    }

    #[test]
    fn reports_stages_in_order() {
        let recorder = Recorder::default();
        process_with(&gray_image(640, 16, 0), &Config::new(), &recorder).unwrap();
        assert_eq!(
            *recorder.events.borrow(),
            vec!["scaled", "dithered", "packed", "encoded"]
        );
    }

    #[test]
    fn scales_to_paper_width() {
        // 80mm at 203 DPI is 640 dots, 80 bytes per raster row
        let config = Config::new().dithering(DitherAlgorithm::Threshold);
        let commands = process_with(&gray_image(320, 4, 255), &config, &NoopObserver).unwrap();
        let bytes = commands.as_bytes();

        assert_eq!(&bytes[2..10], &[0x1D, 0x76, 0x30, 0x00, 80, 0, 8, 0]);
        assert_eq!(bytes.len(), 2 + 8 + 80 * 8 + 3);
    }

    #[test]
    fn failed_debug_capture_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new()
            .layout(Layout::Banded)
            .debug_capture(dir.path().join("missing").join("debug.png"));
        let recorder = Recorder::default();

        let result = process_with(&gray_image(640, 8, 0), &config, &recorder);

        assert!(result.is_ok());
        assert!(recorder
            .events
            .borrow()
            .contains(&"capture-failed".to_string()));
    }

    #[test]
    fn rejects_empty_image() {
        let recorder = Recorder::default();
        for &(width, height) in &[(0, 0), (0, 10), (10, 0)] {
            let result = process_with(&gray_image(width, height, 0), &Config::new(), &recorder);
            match result {
                Err(Error::EmptyImage { width: w, height: h }) => {
                    assert_eq!((w, h), (width, height));
                }
                other => panic!("expected EmptyImage, got {:?}", other),
            }
        }
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = Config::new().dpi(0);
        assert!(matches!(
            process_with(&gray_image(8, 8, 0), &config, &NoopObserver),
            Err(Error::InvalidConfig(_))
        ));
    }
}
