//! Error types for image loading, configuration and printer output.
//!
//! The dithering, packing and encoding stages are total over well-formed
//! input and never produce one of these. Everything here comes from the
//! edges of the pipeline: reading the image, parsing user configuration,
//! and talking to the byte sink.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Main error type for escpos-img operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The image file could not be opened.
    #[error("failed to open image file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The image file could not be decoded.
    ///
    /// Wraps the underlying `image` crate error for corrupt or truncated
    /// files.
    #[error("failed to decode image {path:?}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The image decoded fine but is not one of the accepted formats.
    #[error("unsupported image format: {0} (supported: PNG, JPEG)")]
    UnsupportedFormat(String),

    /// The image has no pixels to print.
    #[error("image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("unknown dithering algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("unknown print mode: {0} (supported: raster, bit-image)")]
    UnknownLayout(String),

    #[error("unknown output method: {0} (supported: stdout, network, file)")]
    UnknownOutput(String),

    /// Invalid configuration parameter provided.
    ///
    /// This error occurs when configuration values are out of range,
    /// such as a zero paper width or DPI, or when an output method is
    /// missing its address or path.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The network printer could not be reached.
    #[error("failed to connect to {addr}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Writing to, flushing or closing the byte sink failed.
    ///
    /// `stage` names the operation that failed, for example `write` or
    /// `close`, and `target` the sink it was performed on.
    #[error("failed to {stage} {target}")]
    Sink {
        stage: &'static str,
        target: String,
        #[source]
        source: io::Error,
    },

    /// The dithered debug image could not be written.
    ///
    /// The pipeline reports this but keeps going.
    #[error("failed to save debug image {path:?}")]
    DebugCapture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl Error {
    /// Check if this error should abort a print job.
    ///
    /// Only a failed debug capture is tolerated.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::DebugCapture { .. })
    }

    pub(crate) fn sink(stage: &'static str, target: impl Into<String>, source: io::Error) -> Self {
        Self::Sink {
            stage,
            target: target.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_capture_is_not_fatal() {
        let err = Error::DebugCapture {
            path: PathBuf::from("debug.png"),
            source: image::ImageError::IoError(io::Error::new(io::ErrorKind::Other, "disk full")),
        };
        assert!(!err.is_fatal());
        assert!(Error::UnknownAlgorithm("sepia".to_string()).is_fatal());
        assert!(Error::EmptyImage {
            width: 0,
            height: 0
        }
        .is_fatal());
    }

    #[test]
    fn sink_error_names_stage_and_target() {
        let err = Error::sink(
            "write",
            "192.168.1.100:9100",
            io::Error::new(io::ErrorKind::BrokenPipe, "reset"),
        );
        assert_eq!(err.to_string(), "failed to write 192.168.1.100:9100");
    }
}
