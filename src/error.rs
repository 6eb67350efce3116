//! Error types for triviaqr operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using triviaqr's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for triviaqr operations
#[derive(Error, Debug)]
pub enum Error {
    /// Output directory or artifact file could not be created or written
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// Path that was being created or written
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Payload could not be encoded with the configured symbol parameters
    #[error("Failed to encode QR code: {0}")]
    Encoding(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attach a path to an I/O failure on the output tree.
    pub fn filesystem(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convert an image crate error raised while writing `path`.
    ///
    /// I/O causes (permissions, disk full, bad path) are filesystem errors;
    /// everything else stays an image error.
    pub fn from_image_write(path: impl AsRef<Path>, err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(source) => Error::filesystem(path, source),
            other => Error::Image(other.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<qrcode::types::QrError> for Error {
    fn from(e: qrcode::types::QrError) -> Self {
        Error::Encoding(e.to_string())
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::Config(format!("Hex color decode error: {}", e))
    }
}
