//! Error types for M5K handling.

use thiserror::Error;

/// Errors that can occur when working with M5K containers.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] geddon_common::Error),

    /// Compressed size field is negative.
    #[error("invalid pixel block size: {0}")]
    InvalidBlockSize(i32),

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Image has no pixel data to encode.
    #[error("image has no pixel data")]
    EmptyImage,

    /// Image encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for M5K operations.
pub type Result<T> = std::result::Result<T, Error>;
