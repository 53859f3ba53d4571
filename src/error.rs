//! Error types for pagemark library.
//!
//! Only [`Error`] is ever returned from the public entry points. The image
//! errors are per-object outcomes: they are stored in the conversion report
//! and never abort the document.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pagemark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside of the per-page reconstruction core.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The extraction bundle could not be parsed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during rendering.
    #[error("Rendering error: {0}")]
    Render(String),
}

/// Failure to recover a single raster object.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The object declares no filter at all.
    #[error("image has no filter")]
    MissingFilter,

    /// The filter is not one the pipeline knows how to decode.
    #[error("unsupported image filter: {0}")]
    UnsupportedFilter(String),

    /// The codec rejected the payload.
    #[error("failed to decode {filter} image: {reason}")]
    Decode {
        /// Filter name the payload was decoded as
        filter: String,
        /// Decoder message
        reason: String,
    },

    /// Raw reconstruction had fewer bytes than the geometry requires.
    #[error("raw image data too short: expected {expected} bytes, got {actual}")]
    RawDataTooShort {
        /// Bytes required by width, height and color space
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Width or height is zero.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
    },

    /// Bit depth other than 1 or 8 in a raw payload.
    #[error("unsupported bits per component {bits} for {color_space}")]
    UnsupportedBitDepth {
        /// Declared bits per component
        bits: u8,
        /// Color space of the payload
        color_space: String,
    },

    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Encode(String),

    /// Writing the PNG file failed.
    #[error("failed to write {path}: {source}")]
    Persist {
        /// Target file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Failure to apply a soft mask. The image is kept without alpha.
#[derive(Error, Debug)]
pub enum MaskError {
    /// The mask object itself could not be decoded.
    #[error("soft mask could not be decoded: {0}")]
    Decode(#[from] Box<ImageError>),

    /// The decoded mask has more than one channel.
    #[error("soft mask is not single-channel ({0})")]
    NotSingleChannel(String),

    /// The mask and the image differ in size.
    #[error("soft mask is {mask_width}x{mask_height}, image is {width}x{height}")]
    SizeMismatch {
        /// Mask width
        mask_width: u32,
        /// Mask height
        mask_height: u32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },
}

/// An attached ICC profile that could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IccError {
    /// Shorter than the fixed 128-byte header plus tag count.
    #[error("ICC profile truncated ({0} bytes)")]
    Truncated(usize),

    /// The `acsp` signature is missing.
    #[error("ICC profile signature missing")]
    BadSignature,

    /// The declared size exceeds the supplied bytes.
    #[error("ICC profile declares {declared} bytes but only {actual} were supplied")]
    SizeMismatch {
        /// Size from the profile header
        declared: usize,
        /// Bytes supplied
        actual: usize,
    },
}
