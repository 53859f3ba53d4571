//! Image recovery from raster objects.
//!
//! Each object is decoded according to its filter, optionally combined
//! with its soft mask, flattened onto an opaque background and written as
//! PNG. Failures are reported per object.

pub mod color;
pub mod decode;
pub mod icc;
mod recovery;

pub use decode::{Decoded, ImageFilter, RawColorSpace};
pub use icc::IccProfile;
pub use recovery::{
    encode_png, ImageFailure, ImageOptions, ImageRecovery, OrdinalAllocator, DEFAULT_LINK_PREFIX,
};
