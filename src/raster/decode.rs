//! Decoding raster objects into pixel buffers.

use std::borrow::Cow;
use std::io::Read;

use flate2::read::ZlibDecoder;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

use crate::error::ImageError;
use crate::source::RasterObject;

/// Stream filters the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// JPEG
    Dct,
    /// JPEG 2000
    Jpx,
    /// CCITT Group 3/4 fax, carried as a TIFF container
    CcittFax,
    /// Zlib/deflate, either a complete image file or raw samples
    Flate,
}

impl ImageFilter {
    /// Map a PDF filter name (with or without the leading slash).
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        match name.trim_start_matches('/') {
            "DCTDecode" | "DCT" => Some(ImageFilter::Dct),
            "JPXDecode" => Some(ImageFilter::Jpx),
            "CCITTFaxDecode" | "CCF" => Some(ImageFilter::CcittFax),
            "FlateDecode" | "Fl" => Some(ImageFilter::Flate),
            _ => None,
        }
    }

    /// Canonical PDF name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ImageFilter::Dct => "DCTDecode",
            ImageFilter::Jpx => "JPXDecode",
            ImageFilter::CcittFax => "CCITTFaxDecode",
            ImageFilter::Flate => "FlateDecode",
        }
    }
}

/// Color space used to interpret raw samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawColorSpace {
    /// Three components
    Rgb,
    /// One component
    Gray,
    /// Four components
    Cmyk,
}

impl RawColorSpace {
    /// Map a PDF color space name; anything unrecognized is read as RGB.
    pub fn from_pdf_name(name: &str) -> Self {
        match name.trim_start_matches('/') {
            "DeviceGray" | "G" | "CalGray" => RawColorSpace::Gray,
            "DeviceCMYK" | "CMYK" => RawColorSpace::Cmyk,
            _ => RawColorSpace::Rgb,
        }
    }

    /// Components per pixel.
    pub fn components(&self) -> usize {
        match self {
            RawColorSpace::Rgb => 3,
            RawColorSpace::Gray => 1,
            RawColorSpace::Cmyk => 4,
        }
    }

    /// Display name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            RawColorSpace::Rgb => "RGB",
            RawColorSpace::Gray => "Gray",
            RawColorSpace::Cmyk => "CMYK",
        }
    }
}

/// A decoded object.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Decoded pixels (CMYK samples are already converted to RGB)
    pub image: DynamicImage,

    /// Set when the pixels were rebuilt from raw samples
    pub raw: Option<RawColorSpace>,
}

/// Decode an image object. Raw samples without a color space are read as RGB.
pub fn decode(obj: &RasterObject) -> Result<Decoded, ImageError> {
    decode_with_default(obj, RawColorSpace::Rgb)
}

/// Decode a soft mask object. Raw samples without a color space are read as gray.
pub fn decode_mask(obj: &RasterObject) -> Result<Decoded, ImageError> {
    decode_with_default(obj, RawColorSpace::Gray)
}

fn decode_with_default(obj: &RasterObject, default: RawColorSpace) -> Result<Decoded, ImageError> {
    let name = obj.filter_name().ok_or(ImageError::MissingFilter)?;
    let filter = ImageFilter::from_pdf_name(name)
        .ok_or_else(|| ImageError::UnsupportedFilter(name.to_string()))?;

    let image = match filter {
        ImageFilter::Dct => load(&obj.data, Some(ImageFormat::Jpeg), filter)?,
        ImageFilter::Jpx => load(&obj.data, None, filter)?,
        ImageFilter::CcittFax => load(&obj.data, Some(ImageFormat::Tiff), filter)?,
        ImageFilter::Flate => {
            if let Some(format) = sniff_container(&obj.data) {
                match load(&obj.data, Some(format), filter) {
                    Ok(image) => return Ok(Decoded { image, raw: None }),
                    Err(e) => log::debug!("container decode failed, using raw samples: {}", e),
                }
            }

            let color_space = obj
                .color_space_name()
                .map(RawColorSpace::from_pdf_name)
                .unwrap_or(default);
            let image = reconstruct_raw(obj, color_space)?;
            return Ok(Decoded {
                image,
                raw: Some(color_space),
            });
        }
    };

    Ok(Decoded { image, raw: None })
}

fn load(data: &[u8], format: Option<ImageFormat>, filter: ImageFilter) -> Result<DynamicImage, ImageError> {
    let result = match format {
        Some(format) => image::load_from_memory_with_format(data, format),
        None => image::load_from_memory(data),
    };
    result.map_err(|e| ImageError::Decode {
        filter: filter.pdf_name().to_string(),
        reason: e.to_string(),
    })
}

/// Detect a decodable image file by its magic bytes.
pub fn sniff_container(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }

    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(ImageFormat::Png);
    }

    // little-endian or big-endian TIFF
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Some(ImageFormat::Tiff);
    }

    None
}

/// Rebuild pixels from raw samples using the declared geometry.
///
/// 8-bit samples are supported in every color space, 1-bit samples in
/// gray. Payloads shorter than the geometry requires are inflated first;
/// surplus bytes are ignored.
pub fn reconstruct_raw(obj: &RasterObject, color_space: RawColorSpace) -> Result<DynamicImage, ImageError> {
    let (width, height) = (obj.width, obj.height);
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }

    let bits = obj.bits_per_component.unwrap_or(8);
    let row_bytes = match (bits, color_space) {
        (8, cs) => (width as usize).checked_mul(cs.components()),
        (1, RawColorSpace::Gray) => Some((width as usize).div_ceil(8)),
        _ => {
            return Err(ImageError::UnsupportedBitDepth {
                bits,
                color_space: color_space.name().to_string(),
            })
        }
    };
    let expected = row_bytes
        .and_then(|row| row.checked_mul(height as usize))
        .ok_or(ImageError::InvalidDimensions { width, height })?;

    let samples = samples_for(&obj.data, expected)?;
    let samples = &samples[..expected];

    let image = match (bits, color_space) {
        (1, _) => GrayImage::from_raw(width, height, expand_1bit(samples, width, height))
            .map(DynamicImage::ImageLuma8),
        (_, RawColorSpace::Gray) => {
            GrayImage::from_raw(width, height, samples.to_vec()).map(DynamicImage::ImageLuma8)
        }
        (_, RawColorSpace::Rgb) => {
            RgbImage::from_raw(width, height, samples.to_vec()).map(DynamicImage::ImageRgb8)
        }
        (_, RawColorSpace::Cmyk) => {
            RgbImage::from_raw(width, height, cmyk_to_rgb(samples)).map(DynamicImage::ImageRgb8)
        }
    };

    image.ok_or(ImageError::InvalidDimensions { width, height })
}

fn samples_for(data: &[u8], expected: usize) -> Result<Cow<'_, [u8]>, ImageError> {
    if data.len() < expected || looks_like_zlib(data) {
        if let Some(inflated) = inflate(data) {
            if inflated.len() >= expected {
                return Ok(Cow::Owned(inflated));
            }
        }
    }

    if data.len() < expected {
        return Err(ImageError::RawDataTooShort {
            expected,
            actual: data.len(),
        });
    }
    Ok(Cow::Borrowed(data))
}

fn looks_like_zlib(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] & 0x0F == 8 && (u16::from(data[0]) << 8 | u16::from(data[1])) % 31 == 0
}

fn inflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out).ok()?;
    Some(out)
}

/// Expand packed 1-bit gray rows (MSB first, 1 = white) to 8-bit.
fn expand_1bit(samples: &[u8], width: u32, height: u32) -> Vec<u8> {
    let row_bytes = (width as usize).div_ceil(8);
    let mut out = Vec::with_capacity(width as usize * height as usize);
    for row in samples.chunks_exact(row_bytes).take(height as usize) {
        for x in 0..width as usize {
            let bit = (row[x / 8] >> (7 - (x % 8))) & 1;
            out.push(if bit == 1 { u8::MAX } else { 0 });
        }
    }
    out
}

/// Naive CMYK to RGB: each channel is `(255 - c) * (255 - k) / 255`.
pub fn cmyk_to_rgb(samples: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() / 4 * 3);
    for px in samples.chunks_exact(4) {
        let k = 255 - u16::from(px[3]);
        for &c in &px[..3] {
            out.push(((255 - u16::from(c)) * k / 255) as u8);
        }
    }
    out
}
