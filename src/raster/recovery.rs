//! Per-page image recovery: decode, mask, flatten, name and persist.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder};
use serde::{Deserialize, Serialize};

use super::color::{check_mask, flatten, with_alpha};
use super::decode::{decode, decode_mask};
use super::icc::IccProfile;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{ImageError, MaskError};
use crate::model::ImageAsset;
use crate::source::RasterObject;

/// Link prefix used when none is configured.
pub const DEFAULT_LINK_PREFIX: &str = "../output/images/";

/// Options for image recovery.
#[derive(Debug, Clone)]
pub struct ImageOptions {
    /// Whether to recover images at all
    pub extract: bool,

    /// Directory PNG files are written to; nothing is written when `None`
    pub images_dir: Option<PathBuf>,

    /// Prefix joined with the file name to form the Markdown link
    pub link_prefix: String,
}

impl ImageOptions {
    /// Create new image options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write PNG files to the given directory.
    pub fn with_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = Some(dir.into());
        self
    }

    /// Set the link prefix.
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.link_prefix = prefix.into();
        self
    }

    /// Skip image recovery entirely.
    pub fn skip_images(mut self) -> Self {
        self.extract = false;
        self
    }
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            extract: true,
            images_dir: None,
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
        }
    }
}

/// Hands out per-page ordinals starting at 1.
///
/// Ordinals are never reused, even when a page is fed more than once.
#[derive(Debug, Clone, Default)]
pub struct OrdinalAllocator {
    issued: HashMap<u32, u32>,
}

impl OrdinalAllocator {
    /// Create an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next ordinal for a page.
    pub fn next(&mut self, page: u32) -> u32 {
        let last = self.issued.entry(page).or_insert(0);
        *last += 1;
        *last
    }

    /// Number of ordinals issued for a page so far.
    pub fn issued(&self, page: u32) -> u32 {
        self.issued.get(&page).copied().unwrap_or(0)
    }
}

/// A raster object that could not be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFailure {
    /// Page number (1-indexed)
    pub page: u32,

    /// Position of the object on its page (0-based)
    pub object_index: usize,

    /// Failure description
    pub reason: String,
}

/// Image recovery pipeline.
pub struct ImageRecovery {
    options: ImageOptions,
    ordinals: OrdinalAllocator,
}

impl ImageRecovery {
    /// Create a pipeline with the given options.
    pub fn new(options: ImageOptions) -> Self {
        Self {
            options,
            ordinals: OrdinalAllocator::new(),
        }
    }

    /// Get the options in use.
    pub fn options(&self) -> &ImageOptions {
        &self.options
    }

    /// Recover every object on a page, in declaration order.
    ///
    /// A failed object is reported and never affects the objects after it.
    pub fn recover_page(
        &mut self,
        page: u32,
        objects: &[RasterObject],
        diagnostics: &mut Diagnostics,
    ) -> Vec<Result<ImageAsset, ImageError>> {
        if !self.options.extract {
            return Vec::new();
        }

        objects
            .iter()
            .enumerate()
            .map(|(index, obj)| {
                let result = self.recover_object(page, index, obj, diagnostics);
                if let Err(ref e) = result {
                    diagnostics.push(
                        page,
                        DiagnosticKind::ImageSkipped {
                            object_index: index,
                            reason: e.to_string(),
                        },
                    );
                }
                result
            })
            .collect()
    }

    /// Recover a single object.
    pub fn recover_object(
        &mut self,
        page: u32,
        index: usize,
        obj: &RasterObject,
        diagnostics: &mut Diagnostics,
    ) -> Result<ImageAsset, ImageError> {
        let decoded = decode(obj)?;
        if let Some(color_space) = decoded.raw {
            diagnostics.push(
                page,
                DiagnosticKind::RawReconstruction {
                    object_index: index,
                    color_space: color_space.name().to_string(),
                },
            );
        }
        let mut image = decoded.image;

        let icc_profile = obj
            .icc_profile
            .as_deref()
            .and_then(|bytes| usable_profile(bytes, page, index, diagnostics));

        if let Some(ref mask) = obj.soft_mask {
            let alpha = decode_mask(mask)
                .map_err(|e| MaskError::Decode(Box::new(e)))
                .and_then(|decoded| check_mask(&image, &decoded.image));
            match alpha {
                Ok(alpha) => image = with_alpha(image, &alpha),
                Err(e) => diagnostics.push(
                    page,
                    DiagnosticKind::MaskIgnored {
                        object_index: index,
                        reason: e.to_string(),
                    },
                ),
            }
        }

        let (color_mode, image) = flatten(image);
        let png = encode_png(&image, icc_profile.clone())?;

        let ordinal = self.ordinals.next(page);
        let file_name = ImageAsset::file_name_for(page, ordinal);

        if let Some(ref dir) = self.options.images_dir {
            persist(dir, &file_name, &png)?;
            diagnostics.push(
                page,
                DiagnosticKind::ImageSaved {
                    file_name: file_name.clone(),
                },
            );
        }

        Ok(ImageAsset {
            page,
            ordinal,
            color_mode,
            width: image.width(),
            height: image.height(),
            pixels: image.into_bytes(),
            icc_profile,
            alt_text: ImageAsset::alt_text_for(page),
            relative_path: format!("{}{}", self.options.link_prefix, file_name),
            file_name,
        })
    }
}

impl Default for ImageRecovery {
    fn default() -> Self {
        Self::new(ImageOptions::default())
    }
}

fn usable_profile(bytes: &[u8], page: u32, index: usize, diagnostics: &mut Diagnostics) -> Option<Vec<u8>> {
    let reason = match IccProfile::parse(bytes) {
        Ok(profile) if profile.is_rgb() => return Some(profile.into_bytes()),
        Ok(profile) => format!("profile color space {:?} is not RGB", profile.color_space().trim()),
        Err(e) => e.to_string(),
    };
    diagnostics.push(
        page,
        DiagnosticKind::IccProfileIgnored {
            object_index: index,
            reason,
        },
    );
    None
}

/// Encode as PNG, embedding the ICC profile when the encoder accepts it.
pub fn encode_png(image: &DynamicImage, icc_profile: Option<Vec<u8>>) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    let mut encoder = PngEncoder::new(&mut buf);
    if let Some(profile) = icc_profile {
        if let Err(e) = encoder.set_icc_profile(profile) {
            log::warn!("ICC profile not embedded: {}", e);
        }
    }
    encoder
        .write_image(image.as_bytes(), image.width(), image.height(), image.color().into())
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buf)
}

fn persist(dir: &Path, file_name: &str, png: &[u8]) -> Result<(), ImageError> {
    let path = dir.join(file_name);
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, png))
        .map_err(|source| ImageError::Persist { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColorMode;
    use crate::raster::icc::test_profile;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn gray_object() -> RasterObject {
        RasterObject::new("FlateDecode", 4, 2, zlib(&[0, 32, 64, 96, 128, 160, 192, 255]))
            .with_color_space("DeviceGray")
    }

    #[test]
    fn test_ordinal_allocator() {
        let mut ordinals = OrdinalAllocator::new();
        assert_eq!(ordinals.next(2), 1);
        assert_eq!(ordinals.next(2), 2);
        assert_eq!(ordinals.next(5), 1);
        assert_eq!(ordinals.issued(2), 2);
        assert_eq!(ordinals.issued(9), 0);
    }

    #[test]
    fn test_gray_raw_flate_saved_opaque() {
        let dir = TempDir::new().unwrap();
        let mut recovery = ImageRecovery::new(ImageOptions::new().with_images_dir(dir.path()));
        let mut diags = Diagnostics::new();

        let asset = recovery
            .recover_object(3, 0, &gray_object(), &mut diags)
            .unwrap();

        assert_eq!(asset.file_name, "image_3_1.png");
        assert_eq!(asset.relative_path, "../output/images/image_3_1.png");
        assert_eq!(asset.color_mode, ColorMode::Rgba);
        assert!(asset.is_opaque());

        let saved = image::open(dir.path().join("image_3_1.png")).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (4, 2));
        assert!(saved.pixels().all(|p| p.0[3] == 255));
        assert_eq!(saved.get_pixel(1, 0).0, [32, 32, 32, 255]);

        assert!(diags
            .events()
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::RawReconstruction { .. })));
    }

    #[test]
    fn test_failure_does_not_consume_ordinal() {
        let mut recovery = ImageRecovery::default();
        let mut diags = Diagnostics::new();
        let objects = vec![
            gray_object(),
            RasterObject::new("LZWDecode", 1, 1, vec![0]),
            gray_object(),
        ];

        let results = recovery.recover_page(1, &objects, &mut diags);
        assert_eq!(results.len(), 3);
        assert!(results[1].is_err());
        let names: Vec<_> = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|a| a.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["image_1_1.png", "image_1_2.png"]);
        assert!(diags.events().iter().any(|d| matches!(
            d.kind,
            DiagnosticKind::ImageSkipped { object_index: 1, .. }
        )));
    }

    #[test]
    fn test_repeated_page_keeps_counting() {
        let mut recovery = ImageRecovery::default();
        let mut diags = Diagnostics::new();
        recovery.recover_page(1, &[gray_object()], &mut diags);
        let again = recovery.recover_page(1, &[gray_object()], &mut diags);
        assert_eq!(again[0].as_ref().unwrap().ordinal, 2);
    }

    #[test]
    fn test_extract_disabled() {
        let mut recovery = ImageRecovery::new(ImageOptions::new().skip_images());
        let mut diags = Diagnostics::new();
        assert!(recovery.recover_page(1, &[gray_object()], &mut diags).is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn test_soft_mask_applied_then_flattened() {
        let rgb = RasterObject::new("FlateDecode", 2, 1, vec![0, 0, 0, 0, 0, 0])
            .with_soft_mask(RasterObject::new("FlateDecode", 2, 1, vec![0, 255]));
        let mut diags = Diagnostics::new();
        let asset = ImageRecovery::default()
            .recover_object(1, 0, &rgb, &mut diags)
            .unwrap();

        assert_eq!(asset.color_mode, ColorMode::Rgba);
        assert_eq!(asset.pixels, vec![255, 255, 255, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_bad_mask_ignored() {
        let rgb = RasterObject::new("FlateDecode", 2, 1, vec![9; 6])
            .with_soft_mask(RasterObject::new("FlateDecode", 3, 1, vec![0, 0, 0]));
        let mut diags = Diagnostics::new();
        let asset = ImageRecovery::default()
            .recover_object(1, 0, &rgb, &mut diags)
            .unwrap();

        assert_eq!(asset.color_mode, ColorMode::Rgb);
        assert!(diags
            .events()
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::MaskIgnored { .. })));
    }

    #[test]
    fn test_icc_profiles() {
        let mut diags = Diagnostics::new();
        let mut recovery = ImageRecovery::default();

        let with_rgb = RasterObject::new("FlateDecode", 1, 1, vec![1, 2, 3])
            .with_icc_profile(test_profile(b"RGB "));
        let asset = recovery.recover_object(1, 0, &with_rgb, &mut diags).unwrap();
        assert_eq!(asset.icc_profile.map(|p| p.len()), Some(200));

        let with_gray = RasterObject::new("FlateDecode", 1, 1, vec![1, 2, 3])
            .with_icc_profile(test_profile(b"GRAY"));
        let asset = recovery.recover_object(1, 1, &with_gray, &mut diags).unwrap();
        assert!(asset.icc_profile.is_none());

        let broken = RasterObject::new("FlateDecode", 1, 1, vec![1, 2, 3]).with_icc_profile(vec![0; 8]);
        assert!(recovery.recover_object(1, 2, &broken, &mut diags).is_ok());

        let ignored = diags
            .events()
            .iter()
            .filter(|d| matches!(d.kind, DiagnosticKind::IccProfileIgnored { .. }))
            .count();
        assert_eq!(ignored, 2);
    }

    #[test]
    fn test_persist_failure_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let mut recovery = ImageRecovery::new(ImageOptions::new().with_images_dir(&blocker));
        let result = recovery.recover_object(1, 0, &gray_object(), &mut Diagnostics::new());
        assert!(matches!(result, Err(ImageError::Persist { .. })));
    }
}
