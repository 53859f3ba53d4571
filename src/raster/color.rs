//! Soft masks and flattening to an opaque RGB/RGBA buffer.

use image::{DynamicImage, GrayAlphaImage, GrayImage, LumaA, RgbaImage};

use crate::error::MaskError;
use crate::model::ColorMode;

/// Check that a decoded soft mask can serve as alpha for `image`.
pub fn check_mask(image: &DynamicImage, mask: &DynamicImage) -> Result<GrayImage, MaskError> {
    let alpha = match mask {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        DynamicImage::ImageLuma16(_) => mask.to_luma8(),
        other => return Err(MaskError::NotSingleChannel(format!("{:?}", other.color()))),
    };

    if alpha.dimensions() != (image.width(), image.height()) {
        return Err(MaskError::SizeMismatch {
            mask_width: alpha.width(),
            mask_height: alpha.height(),
            width: image.width(),
            height: image.height(),
        });
    }

    Ok(alpha)
}

/// Attach an alpha channel. Gray images become gray+alpha, everything else RGBA.
pub fn with_alpha(image: DynamicImage, alpha: &GrayImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => {
            let gray = image.to_luma8();
            let mut out = GrayAlphaImage::new(gray.width(), gray.height());
            for (x, y, px) in out.enumerate_pixels_mut() {
                *px = LumaA([gray.get_pixel(x, y).0[0], alpha.get_pixel(x, y).0[0]]);
            }
            DynamicImage::ImageLumaA8(out)
        }
        other => {
            let mut rgba = other.to_rgba8();
            for (x, y, px) in rgba.enumerate_pixels_mut() {
                px.0[3] = alpha.get_pixel(x, y).0[0];
            }
            DynamicImage::ImageRgba8(rgba)
        }
    }
}

/// Flatten to 8-bit RGB or fully opaque RGBA.
///
/// RGB input stays RGB. Every other layout is expanded to RGBA and
/// composited over white, so the result never carries transparency.
pub fn flatten(image: DynamicImage) -> (ColorMode, DynamicImage) {
    match image {
        DynamicImage::ImageRgb8(_) => (ColorMode::Rgb, image),
        DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgb32F(_) => {
            (ColorMode::Rgb, DynamicImage::ImageRgb8(image.to_rgb8()))
        }
        other => {
            let mut rgba = other.to_rgba8();
            composite_on_white(&mut rgba);
            (ColorMode::Rgba, DynamicImage::ImageRgba8(rgba))
        }
    }
}

/// Blend every pixel over opaque white.
pub fn composite_on_white(rgba: &mut RgbaImage) {
    for px in rgba.pixels_mut() {
        let alpha = u32::from(px.0[3]);
        for c in &mut px.0[..3] {
            *c = ((u32::from(*c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        }
        px.0[3] = u8::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage, Rgba};

    #[test]
    fn test_check_mask_size() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let mask = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        assert!(matches!(
            check_mask(&image, &mask),
            Err(MaskError::SizeMismatch {
                mask_width: 2,
                width: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_check_mask_channels() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        let mask = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert!(matches!(
            check_mask(&image, &mask),
            Err(MaskError::NotSingleChannel(_))
        ));
    }

    #[test]
    fn test_gray_with_alpha() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([40])));
        let alpha = GrayImage::from_pixel(1, 1, Luma([0]));
        let out = with_alpha(gray, &alpha);
        assert_eq!(out.as_luma_alpha8().unwrap().get_pixel(0, 0).0, [40, 0]);
    }

    #[test]
    fn test_flatten_rgb_untouched() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 1, Rgb([1, 2, 3])));
        let (mode, out) = flatten(rgb);
        assert_eq!(mode, ColorMode::Rgb);
        assert_eq!(out.as_rgb8().unwrap().as_raw(), &vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_flatten_composites_on_white() {
        let mut rgba = RgbaImage::new(3, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        rgba.put_pixel(2, 0, Rgba([0, 0, 0, 128]));

        let (mode, out) = flatten(DynamicImage::ImageRgba8(rgba));
        assert_eq!(mode, ColorMode::Rgba);
        let out = out.as_rgba8().unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(1, 0).0, [0, 0, 0, 255]);
        assert_eq!(out.get_pixel(2, 0).0, [127, 127, 127, 255]);
    }

    #[test]
    fn test_flatten_gray_is_opaque_rgba() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([90])));
        let (mode, out) = flatten(gray);
        assert_eq!(mode, ColorMode::Rgba);
        assert!(out.as_rgba8().unwrap().pixels().all(|p| p.0 == [90, 90, 90, 255]));
    }
}
