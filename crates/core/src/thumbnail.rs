//! Bounded JPEG thumbnails for image artworks.
//!
//! Derivation is best-effort: every failure is reported as
//! [`Error::ThumbnailUnavailable`] and callers are expected to carry on
//! without a thumbnail.

use crate::config::ThumbnailConfig;
use crate::error::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage};
use tracing::debug;

/// Default bounding box edge in pixels.
pub const DEFAULT_MAX_EDGE: u32 = 300;

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// MIME type of every derived thumbnail.
pub const THUMBNAIL_MIME: &str = "image/jpeg";

/// Thumbnail deriver with fixed bounds and quality.
#[derive(Clone, Debug)]
pub struct Thumbnailer {
    max_width: u32,
    max_height: u32,
    quality: u8,
}

impl Default for Thumbnailer {
    fn default() -> Self {
        Self::new(&ThumbnailConfig::default())
    }
}

impl Thumbnailer {
    pub fn new(config: &ThumbnailConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
            quality: config.jpeg_quality,
        }
    }

    /// Decode `bytes`, shrink to fit the bounding box and re-encode as JPEG.
    ///
    /// Aspect ratio is preserved and images already inside the box are not
    /// enlarged. This is CPU bound; async callers should run it on a blocking
    /// thread.
    pub fn derive(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| Error::ThumbnailUnavailable(format!("decode failed: {e}")))?;

        let rgb = flatten_to_rgb(decoded);

        let resized = if rgb.width() > self.max_width || rgb.height() > self.max_height {
            rgb.resize(self.max_width, self.max_height, FilterType::Lanczos3)
        } else {
            rgb
        };

        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, self.quality);
        resized
            .write_with_encoder(encoder)
            .map_err(|e| Error::ThumbnailUnavailable(format!("encode failed: {e}")))?;

        debug!(
            width = resized.width(),
            height = resized.height(),
            bytes = out.len(),
            "thumbnail derived"
        );
        Ok(out)
    }
}

/// JPEG has no alpha channel and only 8-bit samples.
fn flatten_to_rgb(image: DynamicImage) -> DynamicImage {
    match image.color() {
        ColorType::Rgb8 | ColorType::L8 => image,
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn transparent_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 128]));
        encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
    }

    #[test]
    fn large_image_fits_bounding_box_and_keeps_aspect() {
        let thumb = Thumbnailer::default().derive(&transparent_png(1200, 600)).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 150));
    }

    #[test]
    fn output_is_jpeg_without_alpha() {
        let thumb = Thumbnailer::default().derive(&transparent_png(64, 64)).unwrap();
        assert_eq!(
            image::guess_format(&thumb).unwrap(),
            ImageFormat::Jpeg
        );
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn small_image_is_not_enlarged() {
        let thumb = Thumbnailer::default().derive(&transparent_png(40, 20)).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 20));
    }

    #[test]
    fn tall_image_is_bounded_by_height() {
        let config = ThumbnailConfig {
            max_width: 100,
            max_height: 50,
            jpeg_quality: 70,
        };
        let thumb = Thumbnailer::new(&config)
            .derive(&transparent_png(200, 400))
            .unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (25, 50));
    }

    #[test]
    fn truncated_image_is_unavailable() {
        let mut png = transparent_png(64, 64);
        png.truncate(40);
        match Thumbnailer::default().derive(&png) {
            Err(Error::ThumbnailUnavailable(reason)) => assert!(reason.contains("decode")),
            other => panic!("expected ThumbnailUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_unavailable() {
        assert!(Thumbnailer::default().derive(b"not an image").is_err());
    }
}
