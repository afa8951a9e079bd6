//! Decode/render/encode backends
//!
//! The compression pipeline only talks to an [`ImageBackend`]. Production code
//! uses [`RasterBackend`] on top of the `image` crate (with `oxipng` for PNG);
//! tests swap in a fake that never touches pixels.

use crate::constants::{
    AVIF_SPEED, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, OXIPNG_PRESET, ZOPFLI_ITERATIONS,
};
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use oxipng::{Deflaters, Options};
use std::io::Cursor;
use std::num::NonZeroU8;

/// Opaque RGB color a surface is pre-filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 3]);

impl Background {
    pub const WHITE: Background = Background([255, 255, 255]);
}

pub trait ImageBackend: Send + Sync {
    /// In-memory bitmap the backend works on.
    type Surface;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Surface>;

    fn dimensions(&self, surface: &Self::Surface) -> (u32, u32);

    /// Draws `surface` scaled to `width` x `height`, optionally over an opaque background.
    fn render(
        &self,
        surface: &Self::Surface,
        width: u32,
        height: u32,
        background: Option<Background>,
    ) -> Result<Self::Surface>;

    fn supports(&self, kind: ImageKind) -> bool;

    /// `quality` is in [0, 1]; lossless encoders ignore it.
    fn encode(&self, surface: &Self::Surface, kind: ImageKind, quality: f32) -> Result<Vec<u8>>;
}

/// Maps a [0, 1] quality to the 1..=100 scale used by the encoders.
pub fn quality_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterBackend;

impl RasterBackend {
    pub fn new() -> Self {
        Self
    }

    fn encode_png(&self, surface: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        surface
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| CompressionError::Encode(e.to_string()))?;

        let mut options = Options::from_preset(OXIPNG_PRESET);
        options.force = true;
        options.deflate = if quality >= 0.9 {
            Deflaters::Zopfli {
                iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
            }
        } else if quality >= 0.7 {
            Deflaters::Libdeflater {
                compression: LIBDEFLATER_HIGH_LEVEL,
            }
        } else {
            Deflaters::Libdeflater {
                compression: LIBDEFLATER_LOW_LEVEL,
            }
        };

        oxipng::optimize_from_memory(&png, &options)
            .map_err(|e| CompressionError::Encode(format!("PNG optimization failed: {}", e)))
    }
}

impl ImageBackend for RasterBackend {
    type Surface = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| CompressionError::Decode(e.to_string()))
    }

    fn dimensions(&self, surface: &DynamicImage) -> (u32, u32) {
        surface.dimensions()
    }

    fn render(
        &self,
        surface: &DynamicImage,
        width: u32,
        height: u32,
        background: Option<Background>,
    ) -> Result<DynamicImage> {
        let scaled = if surface.dimensions() == (width, height) {
            surface.clone()
        } else {
            surface.resize_exact(width, height, FilterType::Lanczos3)
        };

        match background {
            None => Ok(scaled),
            Some(Background([r, g, b])) => {
                let mut canvas = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));
                imageops::overlay(&mut canvas, &scaled.to_rgba8(), 0, 0);
                Ok(DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8()))
            }
        }
    }

    fn supports(&self, kind: ImageKind) -> bool {
        kind.to_image_format().is_some()
    }

    fn encode(&self, surface: &DynamicImage, kind: ImageKind, quality: f32) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let encoded = match kind {
            ImageKind::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality_percent(quality));
                DynamicImage::ImageRgb8(surface.to_rgb8()).write_with_encoder(encoder)
            }
            ImageKind::Png => return self.encode_png(surface, quality),
            ImageKind::WebP => {
                let encoder = WebPEncoder::new_lossless(&mut buf);
                DynamicImage::ImageRgba8(surface.to_rgba8()).write_with_encoder(encoder)
            }
            ImageKind::Avif => {
                let encoder = AvifEncoder::new_with_speed_quality(
                    &mut buf,
                    AVIF_SPEED,
                    quality_percent(quality),
                );
                DynamicImage::ImageRgba8(surface.to_rgba8()).write_with_encoder(encoder)
            }
            ImageKind::Gif | ImageKind::Bmp | ImageKind::Tiff => {
                let format = kind
                    .to_image_format()
                    .ok_or_else(|| CompressionError::UnsupportedFormat(kind.mime_type().into()))?;
                DynamicImage::ImageRgba8(surface.to_rgba8())
                    .write_to(&mut Cursor::new(&mut buf), format)
            }
            ImageKind::Heif => {
                return Err(CompressionError::UnsupportedFormat(
                    kind.mime_type().to_string(),
                ))
            }
        };

        encoded.map_err(|e| CompressionError::Encode(e.to_string()))?;
        if buf.is_empty() {
            return Err(CompressionError::Encode(format!(
                "{} encoder produced no output",
                kind.mime_type()
            )));
        }
        Ok(buf)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_quality_percent() {
        assert_eq!(quality_percent(0.8), 80);
        assert_eq!(quality_percent(0.0), 1);
        assert_eq!(quality_percent(1.0), 100);
    }

    #[test]
    fn test_raster_decode_rejects_garbage() {
        let result = RasterBackend::new().decode(b"definitely not an image");
        assert!(matches!(result, Err(CompressionError::Decode(_))));
    }

    #[test]
    fn test_raster_render_resizes() {
        let backend = RasterBackend::new();
        let img = DynamicImage::new_rgb8(40, 20);
        let out = backend.render(&img, 20, 10, None).unwrap();
        assert_eq!(out.dimensions(), (20, 10));
    }

    #[test]
    fn test_raster_white_background_fills_transparency() {
        let backend = RasterBackend::new();
        let transparent = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        let out = backend
            .render(&transparent, 4, 4, Some(Background::WHITE))
            .unwrap();
        let rgb = out.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(3, 3).0, [255, 255, 255]);
    }

    #[test]
    fn test_raster_jpeg_round_trip() {
        let backend = RasterBackend::new();
        let source = png_bytes(&DynamicImage::new_rgb8(16, 8));
        let decoded = backend.decode(&source).unwrap();
        let jpeg = backend.encode(&decoded, ImageKind::Jpeg, 0.7).unwrap();

        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        assert_eq!(backend.decode(&jpeg).unwrap().dimensions(), (16, 8));
    }

    #[test]
    fn test_raster_png_is_optimized_and_valid() {
        let backend = RasterBackend::new();
        let img = DynamicImage::new_rgba8(32, 32);
        let png = backend.encode(&img, ImageKind::Png, 0.5).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
        assert_eq!(backend.decode(&png).unwrap().dimensions(), (32, 32));
    }

    #[test]
    fn test_raster_webp_encodes() {
        let backend = RasterBackend::new();
        let img = DynamicImage::new_rgb8(8, 8);
        let webp = backend.encode(&img, ImageKind::WebP, 0.8).unwrap();
        assert_eq!(image::guess_format(&webp).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_raster_does_not_support_heif() {
        let backend = RasterBackend::new();
        assert!(!backend.supports(ImageKind::Heif));
        assert!(backend.supports(ImageKind::Jpeg));
        assert!(backend.supports(ImageKind::WebP));
    }
}
