//! Image format handling
//!
//! `ImageKind` names a concrete encoding (what a file *is*), `OutputFormat`
//! names what the user asked for, which may be "keep the original".

use crate::error::{CompressionError, Result};
use image::ImageFormat;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Concrete image encodings the collector recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
    Avif,
    Gif,
    Bmp,
    Tiff,
    Heif,
}

/// Substituted when the backend cannot encode the requested kind.
pub const FALLBACK_KIND: ImageKind = ImageKind::Png;

impl ImageKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::WebP),
            "avif" => Some(ImageKind::Avif),
            "gif" => Some(ImageKind::Gif),
            "bmp" => Some(ImageKind::Bmp),
            "tif" | "tiff" => Some(ImageKind::Tiff),
            "heic" | "heif" => Some(ImageKind::Heif),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::WebP),
            "image/avif" => Some(ImageKind::Avif),
            "image/gif" => Some(ImageKind::Gif),
            "image/bmp" => Some(ImageKind::Bmp),
            "image/tiff" => Some(ImageKind::Tiff),
            "image/heic" | "image/heif" => Some(ImageKind::Heif),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::WebP => "webp",
            ImageKind::Avif => "avif",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
            ImageKind::Tiff => "tiff",
            ImageKind::Heif => "heic",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::WebP => "image/webp",
            ImageKind::Avif => "image/avif",
            ImageKind::Gif => "image/gif",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Tiff => "image/tiff",
            ImageKind::Heif => "image/heic",
        }
    }

    /// The `image` crate format, if the crate can handle this kind at all.
    pub fn to_image_format(&self) -> Option<ImageFormat> {
        match self {
            ImageKind::Jpeg => Some(ImageFormat::Jpeg),
            ImageKind::Png => Some(ImageFormat::Png),
            ImageKind::WebP => Some(ImageFormat::WebP),
            ImageKind::Avif => Some(ImageFormat::Avif),
            ImageKind::Gif => Some(ImageFormat::Gif),
            ImageKind::Bmp => Some(ImageFormat::Bmp),
            ImageKind::Tiff => Some(ImageFormat::Tiff),
            ImageKind::Heif => None,
        }
    }
}

/// Output format requested for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Keep each source file's own format
    #[default]
    Original,
    Jpeg,
    Png,
    WebP,
    Avif,
}

impl OutputFormat {
    /// The concrete kind this format asks for; `None` for `Original`.
    pub fn kind(&self) -> Option<ImageKind> {
        match self {
            OutputFormat::Original => None,
            OutputFormat::Jpeg => Some(ImageKind::Jpeg),
            OutputFormat::Png => Some(ImageKind::Png),
            OutputFormat::WebP => Some(ImageKind::WebP),
            OutputFormat::Avif => Some(ImageKind::Avif),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Original => "original",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
            OutputFormat::Avif => "AVIF",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputFormat {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "original" => Ok(OutputFormat::Original),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            "avif" => Ok(OutputFormat::Avif),
            "heic" | "heif" | "jxl" | "jpegxl" => Err(CompressionError::UnsupportedFormat(format!(
                "{} output is not yet supported in this version. Use AVIF for modern compression",
                s
            ))),
            _ => Err(CompressionError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Determine the output format for a single-file compression.
///
/// An explicit override wins, then the output path's extension. Unknown or
/// missing extensions keep the source format.
pub fn determine_output_format(
    output_path: &Path,
    format_override: Option<&str>,
) -> Result<OutputFormat> {
    if let Some(fmt_str) = format_override {
        return OutputFormat::from_str(fmt_str);
    }

    let format = match ImageKind::from_path(output_path) {
        Some(ImageKind::Jpeg) => OutputFormat::Jpeg,
        Some(ImageKind::Png) => OutputFormat::Png,
        Some(ImageKind::WebP) => OutputFormat::WebP,
        Some(ImageKind::Avif) => OutputFormat::Avif,
        _ => OutputFormat::Original,
    };
    Ok(format)
}
