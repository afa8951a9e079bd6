use crate::backend::{Background, ImageBackend};
use crate::collector::SourceFile;
use crate::constants::{
    DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY,
};
use crate::error::{CompressionError, Result};
use crate::formats::{ImageKind, OutputFormat, FALLBACK_KIND};
use crate::utils::calculate_compression_ratio;
use crate::validation::validate_source;
use crate::verbose;
use std::fs;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionOptions {
    /// Encoder quality in [0, 1]
    pub quality: f32,
    pub max_width: u32,
    pub max_height: u32,
    pub format: OutputFormat,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            format: OutputFormat::Original,
        }
    }
}

impl CompressionOptions {
    pub fn new(
        quality: Option<f32>,
        max_width: Option<u32>,
        max_height: Option<u32>,
        format: Option<OutputFormat>,
    ) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        let max_width = max_width.unwrap_or(DEFAULT_MAX_WIDTH);
        let max_height = max_height.unwrap_or(DEFAULT_MAX_HEIGHT);
        if max_width == 0 || max_height == 0 {
            return Err(CompressionError::InvalidBounds(max_width, max_height));
        }

        Ok(Self {
            quality,
            max_width,
            max_height,
            format: format.unwrap_or_default(),
        })
    }
}

/// Encoded output of one compression
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
}

impl Blob {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A compressed image, traceable to the source it came from
#[derive(Debug, Clone)]
pub struct CompressedResult {
    pub compressed: Blob,
    pub path: String,
    pub relative_path: String,
    /// Size reduction in percent; negative when the output grew
    pub compression_ratio: f64,
    pub source: SourceFile,
}

/// Target dimensions for fitting `width` x `height` inside the bounds.
///
/// Uniform downscale only: images that already fit are returned unchanged,
/// larger ones are scaled by `min(max_width / width, max_height / height)`.
pub fn calculate_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let ratio = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let scaled = |side: u32| ((side as f64 * ratio).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Resolves the kind to encode: `Original` means the source's own kind, and
/// anything the backend cannot encode is silently replaced by [`FALLBACK_KIND`].
pub fn resolve_kind<B: ImageBackend + ?Sized>(
    backend: &B,
    source_mime: &str,
    format: OutputFormat,
) -> ImageKind {
    let requested = format
        .kind()
        .or_else(|| ImageKind::from_mime(source_mime))
        .unwrap_or(FALLBACK_KIND);

    if backend.supports(requested) {
        requested
    } else {
        verbose!(
            "{} is not supported here, encoding as {}",
            requested.mime_type(),
            FALLBACK_KIND.mime_type()
        );
        FALLBACK_KIND
    }
}

/// Decode, fit, render and encode an in-memory image.
pub fn compress_bytes<B: ImageBackend + ?Sized>(
    bytes: &[u8],
    source_mime: &str,
    options: &CompressionOptions,
    backend: &B,
) -> Result<Blob> {
    let surface = backend.decode(bytes)?;

    let (width, height) = backend.dimensions(&surface);

    let (target_width, target_height) =
        calculate_dimensions(width, height, options.max_width, options.max_height);
    let kind = resolve_kind(backend, source_mime, options.format);

    // JPEG has no alpha channel
    let background = (kind == ImageKind::Jpeg).then_some(Background::WHITE);
    let rendered = backend.render(&surface, target_width, target_height, background)?;
    let data = backend.encode(&rendered, kind, options.quality)?;

    verbose!(
        "{}x{} -> {}x{} as {}",
        width,
        height,
        target_width,
        target_height,
        kind.mime_type()
    );

    Ok(Blob {
        data,
        mime_type: kind.mime_type().to_string(),
        kind,
        width: target_width,
        height: target_height,
    })
}

/// Compress one source file.
pub fn compress<B: ImageBackend + ?Sized>(
    source: &SourceFile,
    options: &CompressionOptions,
    backend: &B,
) -> Result<Blob> {
    let bytes = fs::read(&source.file).map_err(|e| CompressionError::Read {
        path: source.file.clone(),
        source: e,
    })?;
    compress_bytes(&bytes, &source.mime_type, options, backend)
}

/// Validate and compress one source, keeping its path metadata.
pub fn compress_source<B: ImageBackend + ?Sized>(
    source: &SourceFile,
    options: &CompressionOptions,
    backend: &B,
) -> Result<CompressedResult> {
    validate_source(source)?;
    let compressed = compress(source, options, backend)?;
    let compression_ratio = calculate_compression_ratio(source.size, compressed.size());

    Ok(CompressedResult {
        compressed,
        path: source.path.clone(),
        relative_path: source.relative_path.clone(),
        compression_ratio,
        source: source.clone(),
    })
}
