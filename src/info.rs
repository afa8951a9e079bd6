use crate::constants::{DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH};
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use crate::utils::format_file_size;
use crate::validation::validate_input_path;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub size: u64,
    pub mime_type: String,
}

impl ImageInfo {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    pub fn megapixels(&self) -> f64 {
        (self.width as u64 * self.height as u64) as f64 / 1_000_000.0
    }
}

/// Reads dimensions from the image header without decoding pixel data.
pub fn get_image_info(input_path: &Path) -> Result<ImageInfo> {
    validate_input_path(input_path)?;

    let (width, height) =
        image::image_dimensions(input_path).map_err(|e| CompressionError::Decode(e.to_string()))?;
    let metadata = fs::metadata(input_path)?;

    let mime_type = ImageKind::from_path(input_path)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(ImageInfo {
        name: input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        width,
        height,
        size: metadata.len(),
        mime_type,
    })
}

pub fn print_image_info(info: &ImageInfo) {
    crate::info!("📋 Basic Information:");
    crate::info!("  📁 File: {}", info.name);
    crate::info!("  📏 Dimensions: {}x{} pixels", info.width, info.height);
    crate::info!("  📦 File size: {} ({} bytes)", format_file_size(info.size), info.size);
    crate::info!("  🎭 Type: {}", info.mime_type);
    crate::info!("  🔢 Megapixels: {:.2} MP", info.megapixels());
    crate::info!("  📐 Aspect ratio: {:.2}:1", info.aspect_ratio());

    crate::info!("\n💡 Compression Suggestions:");
    if info.size > 5 * 1024 * 1024 {
        crate::info!("  🎯 Large file (>5MB): Consider quality 0.6-0.8");
    } else if info.size > 1024 * 1024 {
        crate::info!("  🎯 Medium file (1-5MB): Consider quality 0.7-0.85");
    } else {
        crate::info!("  🎯 Small file (<1MB): Consider quality 0.85-0.95");
    }

    if info.width > DEFAULT_MAX_WIDTH || info.height > DEFAULT_MAX_HEIGHT {
        crate::info!(
            "  📏 Large dimensions: will be fitted into {}x{} by default",
            DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT
        );
    }

    match ImageKind::from_mime(&info.mime_type) {
        Some(ImageKind::Png) => crate::info!("  🎭 PNG format: output is re-optimized with oxipng"),
        Some(ImageKind::Jpeg) => {
            crate::info!("  🎭 JPEG format: Adjust quality setting for size/quality balance")
        }
        Some(ImageKind::WebP) => {
            crate::info!("  🎭 WebP format: Already well compressed, consider resizing instead")
        }
        _ => crate::info!("  🎭 Other format: Consider converting to JPEG/WebP for better compression"),
    }
}
