//! Utility functions for common operations
//!
//! Helpers shared by the CLI and the batch driver: size formatting,
//! compression ratios and consistently styled progress indicators.

use crate::constants::{PROGRESS_BAR_TEMPLATE, PROGRESS_SPINNER_TEMPLATE};
use crate::logger::is_quiet;
use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress spinner with consistent styling. Hidden in quiet mode.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    if is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Create a progress bar for `len` items. Hidden in quiet mode.
pub fn create_progress_bar(len: u64) -> ProgressBar {
    if is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Compression ratio as a percentage: positive means reduction, negative means growth.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

/// Print compression result with formatted output
pub fn print_compression_result(original_size: u64, compressed_size: u64) {
    let ratio = calculate_compression_ratio(original_size, compressed_size);

    crate::info!(
        "📊 Original size: {} ({})",
        original_size,
        format_file_size(original_size)
    );
    crate::info!(
        "📈 Compressed size: {} ({})",
        compressed_size,
        format_file_size(compressed_size)
    );
    crate::info!("🎯 Compression ratio: {:.1}%", ratio);

    if ratio > 0.0 {
        crate::info!("✅ Successfully reduced file size by {:.1}%", ratio);
    } else {
        crate::warn!("File size increased by {:.1}%", ratio.abs());
    }
}
