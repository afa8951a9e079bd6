pub const DEFAULT_QUALITY: f32 = 0.8;
pub const MIN_QUALITY: f32 = 0.0;
pub const MAX_QUALITY: f32 = 1.0;

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_MAX_HEIGHT: u32 = 1080;

/// Largest accepted source file (50 MiB)
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;
pub const AVIF_SPEED: u8 = 6;

/// Deflate level for archive entries. Moderate, not maximum.
pub const ZIP_DEFLATE_LEVEL: i64 = 6;
pub const ARCHIVE_PREFIX: &str = "compressed_images";
pub const COMPRESSED_TAG: &str = "_compressed_";
pub const FALLBACK_EXTENSION: &str = "jpeg";
pub const MAX_ARCHIVE_PATH_LEN: usize = 260;

pub const MAX_CONCURRENT_DIR_READS: usize = 8;

pub const LARGE_IMAGE_THRESHOLD_MIB: f64 = 50.0;
pub const MAX_CONCURRENT_LARGE_IMAGES: usize = 2;
pub const MIN_AVAILABLE_MEMORY_MIB: u64 = 256;

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
