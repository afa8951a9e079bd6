use crate::backend::ImageBackend;
use crate::collector::SourceFile;
use crate::constants::{
    LARGE_IMAGE_THRESHOLD_MIB, MAX_CONCURRENT_LARGE_IMAGES, MIN_AVAILABLE_MEMORY_MIB,
};
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use crate::processing::{compress_source, CompressedResult, CompressionOptions};
use crate::utils::{calculate_compression_ratio, create_progress_bar, format_file_size};
use crate::{info, verbose, warn};
use rayon::prelude::*;
use std::time::{Duration, Instant};
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// A file the batch could not compress
#[derive(Debug)]
pub struct BatchFailure {
    pub path: String,
    pub error: CompressionError,
}

#[derive(Debug)]
pub struct BatchReport {
    /// Successful results, in input order
    pub results: Vec<CompressedResult>,
    pub failures: Vec<BatchFailure>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn total_original_size(&self) -> u64 {
        self.results.iter().map(|r| r.source.size).sum()
    }

    pub fn total_compressed_size(&self) -> u64 {
        self.results.iter().map(|r| r.compressed.size()).sum()
    }

    pub fn overall_ratio(&self) -> f64 {
        calculate_compression_ratio(self.total_original_size(), self.total_compressed_size())
    }

    pub fn print_summary(&self) {
        info!("\n📊 Batch Compression Summary:");
        info!("  📁 Total files processed: {}", self.results.len());
        info!(
            "  📊 Total original size: {}",
            format_file_size(self.total_original_size())
        );
        info!(
            "  📊 Total compressed size: {}",
            format_file_size(self.total_compressed_size())
        );
        info!("  🎯 Overall compression ratio: {:.1}%", self.overall_ratio());
        info!("  ⏱️  Total time: {:?}", self.elapsed);
        if !self.failures.is_empty() {
            info!("  ⚠️  Failed files: {}", self.failures.len());
        }
    }
}

/// Estimated decoded size of a source in MiB, from its encoded size.
fn estimate_image_memory_usage(source: &SourceFile) -> f64 {
    let file_size_mib = source.size as f64 / (1024.0 * 1024.0);

    // Decoded bitmaps are several times larger than their compressed files
    let multiplier = match source.kind() {
        Some(ImageKind::Jpeg) | Some(ImageKind::Avif) | Some(ImageKind::Heif) => 4.0,
        Some(ImageKind::WebP) => 3.5,
        Some(ImageKind::Png) => 3.0,
        Some(ImageKind::Gif) => 2.0,
        Some(ImageKind::Bmp) | Some(ImageKind::Tiff) => 1.2,
        None => 3.0,
    };

    file_size_mib * multiplier
}

/// Returns `(estimated_memory_mib, large_image_count)` for the whole batch.
fn estimate_batch_memory(sources: &[SourceFile]) -> (f64, usize) {
    let mut total_memory_mib = 0.0;
    let mut large_image_count = 0;
    for source in sources {
        let estimate = estimate_image_memory_usage(source);
        total_memory_mib += estimate;
        if estimate > LARGE_IMAGE_THRESHOLD_MIB {
            large_image_count += 1;
        }
    }

    (total_memory_mib, large_image_count)
}

fn available_memory_mib() -> u64 {
    let mut sys =
        System::new_with_specifics(RefreshKind::new().with_memory(MemoryRefreshKind::new()));
    sys.refresh_memory();
    sys.available_memory() / (1024 * 1024)
}

/// Worker count: the requested (or default) thread count, capped by the number
/// of files, by large images, and by how many average-sized bitmaps fit in
/// available memory. Never below one.
fn plan_parallelism(
    threads: usize,
    total_files: usize,
    estimated_memory_mib: f64,
    large_image_count: usize,
    available_mib: u64,
) -> usize {
    let baseline = threads.min(total_files).max(1);
    let large_cap = if large_image_count >= MAX_CONCURRENT_LARGE_IMAGES {
        MAX_CONCURRENT_LARGE_IMAGES
    } else {
        baseline
    };

    let avg_per_file_mib = ((estimated_memory_mib / total_files.max(1) as f64).ceil() as u64).max(1);
    let mem_cap = (available_mib.saturating_sub(MIN_AVAILABLE_MEMORY_MIB) / avg_per_file_mib)
        .clamp(1, baseline as u64) as usize;

    large_cap.min(mem_cap).max(1)
}

/// Compresses every source independently. A failing file is logged and
/// recorded in the report; it never aborts the batch.
pub fn compress_batch<B: ImageBackend + ?Sized>(
    sources: &[SourceFile],
    options: &CompressionOptions,
    backend: &B,
    threads: Option<usize>,
) -> Result<BatchReport> {
    let start_time = Instant::now();

    if sources.is_empty() {
        return Ok(BatchReport {
            results: Vec::new(),
            failures: Vec::new(),
            elapsed: start_time.elapsed(),
        });
    }

    let (estimated_memory_mib, large_image_count) = estimate_batch_memory(sources);
    verbose!(
        "Estimated memory usage: {:.1} MiB, large images: {}",
        estimated_memory_mib,
        large_image_count
    );

    let parallelism = plan_parallelism(
        threads.unwrap_or_else(num_cpus::get),
        sources.len(),
        estimated_memory_mib,
        large_image_count,
        available_memory_mib(),
    );
    verbose!("Using {} parallel workers", parallelism);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .map_err(|e| CompressionError::Runtime(format!("Failed to build thread pool: {}", e)))?;

    let progress = create_progress_bar(sources.len() as u64);
    let outcomes: Vec<Result<CompressedResult>> = pool.install(|| {
        sources
            .par_iter()
            .map(|source| {
                let outcome = compress_source(source, options, backend);
                progress.inc(1);
                outcome
            })
            .collect()
    });
    progress.finish_and_clear();

    let mut results = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (source, outcome) in sources.iter().zip(outcomes) {
        match outcome {
            Ok(result) => results.push(result),
            Err(error) => {
                warn!("Failed to process {}: {}", source.path, error);
                failures.push(BatchFailure {
                    path: source.path.clone(),
                    error,
                });
            }
        }
    }

    Ok(BatchReport {
        results,
        failures,
        elapsed: start_time.elapsed(),
    })
}
