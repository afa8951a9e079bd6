//! Export of compressed results
//!
//! A lone result (without structure preservation) is saved as-is; anything
//! else is packed into one ZIP archive. Saving goes through a [`DownloadSink`],
//! so the packaging logic can be exercised without touching the filesystem.

use crate::constants::{ARCHIVE_PREFIX, COMPRESSED_TAG, FALLBACK_EXTENSION, ZIP_DEFLATE_LEVEL};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::processing::CompressedResult;
use crate::validation::is_valid_archive_path;
use crate::{info, verbose, warn};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Destination for finished downloads.
pub trait DownloadSink {
    /// Stores `data` under `name` and returns where it ended up.
    fn save(&self, name: &str, data: &[u8]) -> Result<PathBuf>;
}

/// Saves downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .map_err(|_| CompressionError::DirectoryCreationFailed(self.dir.clone()))?;
        let location = self.dir.join(name);
        fs::write(&location, data)?;
        Ok(location)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    SingleFile {
        name: String,
        location: PathBuf,
    },
    Archive {
        name: String,
        location: PathBuf,
        entries: Vec<String>,
    },
}

fn export_error(cause: impl Display) -> CompressionError {
    CompressionError::Export(format!("Failed to package archive: {}", cause))
}

fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    }
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Extension for an exported file. `Original` keeps the source's own
/// extension; other formats use the kind that was actually encoded.
fn target_extension(result: &CompressedResult, format: OutputFormat) -> Option<&'static str> {
    match format {
        OutputFormat::Original => None,
        _ => Some(result.compressed.kind.extension()),
    }
}

/// Replaces the extension of the last segment of `path`; `None` keeps `path` verbatim.
pub fn rewrite_extension(path: &str, extension: Option<&str>) -> String {
    let Some(extension) = extension else {
        return path.to_string();
    };

    let (dir, file_name) = match path.rsplit_once('/') {
        Some((dir, file_name)) => (Some(dir), file_name),
        None => (None, path),
    };
    let (stem, _) = split_extension(file_name);

    match dir {
        Some(dir) => format!("{}/{}.{}", dir, stem, extension),
        None => format!("{}.{}", stem, extension),
    }
}

/// Name for a direct single-file download: `<stem>_compressed_<ratio>%.<ext>`.
pub fn single_file_name(result: &CompressedResult, format: OutputFormat) -> String {
    let (stem, original_extension) = split_extension(file_name_of(&result.path));
    let extension = target_extension(result, format)
        .or(original_extension)
        .unwrap_or(FALLBACK_EXTENSION);

    format!(
        "{}{}{}%.{}",
        stem,
        COMPRESSED_TAG,
        result.compression_ratio.round() as i64,
        extension
    )
}

/// Entry name inside the archive: the full path when preserving structure,
/// the bare file name otherwise.
pub fn archive_entry_name(
    result: &CompressedResult,
    format: OutputFormat,
    preserve_structure: bool,
) -> String {
    let extension = target_extension(result, format);
    let flat = rewrite_extension(file_name_of(&result.relative_path), extension);

    if !preserve_structure {
        return flat;
    }

    let structured = rewrite_extension(&result.path, extension);
    if is_valid_archive_path(&structured) {
        structured
    } else {
        warn!("Invalid archive path {:?}, storing as {:?}", structured, flat);
        flat
    }
}

pub fn archive_name(now: DateTime<Utc>) -> String {
    format!("{}_{}.zip", ARCHIVE_PREFIX, now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Entry names and payloads in input order. A repeated name keeps its first
/// position but takes the data of the last result that produced it.
fn archive_entries<'a>(
    results: &'a [CompressedResult],
    format: OutputFormat,
    preserve_structure: bool,
) -> Vec<(String, &'a [u8])> {
    let mut entries: Vec<(String, &[u8])> = Vec::with_capacity(results.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for result in results {
        let name = archive_entry_name(result, format, preserve_structure);
        let data = result.compressed.data.as_slice();
        match positions.get(&name) {
            Some(&index) => {
                warn!("Duplicate archive entry {:?}, keeping the last one", name);
                entries[index].1 = data;
            }
            None => {
                positions.insert(name.clone(), entries.len());
                entries.push((name, data));
            }
        }
    }

    entries
}

/// Builds a deflated ZIP archive in memory.
pub fn build_archive(entries: &[(String, &[u8])]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ZIP_DEFLATE_LEVEL));

    for (name, data) in entries {
        writer
            .start_file(name.as_str(), options)
            .map_err(export_error)?;
        writer.write_all(data).map_err(export_error)?;
    }

    let cursor = writer.finish().map_err(export_error)?;
    Ok(cursor.into_inner())
}

/// Saves the results through `sink`, either directly or as one ZIP archive.
pub fn export<S: DownloadSink + ?Sized>(
    results: &[CompressedResult],
    format: OutputFormat,
    preserve_structure: bool,
    sink: &S,
) -> Result<ExportOutcome> {
    if results.is_empty() {
        return Err(CompressionError::NothingToExport);
    }

    if results.len() == 1 && !preserve_structure {
        let result = &results[0];
        let name = single_file_name(result, format);
        let location = sink
            .save(&name, &result.compressed.data)
            .map_err(|e| CompressionError::Export(format!("Failed to save {}: {}", name, e)))?;
        info!("💾 Saved {:?}", location);
        return Ok(ExportOutcome::SingleFile { name, location });
    }

    let entries = archive_entries(results, format, preserve_structure);
    verbose!("Packing {} entries", entries.len());
    let archive = build_archive(&entries)?;

    let name = archive_name(Utc::now());
    let location = sink.save(&name, &archive).map_err(export_error)?;
    info!("📦 Saved archive {:?} ({} entries)", location, entries.len());

    Ok(ExportOutcome::Archive {
        name,
        location,
        entries: entries.into_iter().map(|(name, _)| name).collect(),
    })
}
