//! Source file collection
//!
//! Two ways in, one record type out:
//! - **listing mode**: an explicit list of files (or a glob), each carrying a
//!   `/`-separated relative path string;
//! - **drop mode**: a directory walked recursively through an async worklist.
//!
//! Both keep image files only and strip the shared root directory from
//! `relative_path`. Unreadable entries are skipped with a warning.

use crate::constants::MAX_CONCURRENT_DIR_READS;
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use crate::validation::normalize_path;
use crate::{verbose, warn};
use glob::glob;
use std::collections::VecDeque;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::task::JoinSet;

/// An input image plus its path metadata
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub file: PathBuf,
    /// Full relative path, including the root directory
    pub path: String,
    /// `path` with the inferred root directory stripped
    pub relative_path: String,
    pub size: u64,
    pub mime_type: String,
    pub last_modified: SystemTime,
}

impl SourceFile {
    /// Reads metadata for `file`. `path` and `relative_path` are taken as given.
    pub fn from_disk(file: impl Into<PathBuf>, path: String, relative_path: String) -> Result<Self> {
        let file = file.into();
        let metadata = fs::metadata(&file).map_err(|e| CompressionError::Read {
            path: file.clone(),
            source: e,
        })?;
        Ok(Self::with_metadata(file, path, relative_path, &metadata))
    }

    fn with_metadata(
        file: PathBuf,
        path: String,
        relative_path: String,
        metadata: &fs::Metadata,
    ) -> Self {
        let mime_type = ImageKind::from_path(&path)
            .or_else(|| ImageKind::from_path(&file))
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Self {
            file,
            path,
            relative_path,
            size: metadata.len(),
            mime_type,
            last_modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }

    pub fn kind(&self) -> Option<ImageKind> {
        ImageKind::from_mime(&self.mime_type)
    }
}

/// One entry of a listing: a file on disk and its relative-path string.
#[derive(Debug, Clone)]
pub struct ListedFile {
    pub file: PathBuf,
    pub relative_path: String,
}

impl ListedFile {
    pub fn new(file: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            relative_path: relative_path.into(),
        }
    }
}

pub fn is_image_file(path: &Path) -> bool {
    ImageKind::from_path(path).is_some()
}

/// Infers the root directory shared by every path.
///
/// Returns the first segment only when *all* paths contain a `/` and agree on
/// that segment. Mixed roots, root-less paths or an empty input yield `None`,
/// in which case nothing is stripped.
pub fn infer_root<S: AsRef<str>>(paths: &[S]) -> Option<String> {
    let mut root: Option<&str> = None;
    for path in paths {
        let (first, _) = path.as_ref().split_once('/')?;
        if first.is_empty() {
            return None;
        }
        match root {
            None => root = Some(first),
            Some(existing) if existing == first => {}
            Some(_) => return None,
        }
    }
    root.map(str::to_string)
}

pub fn strip_root(path: &str, root: Option<&str>) -> String {
    root.and_then(|root| path.strip_prefix(root))
        .and_then(|rest| rest.strip_prefix('/'))
        .map(str::to_string)
        .unwrap_or_else(|| path.to_string())
}

/// Listing mode. Output order follows the input order.
pub fn collect_from_listing(listing: Vec<ListedFile>) -> Vec<SourceFile> {
    let paths: Vec<String> = listing
        .iter()
        .map(|entry| normalize_path(&entry.relative_path))
        .collect();
    let root = infer_root(&paths);
    verbose!("Inferred root: {:?}", root);

    listing
        .into_iter()
        .zip(paths)
        .filter(|(_, path)| is_image_file(Path::new(path)))
        .filter_map(|(entry, path)| {
            let relative_path = strip_root(&path, root.as_deref());
            match SourceFile::from_disk(entry.file, path, relative_path) {
                Ok(source) => Some(source),
                Err(e) => {
                    warn!("Skipping unreadable file: {}", e);
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Default)]
struct DirectoryListing {
    files: Vec<SourceFile>,
    subdirectories: Vec<(PathBuf, String)>,
}

/// Lists one directory, reading entries until the reader is exhausted.
async fn read_directory(dir: PathBuf, prefix: String) -> DirectoryListing {
    let mut listing = DirectoryListing::default();

    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read directory {:?}: {}", dir, e);
            return listing;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Stopped reading directory {:?}: {}", dir, e);
                break;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let is_dir = match entry.file_type().await {
            Ok(file_type) => file_type.is_dir(),
            Err(e) => {
                warn!("Cannot stat {:?}: {}", entry.path(), e);
                continue;
            }
        };

        if is_dir {
            listing
                .subdirectories
                .push((entry.path(), format!("{}{}/", prefix, name)));
            continue;
        }

        if !is_image_file(Path::new(&name)) {
            continue;
        }

        let file = entry.path();
        match tokio::fs::metadata(&file).await {
            Ok(metadata) if metadata.is_file() => {
                let path = format!("{}{}", prefix, name);
                listing.files.push(SourceFile::with_metadata(
                    file,
                    path.clone(),
                    path,
                    &metadata,
                ));
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable file {:?}: {}", file, e),
        }
    }

    listing
}

async fn directory_name(dir: &Path) -> Result<String> {
    if let Some(name) = dir.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }
    let canonical = tokio::fs::canonicalize(dir)
        .await
        .map_err(|_| CompressionError::FileNotFound(dir.to_path_buf()))?;
    Ok(canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default())
}

/// Drop mode: walks `dir` recursively.
///
/// Directories are kept on an explicit worklist with at most
/// [`MAX_CONCURRENT_DIR_READS`] listings in flight, so deep trees do not grow
/// the stack. Output order is not guaranteed.
pub async fn collect_from_entry(dir: &Path) -> Result<Vec<SourceFile>> {
    if !dir.is_dir() {
        return Err(CompressionError::FileNotFound(dir.to_path_buf()));
    }

    let name = directory_name(dir).await?;
    let prefix = if name.is_empty() {
        String::new()
    } else {
        format!("{}/", name)
    };

    let mut pending: VecDeque<(PathBuf, String)> = VecDeque::new();
    pending.push_back((dir.to_path_buf(), prefix));
    let mut in_flight = JoinSet::new();
    let mut files = Vec::new();

    loop {
        while in_flight.len() < MAX_CONCURRENT_DIR_READS {
            match pending.pop_front() {
                Some((dir, prefix)) => {
                    in_flight.spawn(read_directory(dir, prefix));
                }
                None => break,
            }
        }

        match in_flight.join_next().await {
            Some(Ok(listing)) => {
                files.extend(listing.files);
                pending.extend(listing.subdirectories);
            }
            Some(Err(e)) => warn!("Directory listing task failed: {}", e),
            None => break,
        }
    }

    let root = infer_root(&files.iter().map(|f| f.path.as_str()).collect::<Vec<_>>());
    for file in &mut files {
        file.relative_path = strip_root(&file.path, root.as_deref());
    }

    verbose!("Collected {} image files under {:?}", files.len(), dir);
    Ok(files)
}

pub fn collect_from_entry_blocking(dir: &Path) -> Result<Vec<SourceFile>> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CompressionError::Runtime(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(collect_from_entry(dir))
}

/// The literal directory prefix of a glob pattern, before any wildcard.
fn glob_base(pattern: &str) -> PathBuf {
    Path::new(pattern)
        .components()
        .take_while(|component| {
            let text = component.as_os_str().to_string_lossy();
            !text.contains(['*', '?', '[', '{'])
        })
        .collect()
}

/// Relative path for a glob match: the base directory's name followed by the
/// match's path below it, the way a directory picker reports it.
fn listed_relative_path(matched: &Path, base: &Path) -> String {
    let below = match matched.strip_prefix(base) {
        Ok(rest) if !base.as_os_str().is_empty() => rest,
        _ => return matched.to_string_lossy().into_owned(),
    };

    let base_name = base.components().next_back().and_then(|c| match c {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    });

    match base_name {
        Some(name) => format!("{}/{}", name, below.to_string_lossy()),
        None => below.to_string_lossy().into_owned(),
    }
}

/// Collects sources from a CLI input: a directory (drop mode), a single file,
/// or a glob pattern (listing mode).
pub fn collect(input: &str) -> Result<Vec<SourceFile>> {
    let input_path = Path::new(input);

    if input_path.is_dir() {
        return collect_from_entry_blocking(input_path);
    }

    if input_path.is_file() {
        let name = input_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.to_string());
        return Ok(collect_from_listing(vec![ListedFile::new(input_path, name)]));
    }

    let pattern = glob(input).map_err(|_| CompressionError::NoImageFilesFound(input.to_string()))?;
    let base = glob_base(input);
    let listing = pattern
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable glob match {:?}: {}", e.path(), e.error());
                None
            }
        })
        .filter(|path| path.is_file())
        .map(|path| {
            let relative_path = listed_relative_path(&path, &base);
            ListedFile::new(path, relative_path)
        })
        .collect();

    Ok(collect_from_listing(listing))
}
