#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

/// Writes a real gradient image; the format follows the file extension.
pub fn create_test_image(path: &Path, width: u32, height: u32) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let buffer = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(buffer).save(path).unwrap();
    path.to_path_buf()
}

/// `photos/` with two top-level images, one nested image, a text file and a
/// hidden file.
pub fn create_photo_tree(temp_dir: &Path) -> PathBuf {
    let root = temp_dir.join("photos");
    create_test_image(&root.join("beach.png"), 64, 48);
    create_test_image(&root.join("city.jpg"), 80, 40);
    create_test_image(&root.join("trips").join("alps.png"), 40, 80);

    File::create(root.join("notes.txt"))
        .unwrap()
        .write_all(b"not an image")
        .unwrap();
    File::create(root.join(".hidden.png"))
        .unwrap()
        .write_all(b"hidden")
        .unwrap();

    root
}

pub fn create_fake_image_file(path: &Path) -> PathBuf {
    File::create(path)
        .unwrap()
        .write_all(b"fake image data")
        .unwrap();
    path.to_path_buf()
}

/// Names of every entry in the ZIP archive at `path`.
pub fn archive_entry_names(path: &Path) -> Vec<String> {
    let file = File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|index| archive.by_index(index).unwrap().name().to_string())
        .collect()
}

/// Files directly inside `dir` whose name ends with `suffix`.
pub fn files_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.to_string_lossy().ends_with(suffix))
        .collect()
}
