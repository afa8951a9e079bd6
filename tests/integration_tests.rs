mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use common::{
    archive_entry_names, create_fake_image_file, create_photo_tree, create_temp_directory,
    create_test_image, files_with_suffix,
};
use predicates::prelude::*;

fn img_pack() -> Command {
    Command::cargo_bin("img-pack").unwrap()
}

#[test]
fn test_cli_help() {
    img_pack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn test_subcommand_help() {
    for subcommand in ["compress", "batch", "scan", "info"] {
        img_pack().args([subcommand, "--help"]).assert().success();
    }
}

#[test]
fn test_batch_help_only_shows_supported_globs() {
    img_pack()
        .args(["batch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("./photos/**/*.jpg"))
        .stdout(predicate::str::contains("{").not());
}

#[test]
fn test_missing_args() {
    for subcommand in ["compress", "batch", "scan", "info"] {
        img_pack().arg(subcommand).assert().failure();
    }
}

#[test]
fn test_compress_nonexistent_file() {
    img_pack()
        .args(["compress", "nonexistent.jpg", "output.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_compress_with_invalid_quality() {
    let temp_dir = create_temp_directory();
    let input = create_test_image(&temp_dir.path().join("input.png"), 16, 16);
    let output = temp_dir.path().join("output.jpg");

    img_pack()
        .args(["compress", &input.to_string_lossy(), &output.to_string_lossy()])
        .args(["--quality", "1.5"])
        .assert()
        .failure();
    assert!(!output.exists());
}

#[test]
fn test_compress_with_zero_bounds() {
    let temp_dir = create_temp_directory();
    let input = create_test_image(&temp_dir.path().join("input.png"), 16, 16);
    let output = temp_dir.path().join("output.jpg");

    img_pack()
        .args(["compress", &input.to_string_lossy(), &output.to_string_lossy()])
        .args(["--max-width", "0"])
        .assert()
        .failure();
}

#[test]
fn test_compress_with_unsupported_format() {
    let temp_dir = create_temp_directory();
    let input = create_test_image(&temp_dir.path().join("input.png"), 16, 16);
    let output = temp_dir.path().join("output.heic");

    img_pack()
        .args(["compress", &input.to_string_lossy(), &output.to_string_lossy()])
        .args(["--format", "heic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AVIF"));
}

#[test]
fn test_compress_fake_image_fails() {
    let temp_dir = create_temp_directory();
    let input = create_fake_image_file(&temp_dir.path().join("test.jpg"));
    let output = temp_dir.path().join("output.jpg");

    img_pack()
        .args(["compress", &input.to_string_lossy(), &output.to_string_lossy()])
        .assert()
        .failure();
}

#[test]
fn test_compress_png_to_jpeg_fits_bounds() {
    let temp_dir = assert_fs::TempDir::new().unwrap();
    let input = create_test_image(&temp_dir.path().join("wide.png"), 200, 100);
    let output = temp_dir.child("out").child("wide.jpg");

    img_pack()
        .args(["compress", &input.to_string_lossy(), &output.path().to_string_lossy()])
        .args(["-w", "50", "-q", "0.7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("image/jpeg"));

    output.assert(predicate::path::is_file());
    assert_eq!(image::image_dimensions(output.path()).unwrap(), (50, 25));
}

#[test]
fn test_batch_nonexistent_input() {
    let temp_dir = create_temp_directory();
    let output = temp_dir.path().join("out");

    img_pack()
        .args(["batch", "nonexistent", "-o", &output.to_string_lossy()])
        .assert()
        .success()
        .stderr(predicate::str::contains("No image files found"));
    assert!(!output.exists());
}

#[test]
fn test_batch_empty_directory() {
    let temp_dir = create_temp_directory();
    let input = temp_dir.path().join("empty");
    std::fs::create_dir(&input).unwrap();
    let output = temp_dir.path().join("out");

    img_pack()
        .args(["batch", &input.to_string_lossy(), "-o", &output.to_string_lossy()])
        .assert()
        .success();
    assert!(files_with_suffix(&output, ".zip").is_empty());
}

#[test]
fn test_batch_preserves_structure() {
    let temp_dir = create_temp_directory();
    let input = create_photo_tree(temp_dir.path());
    let output = temp_dir.path().join("out");

    img_pack()
        .args(["batch", &input.to_string_lossy(), "-o", &output.to_string_lossy()])
        .arg("--preserve-structure")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 image files"));

    let archives = files_with_suffix(&output, ".zip");
    assert_eq!(archives.len(), 1);
    let archive_name = archives[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(archive_name.starts_with("compressed_images_"));

    let mut entries = archive_entry_names(&archives[0]);
    entries.sort();
    assert_eq!(
        entries,
        vec!["photos/beach.png", "photos/city.jpg", "photos/trips/alps.png"]
    );
}

#[test]
fn test_batch_flat_with_format_conversion() {
    let temp_dir = create_temp_directory();
    let input = create_photo_tree(temp_dir.path());
    let output = temp_dir.path().join("out");

    img_pack()
        .args(["batch", &input.to_string_lossy(), "-o", &output.to_string_lossy()])
        .args(["--format", "webp", "-j", "2"])
        .assert()
        .success();

    let archives = files_with_suffix(&output, ".zip");
    assert_eq!(archives.len(), 1);

    let mut entries = archive_entry_names(&archives[0]);
    entries.sort();
    assert_eq!(entries, vec!["alps.webp", "beach.webp", "city.webp"]);
}

#[test]
fn test_batch_single_file_is_saved_directly() {
    let temp_dir = create_temp_directory();
    let input = create_test_image(&temp_dir.path().join("beach.png"), 64, 48);
    let output = temp_dir.path().join("out");

    img_pack()
        .args(["batch", &input.to_string_lossy(), "-o", &output.to_string_lossy()])
        .assert()
        .success();

    assert!(files_with_suffix(&output, ".zip").is_empty());
    let saved = files_with_suffix(&output, "%.png");
    assert_eq!(saved.len(), 1);
    let name = saved[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("beach_compressed_"), "{}", name);
}

#[test]
fn test_batch_glob_input() {
    let temp_dir = create_temp_directory();
    let input = create_photo_tree(temp_dir.path());
    let output = temp_dir.path().join("out");
    let pattern = format!("{}/**/*.png", input.to_string_lossy());

    img_pack()
        .args(["batch", &pattern, "-o", &output.to_string_lossy(), "-p"])
        .assert()
        .success();

    let archives = files_with_suffix(&output, ".zip");
    assert_eq!(archives.len(), 1);
    let mut entries = archive_entry_names(&archives[0]);
    entries.sort();
    assert_eq!(entries, vec!["photos/beach.png", "photos/trips/alps.png"]);
}

#[test]
fn test_batch_with_fake_image_files() {
    let temp_dir = create_temp_directory();
    let input = temp_dir.path().join("broken");
    std::fs::create_dir(&input).unwrap();
    create_fake_image_file(&input.join("test1.jpg"));
    create_fake_image_file(&input.join("test2.png"));
    let output = temp_dir.path().join("out");

    img_pack()
        .args(["batch", &input.to_string_lossy(), "-o", &output.to_string_lossy()])
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing to export"));
    assert!(!output.exists());
}

#[test]
fn test_batch_quiet_prints_nothing() {
    let temp_dir = create_temp_directory();
    let input = create_photo_tree(temp_dir.path());
    let output = temp_dir.path().join("out");

    img_pack()
        .args(["--quiet", "batch", &input.to_string_lossy(), "-o", &output.to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(files_with_suffix(&output, ".zip").len(), 1);
}

#[test]
fn test_scan_prints_tree() {
    let temp_dir = create_temp_directory();
    let input = create_photo_tree(temp_dir.path());

    img_pack()
        .args(["scan", &input.to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files: 3"))
        .stdout(predicate::str::contains("trips/"))
        .stdout(predicate::str::contains("alps.png"))
        .stdout(predicate::str::contains("notes.txt").not())
        .stdout(predicate::str::contains(".hidden.png").not());
}

#[test]
fn test_info_real_image() {
    let temp_dir = create_temp_directory();
    let input = create_test_image(&temp_dir.path().join("beach.png"), 64, 48);

    img_pack()
        .args(["info", &input.to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::contains("64x48"))
        .stdout(predicate::str::contains("image/png"));
}

#[test]
fn test_info_nonexistent_file() {
    img_pack().args(["info", "nonexistent.jpg"]).assert().failure();
}

#[test]
fn test_info_with_fake_image() {
    let temp_dir = create_temp_directory();
    let input = create_fake_image_file(&temp_dir.path().join("test.jpg"));

    img_pack()
        .args(["info", &input.to_string_lossy()])
        .assert()
        .failure();
}
