use crate::collector::SourceFile;
use crate::constants::{MAX_ARCHIVE_PATH_LEN, MAX_FILE_SIZE};
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use std::path::Path;

/// Validate input file path for accessibility
pub fn validate_input_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(CompressionError::UnsupportedFormat(
            "Input path is not a file".to_string(),
        ));
    }

    Ok(())
}

/// Checks a collected file before it is handed to the compressor: it must be a
/// recognised image type and no larger than [`MAX_FILE_SIZE`].
pub fn validate_source(source: &SourceFile) -> Result<()> {
    if ImageKind::from_mime(&source.mime_type).is_none() {
        return Err(CompressionError::UnsupportedFormat(format!(
            "{} ({})",
            source.path, source.mime_type
        )));
    }

    if source.size > MAX_FILE_SIZE {
        return Err(CompressionError::FileTooLarge(source.size, MAX_FILE_SIZE));
    }

    Ok(())
}

/// Whether `path` is usable as an archive entry name.
pub fn is_valid_archive_path(path: &str) -> bool {
    if path.is_empty() || path.len() > MAX_ARCHIVE_PATH_LEN {
        return false;
    }

    if path
        .chars()
        .any(|c| matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*'))
    {
        return false;
    }

    !path.split('/').any(|segment| segment == "..")
}

/// Forward slashes only, no repeated, leading or trailing separators.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn source(mime: &str, size: u64) -> SourceFile {
        SourceFile {
            file: PathBuf::from("a.jpg"),
            path: "a.jpg".into(),
            relative_path: "a.jpg".into(),
            size,
            mime_type: mime.into(),
            last_modified: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_validate_input_path_not_found() {
        let path = Path::new("nonexistent.jpg");
        let result = validate_input_path(path);
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_input_path_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.jpg");
        let mut file = File::create(&test_file).unwrap();
        file.write_all(b"fake image data").unwrap();

        assert!(validate_input_path(&test_file).is_ok());
        assert!(validate_input_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_validate_source() {
        assert!(validate_source(&source("image/jpeg", 1024)).is_ok());
        assert!(matches!(
            validate_source(&source("text/plain", 10)),
            Err(CompressionError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            validate_source(&source("image/png", MAX_FILE_SIZE + 1)),
            Err(CompressionError::FileTooLarge(_, _))
        ));
    }

    #[test]
    fn test_is_valid_archive_path() {
        assert!(is_valid_archive_path("photos/sub/b.png"));
        assert!(!is_valid_archive_path(""));
        assert!(!is_valid_archive_path("photos/what?.png"));
        assert!(!is_valid_archive_path("../escape.png"));
        assert!(!is_valid_archive_path(&"a".repeat(MAX_ARCHIVE_PATH_LEN + 1)));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("\\photos\\sub\\a.jpg"), "photos/sub/a.jpg");
        assert_eq!(normalize_path("/photos//a.jpg/"), "photos/a.jpg");
        assert_eq!(normalize_path(""), "");
    }
}
