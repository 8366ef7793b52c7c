//! Directory Scanner - Lists loadable files and validates the input directory

use crate::error::{LoadError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// List every regular file in `dir`.
///
/// Subdirectories are skipped; symlinks that resolve to files are kept.
/// Order follows the filesystem enumeration order.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Validate the input directory before any load attempt.
///
/// Fails if the path is not a directory, or if the directory has no entries.
pub fn check_directory_structure(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory(dir.to_path_buf()));
    }
    if fs::read_dir(dir)?.next().is_none() {
        return Err(LoadError::EmptyDirectory(dir.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("flatload_fs_{}_{}", tag, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn list_files_skips_subdirectories() {
        let dir = scratch_dir("list");
        File::create(dir.join("a.csv")).unwrap();
        File::create(dir.join("b.csv")).unwrap();
        fs::create_dir(dir.join("nested")).unwrap();

        let mut files = list_files(&dir).unwrap();
        files.sort();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.is_file()));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_directory_is_rejected() {
        let dir = scratch_dir("empty");
        let err = check_directory_structure(&dir).unwrap_err();
        assert!(matches!(err, LoadError::EmptyDirectory(_)));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let dir = scratch_dir("notdir");
        let file = dir.join("plain.csv");
        File::create(&file).unwrap();

        let err = check_directory_structure(&file).unwrap_err();
        assert!(matches!(err, LoadError::NotADirectory(_)));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn populated_directory_passes() {
        let dir = scratch_dir("ok");
        File::create(dir.join("a.csv")).unwrap();
        assert!(check_directory_structure(&dir).is_ok());
        fs::remove_dir_all(&dir).unwrap();
    }
}
