//! Directory listing using walkdir.

use crate::error::LibraryError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Decides which directory entries belong to the library
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryFilter {
    include_hidden: bool,
}

impl EntryFilter {
    pub fn new(include_hidden: bool) -> Self {
        Self { include_hidden }
    }

    /// Regular files only; dot files unless configured otherwise
    pub fn should_include(&self, entry: &DirEntry) -> bool {
        if !entry.path().is_file() {
            return false;
        }

        if !self.include_hidden {
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        true
    }
}

/// List the files directly inside `root`.
///
/// Any unreadable entry fails the whole listing: a partial listing would
/// make the next incremental diff report files that were never gone.
pub fn list_files(root: &Path, filter: EntryFilter) -> Result<Vec<PathBuf>, LibraryError> {
    if !root.is_dir() {
        return Err(LibraryError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry_result in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry_result.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            LibraryError::storage(path, e.into())
        })?;

        if filter.should_include(&entry) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn names(files: &[PathBuf]) -> Vec<String> {
        let mut names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn lists_files_but_not_directories() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("1.jpg")).unwrap();
        fs::create_dir(temp_dir.path().join("2")).unwrap();
        File::create(temp_dir.path().join("2").join("3.jpg")).unwrap();

        let files = list_files(temp_dir.path(), EntryFilter::default()).unwrap();

        assert_eq!(names(&files), vec!["1.jpg"]);
    }

    #[test]
    fn hidden_files_excluded_by_default() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("1.jpg")).unwrap();
        File::create(temp_dir.path().join(".2.jpg")).unwrap();

        let files = list_files(temp_dir.path(), EntryFilter::default()).unwrap();
        assert_eq!(names(&files), vec!["1.jpg"]);

        let files = list_files(temp_dir.path(), EntryFilter::new(true)).unwrap();
        assert_eq!(names(&files), vec![".2.jpg", "1.jpg"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = list_files(Path::new("/nonexistent/path/12345"), EntryFilter::default());
        assert!(matches!(result, Err(LibraryError::DirectoryNotFound { .. })));
    }
}
