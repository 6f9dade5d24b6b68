//! Filesystem operations
//!
//! Handles file and directory operations.

use std::path::Path;

use tempfile::TempDir;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Create the parent directory of a file
pub fn create_parent_dir(path: &Path) -> Result<(), FilesystemError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    create_parent_dir(path)?;
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Copy a single file, creating the destination's parent directory
pub fn copy_file(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    create_parent_dir(to)?;
    std::fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| FilesystemError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            error: e.to_string(),
        })
}

/// Copy a file or a directory tree
///
/// Directories are copied recursively; symlinks inside them are followed.
/// Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize, FilesystemError> {
    if !from.is_dir() {
        copy_file(from, to)?;
        return Ok(1);
    }

    let mut copied = 0;
    for entry in walkdir::WalkDir::new(from).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| FilesystemError::ReadFile {
            path: e.path().unwrap_or(from).to_path_buf(),
            error: e.to_string(),
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Create a temporary working directory, removed when dropped
pub fn temp_dir() -> Result<TempDir, FilesystemError> {
    tempfile::Builder::new()
        .prefix("boot-artifacts-")
        .tempdir()
        .map_err(|e| FilesystemError::TempDir {
            error: e.to_string(),
        })
}

/// Remove a file if it exists, ignoring errors
pub fn remove_partial(path: &Path) {
    if path.is_file() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("Failed to remove partial output {}: {}", path.display(), e);
        }
    }
}
