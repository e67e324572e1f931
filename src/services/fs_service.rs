use crate::error::AppError;
use crate::models::fs_types::{EntryKind, FileEntry};
use std::path::Path;

/// Marks source files that need a fresh index before they land in the target.
pub const RESERVED_PREFIX: &str = "pcr";

pub fn entry_kind(name: &str) -> EntryKind {
    if name.starts_with(RESERVED_PREFIX) {
        EntryKind::Prefixed
    } else {
        EntryKind::Plain
    }
}

/// List regular files in `dir` (non-recursive), sorted by name.
/// Entries that cannot be inspected are skipped.
pub fn list_files(dir: &Path) -> Result<Vec<FileEntry>, AppError> {
    if !dir.exists() {
        return Err(format!("Path does not exist: {}", dir.display()).into());
    }

    let read_dir = std::fs::read_dir(dir).map_err(|e| {
        AppError::new(format!("Cannot read directory {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();

    for entry in read_dir {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let ft = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if !ft.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let name = file_name.to_string_lossy().to_string();
        files.push(FileEntry {
            kind: entry_kind(&name),
            path: entry.path(),
            file_name,
            name,
        });
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

pub fn count_files(dir: &Path) -> Result<usize, AppError> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| {
        AppError::new(format!("Cannot read directory {}: {}", dir.display(), e))
    })?;

    Ok(read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .count())
}
