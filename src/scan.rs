use crate::error::DiscoveryError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Lists every regular, non-hidden file below `root`, depth-first and sorted
/// by file name within each directory. Directories are always entered, even
/// hidden ones; only the files themselves are filtered.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_type().is_dir() || !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|source| DiscoveryError {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
