//! Source file discovery and loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::error::CompilerError;
use crate::base::constants::SOURCE_EXT;

/// Whether `path` has the `.archml` extension.
pub fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXT)
}

/// Collect every `.archml` file under `root`, sorted.
///
/// Directories in `exclude` (typically the build directory) are not entered.
pub fn collect_source_files(root: &Path, exclude: &[&Path]) -> io::Result<Vec<PathBuf>> {
    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !exclude.iter().any(|ex| entry.path().starts_with(ex)));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_source_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Read a source file as UTF-8.
pub fn load_source(path: &Path) -> Result<String, CompilerError> {
    fs::read_to_string(path).map_err(|source| CompilerError::Io {
        file: path.to_path_buf(),
        source,
    })
}
