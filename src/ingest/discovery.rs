//! Source path expansion
//!
//! Sources are a set: directories expand to the `*.parquet` files directly
//! inside them, every file is canonicalized, and the final list is sorted and
//! deduplicated so a file named twice (relative and absolute, or through
//! `..`) is read once and the same inputs always ingest in the same order.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{IngestError, IngestResult};

const SOURCE_EXTENSION: &str = "parquet";

/// Expands `paths` into the sorted list of canonical source files to ingest.
pub fn resolve_sources(paths: &[PathBuf]) -> IngestResult<Vec<PathBuf>> {
    if paths.is_empty() {
        return Err(IngestError::NoSources);
    }

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let before = files.len();
            expand_dir(path, &mut files)?;
            if files.len() == before {
                return Err(IngestError::not_found(&path.join(format!("*.{}", SOURCE_EXTENSION))));
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(IngestError::not_found(path));
        }
    }

    let mut files = files
        .into_iter()
        .map(|file| fs::canonicalize(&file).map_err(|e| IngestError::unreadable(&file, e)))
        .collect::<IngestResult<Vec<_>>>()?;
    files.sort();
    files.dedup();
    Ok(files)
}

fn expand_dir(dir: &Path, files: &mut Vec<PathBuf>) -> IngestResult<()> {
    let entries = fs::read_dir(dir).map_err(|e| IngestError::unreadable(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| IngestError::unreadable(dir, e))?;
        let path = entry.path();
        let is_source = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION));
        if is_source && path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}
