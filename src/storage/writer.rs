//! Whole-store replacement writer
//!
//! A store is never updated in place. Every write produces a complete new
//! file next to the target and commits it with a rename:
//!
//! 1. Write header and all segments to `.<name>.tmp.<pid>`
//! 2. fsync the temp file
//! 3. Rename temp over the target
//! 4. fsync the parent directory
//!
//! Any failure before step 3 removes the temp file and leaves the previous
//! store untouched.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::column::Table;
use super::errors::{StorageError, StorageResult};
use super::segment::{serialize_segment, StoreHeader};

/// Writes complete stores atomically.
pub struct StoreWriter {
    store_path: PathBuf,
}

impl StoreWriter {
    /// Creates a writer targeting `store_path`.
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
        }
    }

    /// Returns the path of the committed store.
    pub fn path(&self) -> &Path {
        &self.store_path
    }

    fn temp_path(&self) -> StorageResult<PathBuf> {
        let file_name = self
            .store_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                StorageError::write_failed_no_source(format!(
                    "Store path has no file name: {}",
                    self.store_path.display()
                ))
            })?;
        Ok(self
            .store_path
            .with_file_name(format!(".{}.tmp.{}", file_name, std::process::id())))
    }

    /// Replaces the store with exactly `tables`, in order.
    ///
    /// Returns the number of bytes in the committed file.
    ///
    /// # Errors
    ///
    /// Returns `TRIPDB_STORAGE_WRITE_FAILED` if any step before the rename
    /// fails; the previous store is then unchanged.
    pub fn replace(&self, tables: &[Table]) -> StorageResult<u64> {
        if let Some(parent) = self.store_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::write_failed(
                        format!("Failed to create store directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let temp_path = self.temp_path()?;
        let written = match Self::write_temp(&temp_path, tables) {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&temp_path, &self.store_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::write_failed(
                format!(
                    "Failed to commit store: {}",
                    self.store_path.display()
                ),
                e,
            ));
        }

        // Make the rename durable
        if let Some(parent) = self.store_path.parent() {
            let dir = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if let Ok(dir) = File::open(dir) {
                let _ = dir.sync_all();
            }
        }

        Ok(written)
    }

    fn write_temp(temp_path: &Path, tables: &[Table]) -> StorageResult<u64> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to create temp store: {}", temp_path.display()),
                    e,
                )
            })?;

        let segment_count = u32::try_from(tables.len()).map_err(|_| {
            StorageError::write_failed_no_source("Too many tables for one store")
        })?;

        let mut writer = BufWriter::new(file);
        let mut written = 0u64;

        let header = StoreHeader::new(segment_count).serialize();
        writer
            .write_all(&header)
            .map_err(|e| StorageError::write_failed("Failed to write store header", e))?;
        written += header.len() as u64;

        for table in tables {
            let segment = serialize_segment(table);
            writer.write_all(&segment).map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to write table segment: {}", table.name),
                    e,
                )
            })?;
            written += segment.len() as u64;
        }

        let file = writer.into_inner().map_err(|e| {
            StorageError::write_failed("Failed to flush temp store", e.into_error())
        })?;

        // fsync - mandatory before the rename commits the file
        file.sync_all()
            .map_err(|e| StorageError::write_failed("fsync failed for temp store", e))?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::column::ColumnData;
    use tempfile::TempDir;

    #[test]
    fn test_replace_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db").join("taxi.tripdb");
        let writer = StoreWriter::new(&path);

        let table = Table::new("trips").with_column("x", ColumnData::Int64(vec![Some(1)]));
        let bytes = writer.replace(&[table]).unwrap();

        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), bytes);
    }

    #[test]
    fn test_replace_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("taxi.tripdb");
        StoreWriter::new(&path).replace(&[]).unwrap();

        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["taxi.tripdb".to_string()]);
    }

    #[test]
    fn test_replace_overwrites_previous_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("taxi.tripdb");
        let writer = StoreWriter::new(&path);

        let big = Table::new("trips").with_column("x", ColumnData::Int64(vec![Some(1); 100]));
        let small = Table::new("trips").with_column("x", ColumnData::Int64(vec![Some(1)]));

        let first = writer.replace(&[big]).unwrap();
        let second = writer.replace(&[small]).unwrap();
        assert!(second < first);
        assert_eq!(fs::metadata(&path).unwrap().len(), second);
    }
}
