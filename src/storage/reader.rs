//! Store reader with strict corruption detection
//!
//! - Header magic and version are checked on open
//! - Every segment checksum is validated before decoding
//! - Truncation, trailing bytes and ragged columns are corruption

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::column::Table;
use super::errors::{StorageError, StorageResult};
use super::segment::{deserialize_segment, StoreHeader, HEADER_LEN};

/// Sequential reader over the segments of one store file.
///
/// The reader owns the open file handle; dropping it releases the store.
pub struct StoreReader {
    store_path: PathBuf,
    reader: BufReader<File>,
    header: StoreHeader,
    current_offset: u64,
    file_size: u64,
    segments_read: u32,
}

impl StoreReader {
    /// Opens a store and validates its header.
    ///
    /// # Errors
    ///
    /// - `TRIPDB_STORE_NOT_FOUND` if the file does not exist
    /// - `TRIPDB_DATA_CORRUPTION` if the header is invalid
    pub fn open(store_path: &Path) -> StorageResult<Self> {
        let file = File::open(store_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::not_found(store_path)
            } else {
                StorageError::read_failed(
                    format!("Failed to open store: {}", store_path.display()),
                    e,
                )
            }
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::read_failed("Failed to read store metadata", e))?
            .len();

        if file_size < HEADER_LEN as u64 {
            return Err(StorageError::corruption_at_offset(
                0,
                format!(
                    "Truncated store: {} bytes, header needs {}",
                    file_size, HEADER_LEN
                ),
            ));
        }

        let mut reader = BufReader::new(file);
        let mut header_buf = [0u8; HEADER_LEN];
        reader
            .read_exact(&mut header_buf)
            .map_err(|e| StorageError::read_failed("Failed to read store header", e))?;
        let header = StoreHeader::deserialize(&header_buf)?;

        Ok(Self {
            store_path: store_path.to_path_buf(),
            reader,
            header,
            current_offset: HEADER_LEN as u64,
            file_size,
            segments_read: 0,
        })
    }

    /// Returns the store file path.
    pub fn path(&self) -> &Path {
        &self.store_path
    }

    /// Returns the number of segments announced by the header.
    pub fn segment_count(&self) -> u32 {
        self.header.segment_count
    }

    /// Returns the store file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Reads and verifies the next table.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(table))` if a segment was read
    /// - `Ok(None)` once all announced segments were read
    /// - `Err(TRIPDB_DATA_CORRUPTION)` on any framing or checksum failure
    pub fn read_next(&mut self) -> StorageResult<Option<Table>> {
        if self.segments_read == self.header.segment_count {
            if self.current_offset != self.file_size {
                return Err(StorageError::corruption_at_offset(
                    self.current_offset,
                    "Trailing bytes after last segment",
                ));
            }
            return Ok(None);
        }

        let segment_offset = self.current_offset;
        let remaining = self.file_size - self.current_offset;
        if remaining < 8 + 4 {
            return Err(StorageError::corruption_at_offset(
                segment_offset,
                format!("Truncated store: {} bytes remaining", remaining),
            ));
        }

        let mut length = [0u8; 8];
        self.read_exact(&mut length)?;
        let body_len = u64::from_le_bytes(length);

        if body_len > remaining - 8 - 4 {
            return Err(StorageError::corruption_at_offset(
                segment_offset,
                format!(
                    "Segment length {} exceeds remaining {} bytes",
                    body_len,
                    remaining - 8 - 4
                ),
            ));
        }

        let mut body = vec![0u8; body_len as usize];
        self.read_exact(&mut body)?;

        let mut checksum = [0u8; 4];
        self.read_exact(&mut checksum)?;

        let table =
            deserialize_segment(length, &body, u32::from_le_bytes(checksum), segment_offset)?;
        self.segments_read += 1;

        Ok(Some(table))
    }

    /// Reads every table in file order.
    pub fn read_all(&mut self) -> StorageResult<Vec<Table>> {
        let mut tables = Vec::with_capacity(self.header.segment_count as usize);
        while let Some(table) = self.read_next()? {
            tables.push(table);
        }
        Ok(tables)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        self.reader.read_exact(buf).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read {} bytes: {}", buf.len(), e),
            )
        })?;
        self.current_offset += buf.len() as u64;
        Ok(())
    }
}
