//! Store file header and table segment framing
//!
//! The store file format is:
//!
//! ```text
//! +------------------+
//! | Magic            | (8 bytes, "TRIPDB\0\0")
//! +------------------+
//! | Format Version   | (u32 LE)
//! +------------------+
//! | Segment Count    | (u32 LE)
//! +------------------+
//! | Segment 0..N     |
//! +------------------+
//! ```
//!
//! and each segment is:
//!
//! ```text
//! +------------------+
//! | Body Length      | (u64 LE)
//! +------------------+
//! | Table Name       | (u32 LE length + UTF-8 bytes)
//! +------------------+
//! | Row Count        | (u64 LE)
//! +------------------+
//! | Column Blocks    | (see column.rs)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers the length field and the body.

use super::checksum::compute_checksum;
use super::column::{Decoder, Table};
use super::errors::{StorageError, StorageResult};

/// File magic
pub const MAGIC: [u8; 8] = *b"TRIPDB\0\0";

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// Size of the fixed file header
pub const HEADER_LEN: usize = 8 + 4 + 4;

/// Fixed file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHeader {
    pub version: u32,
    pub segment_count: u32,
}

impl StoreHeader {
    pub fn new(segment_count: u32) -> Self {
        Self {
            version: FORMAT_VERSION,
            segment_count,
        }
    }

    pub fn serialize(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..8].copy_from_slice(&MAGIC);
        out[8..12].copy_from_slice(&self.version.to_le_bytes());
        out[12..16].copy_from_slice(&self.segment_count.to_le_bytes());
        out
    }

    pub fn deserialize(data: &[u8; HEADER_LEN]) -> StorageResult<Self> {
        if data[..8] != MAGIC {
            return Err(StorageError::corruption_at_offset(
                0,
                "Not a tripdb store: bad magic",
            ));
        }

        let mut decoder = Decoder::new(&data[8..], 8);
        let version = decoder.read_u32()?;
        if version != FORMAT_VERSION {
            return Err(StorageError::corruption_at_offset(
                8,
                format!(
                    "Unsupported store format version {} (expected {})",
                    version, FORMAT_VERSION
                ),
            ));
        }
        let segment_count = decoder.read_u32()?;

        Ok(Self {
            version,
            segment_count,
        })
    }
}

/// Serializes one table into a framed, checksummed segment.
pub fn serialize_segment(table: &Table) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&(table.name.len() as u32).to_le_bytes());
    body.extend_from_slice(table.name.as_bytes());
    body.extend_from_slice(&(table.row_count() as u64).to_le_bytes());
    table.encode_columns(&mut body);

    let length = (body.len() as u64).to_le_bytes();

    let mut segment = Vec::with_capacity(8 + body.len() + 4);
    segment.extend_from_slice(&length);
    segment.extend_from_slice(&body);
    let checksum = compute_checksum(&segment);
    segment.extend_from_slice(&checksum.to_le_bytes());

    segment
}

/// Verifies and decodes a segment body.
///
/// `length` is the raw length field, `body` the bytes it announced, and
/// `stored_checksum` the trailing checksum. `offset` is the file offset of the
/// length field.
pub fn deserialize_segment(
    length: [u8; 8],
    body: &[u8],
    stored_checksum: u32,
    offset: u64,
) -> StorageResult<Table> {
    let mut checked = Vec::with_capacity(8 + body.len());
    checked.extend_from_slice(&length);
    checked.extend_from_slice(body);
    let computed = compute_checksum(&checked);

    if computed != stored_checksum {
        return Err(StorageError::corruption_at_offset(
            offset,
            format!(
                "Checksum mismatch: computed {:08x}, stored {:08x}",
                computed, stored_checksum
            ),
        ));
    }

    let mut decoder = Decoder::new(body, offset + 8);
    let name = decoder.read_string()?;
    let row_count = decoder.read_len_u64()?;
    let table = Table::decode_columns(name, &mut decoder)?;

    if !decoder.is_exhausted() {
        return Err(StorageError::corruption_in_table(
            &table.name,
            "Trailing bytes after last column",
        ));
    }
    if !table.columns.is_empty() && table.row_count() != row_count {
        return Err(StorageError::corruption_in_table(
            &table.name,
            format!(
                "Row count mismatch: header says {}, columns hold {}",
                row_count,
                table.row_count()
            ),
        ));
    }

    Ok(table)
}
