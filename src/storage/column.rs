//! Column blocks and in-memory tables
//!
//! Each column block is laid out as:
//!
//! ```text
//! +------------------+
//! | Column Name      | (u32 LE length + UTF-8 bytes)
//! +------------------+
//! | Type Tag         | (u8)
//! +------------------+
//! | Row Count        | (u64 LE)
//! +------------------+
//! | Validity         | (one u8 per row: 0 = null, 1 = present)
//! +------------------+
//! | Values           | (fixed 8 bytes per row, or u32 length + bytes for utf8)
//! +------------------+
//! ```
//!
//! Null slots still occupy their fixed-width value (zeroed) so the layout of a
//! column depends only on its row count.

use std::fmt;

use super::errors::{StorageError, StorageResult};

/// Physical column types understood by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit signed integer
    Int64,
    /// 64-bit IEEE float
    Float64,
    /// UTF-8 string
    Utf8,
    /// Microseconds since the Unix epoch, no time zone
    Timestamp,
}

impl ColumnType {
    fn tag(self) -> u8 {
        match self {
            ColumnType::Int64 => 1,
            ColumnType::Float64 => 2,
            ColumnType::Utf8 => 3,
            ColumnType::Timestamp => 4,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(ColumnType::Int64),
            2 => Some(ColumnType::Float64),
            3 => Some(ColumnType::Utf8),
            4 => Some(ColumnType::Timestamp),
            _ => None,
        }
    }

    /// Returns the type name for messages
    pub fn type_name(self) -> &'static str {
        match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Utf8 => "utf8",
            ColumnType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Values of one column, nulls included
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
    Timestamp(Vec<Option<i64>>),
}

impl ColumnData {
    /// Returns the physical type of this column
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Int64(_) => ColumnType::Int64,
            ColumnData::Float64(_) => ColumnType::Float64,
            ColumnData::Utf8(_) => ColumnType::Utf8,
            ColumnData::Timestamp(_) => ColumnType::Timestamp,
        }
    }

    /// Number of rows, nulls included
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) | ColumnData::Timestamp(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.push(self.column_type().tag());
        buf.extend_from_slice(&(self.len() as u64).to_le_bytes());

        match self {
            ColumnData::Int64(values) | ColumnData::Timestamp(values) => {
                buf.extend(values.iter().map(|v| v.is_some() as u8));
                for v in values {
                    buf.extend_from_slice(&v.unwrap_or(0).to_le_bytes());
                }
            }
            ColumnData::Float64(values) => {
                buf.extend(values.iter().map(|v| v.is_some() as u8));
                for v in values {
                    buf.extend_from_slice(&v.unwrap_or(0.0).to_bits().to_le_bytes());
                }
            }
            ColumnData::Utf8(values) => {
                buf.extend(values.iter().map(|v| v.is_some() as u8));
                for v in values {
                    let s = v.as_deref().unwrap_or("");
                    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
                    buf.extend_from_slice(s.as_bytes());
                }
            }
        }
    }

    fn decode(decoder: &mut Decoder<'_>) -> StorageResult<Self> {
        let tag = decoder.read_u8()?;
        let column_type = ColumnType::from_tag(tag).ok_or_else(|| {
            StorageError::corruption_at_offset(
                decoder.offset(),
                format!("Unknown column type tag {}", tag),
            )
        })?;
        let rows = decoder.read_len_u64()?;
        let validity = decoder.read_bytes(rows)?.to_vec();

        let data = match column_type {
            ColumnType::Int64 | ColumnType::Timestamp => {
                let mut values = Vec::with_capacity(rows);
                for present in &validity {
                    let v = i64::from_le_bytes(decoder.read_array()?);
                    values.push((*present != 0).then_some(v));
                }
                if column_type == ColumnType::Int64 {
                    ColumnData::Int64(values)
                } else {
                    ColumnData::Timestamp(values)
                }
            }
            ColumnType::Float64 => {
                let mut values = Vec::with_capacity(rows);
                for present in &validity {
                    let v = f64::from_bits(u64::from_le_bytes(decoder.read_array()?));
                    values.push((*present != 0).then_some(v));
                }
                ColumnData::Float64(values)
            }
            ColumnType::Utf8 => {
                let mut values = Vec::with_capacity(rows);
                for present in &validity {
                    let s = decoder.read_string()?;
                    values.push((*present != 0).then_some(s));
                }
                ColumnData::Utf8(values)
            }
        };

        Ok(data)
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// A named table held column-wise in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Creates a table with no columns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column, builder style
    pub fn with_column(mut self, name: impl Into<String>, data: ColumnData) -> Self {
        self.columns.push(Column {
            name: name.into(),
            data,
        });
        self
    }

    /// Number of rows (all columns share the same length)
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.data)
    }

    /// Checks that every column has the same number of rows
    pub fn is_rectangular(&self) -> bool {
        let rows = self.row_count();
        self.columns.iter().all(|c| c.data.len() == rows)
    }

    /// Encodes all column blocks, preceded by the column count
    pub(crate) fn encode_columns(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.columns.len() as u32).to_le_bytes());
        for column in &self.columns {
            buf.extend_from_slice(&(column.name.len() as u32).to_le_bytes());
            buf.extend_from_slice(column.name.as_bytes());
            column.data.encode_into(buf);
        }
    }

    /// Decodes the column blocks written by [`Table::encode_columns`]
    pub(crate) fn decode_columns(
        name: String,
        decoder: &mut Decoder<'_>,
    ) -> StorageResult<Self> {
        let count = decoder.read_u32()? as usize;
        let mut table = Table::new(name);
        for _ in 0..count {
            let column_name = decoder.read_string()?;
            let data = ColumnData::decode(decoder)?;
            table.columns.push(Column {
                name: column_name,
                data,
            });
        }

        if !table.is_rectangular() {
            return Err(StorageError::corruption_in_table(
                &table.name,
                "Columns have differing row counts",
            ));
        }

        Ok(table)
    }
}

/// Bounds-checked little-endian reader over a verified segment body
pub(crate) struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    base_offset: u64,
}

impl<'a> Decoder<'a> {
    /// `base_offset` is the file offset of `buf[0]`, used in error context
    pub(crate) fn new(buf: &'a [u8], base_offset: u64) -> Self {
        Self {
            buf,
            pos: 0,
            base_offset,
        }
    }

    pub(crate) fn offset(&self) -> u64 {
        self.base_offset + self.pos as u64
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> StorageResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                StorageError::corruption_at_offset(
                    self.offset(),
                    format!(
                        "Truncated segment: need {} bytes, {} remaining",
                        len,
                        self.buf.len() - self.pos
                    ),
                )
            })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> StorageResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> StorageResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub(crate) fn read_u32(&mut self) -> StorageResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_u64(&mut self) -> StorageResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads a u64 length and checks it fits in memory addressing
    pub(crate) fn read_len_u64(&mut self) -> StorageResult<usize> {
        let offset = self.offset();
        let len = self.read_u64()?;
        usize::try_from(len).map_err(|_| {
            StorageError::corruption_at_offset(offset, format!("Length {} out of range", len))
        })
    }

    pub(crate) fn read_string(&mut self) -> StorageResult<String> {
        let len = self.read_u32()? as usize;
        let offset = self.offset();
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            StorageError::corruption_at_offset(offset, format!("Invalid UTF-8: {}", e))
        })
    }
}
