//! CRC32 checksum computation for table segments
//!
//! Every segment read validates its checksum; any mismatch aborts the read.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
