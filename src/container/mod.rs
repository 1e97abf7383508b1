//! Self-describing binary container for generic records
//!
//! A container file starts with a header carrying the writer's schema and
//! a random sync marker, followed by blocks of encoded records:
//!
//! ```text
//! header := "GRC" 0x01 | metadata map | sync(16)
//! block  := long count | long size | data | [crc32 LE] | sync(16)
//! ```
//!
//! Readers need no schema of their own: the header's `genrec.schema` entry
//! is parsed and used to decode every block.

mod checksum;
mod config;
mod encoding;
mod errors;
mod header;
mod reader;
mod writer;

use std::path::Path;

pub use checksum::{compute_checksum, ChecksumMode};
pub use config::WriterConfig;
pub use encoding::{zigzag_decode, zigzag_encode, Decoder, MAX_VARINT_BYTES};
pub use errors::{ContainerError, ContainerResult};
pub use header::{Header, SyncMarker, CHECKSUM_KEY, MAGIC, RESERVED_PREFIX, SCHEMA_KEY, SYNC_SIZE};
pub use reader::ContainerReader;
pub use writer::ContainerWriter;

/// Upper bound on records per block accepted by readers and writers
pub const MAX_BLOCK_RECORDS: u64 = 1 << 24;

/// Upper bound on the encoded size of one block
pub const MAX_BLOCK_BYTES: usize = 1 << 30;

pub(crate) fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stream>".to_string())
}
