//! Container header
//!
//! Layout:
//! - Magic (4 bytes): "GRC" 0x01
//! - Metadata map: long count, count × (string key, bytes value), long 0
//! - Sync marker (16 bytes, random per file)
//!
//! The metadata always carries `genrec.schema` (schema JSON) and
//! `genrec.checksum` (block checksum mode), which makes the file
//! self-describing.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use uuid::Uuid;

use super::checksum::ChecksumMode;
use super::config::WriterConfig;
use super::encoding::{write_bytes, write_long, write_string, StreamDecoder};
use super::errors::{ContainerError, ContainerResult};
use crate::schema::Schema;

pub const MAGIC: [u8; 4] = *b"GRC\x01";
pub const SYNC_SIZE: usize = 16;
pub const SCHEMA_KEY: &str = "genrec.schema";
pub const CHECKSUM_KEY: &str = "genrec.checksum";
/// Metadata keys with this prefix belong to the container format
pub const RESERVED_PREFIX: &str = "genrec.";

const MAX_METADATA_ENTRIES: usize = 1024;
const MAX_METADATA_KEY: usize = 1024;
const MAX_METADATA_VALUE: usize = 16 * 1024 * 1024;

/// Marker written after the header and after every block
pub type SyncMarker = [u8; SYNC_SIZE];

/// A fresh random sync marker (UUID v4 bytes)
pub fn new_sync_marker() -> SyncMarker {
    *Uuid::new_v4().as_bytes()
}

/// Decoded or to-be-written container header
#[derive(Debug, Clone)]
pub struct Header {
    pub schema: Arc<Schema>,
    pub checksum: ChecksumMode,
    pub sync: SyncMarker,
    /// All metadata entries, reserved keys included
    pub metadata: BTreeMap<String, Vec<u8>>,
}

impl Header {
    /// Builds the header a writer emits for `schema` under `config`.
    pub fn new(schema: Arc<Schema>, config: &WriterConfig) -> Self {
        let mut metadata: BTreeMap<String, Vec<u8>> = config
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.as_bytes().to_vec()))
            .collect();
        metadata.insert(SCHEMA_KEY.to_string(), schema.to_json().into_bytes());
        metadata.insert(
            CHECKSUM_KEY.to_string(),
            config.checksum.as_str().as_bytes().to_vec(),
        );

        Self {
            schema,
            checksum: config.checksum,
            sync: new_sync_marker(),
            metadata,
        }
    }

    /// Serializes the header.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(&MAGIC);

        write_long(&mut buf, self.metadata.len() as i64);
        for (key, value) in &self.metadata {
            write_string(&mut buf, key);
            write_bytes(&mut buf, value);
        }
        write_long(&mut buf, 0);

        buf.extend_from_slice(&self.sync);
        buf
    }

    /// Reads and validates a header from the start of a container stream.
    ///
    /// # Errors
    ///
    /// `Corrupt` on a bad magic, malformed metadata, a missing or invalid
    /// embedded schema, an unknown checksum mode, or a short header.
    /// `Io` if the underlying read fails.
    pub fn read_from<R: Read>(stream: &mut StreamDecoder<R>) -> ContainerResult<Self> {
        let mut magic = [0u8; 4];
        stream.read_into(&mut magic, "header magic")?;
        if magic != MAGIC {
            return Err(ContainerError::corrupt(
                0,
                format!("bad magic {:02x?}, not a genrec container", magic),
            ));
        }

        let metadata = read_metadata(stream)?;

        let schema_offset = stream.offset();
        let schema_text = metadata
            .get(SCHEMA_KEY)
            .ok_or_else(|| ContainerError::corrupt(schema_offset, "header has no embedded schema"))?;
        let schema_text = std::str::from_utf8(schema_text).map_err(|e| {
            ContainerError::corrupt(schema_offset, format!("embedded schema is not UTF-8: {}", e))
        })?;
        let schema = Schema::parse(schema_text).map_err(|e| {
            ContainerError::corrupt(schema_offset, format!("embedded schema is invalid: {}", e))
        })?;

        let checksum = metadata
            .get(CHECKSUM_KEY)
            .and_then(|raw| std::str::from_utf8(raw).ok())
            .and_then(ChecksumMode::from_name)
            .ok_or_else(|| {
                ContainerError::corrupt(schema_offset, "missing or unknown checksum mode")
            })?;

        let mut sync = [0u8; SYNC_SIZE];
        stream.read_into(&mut sync, "header sync marker")?;

        Ok(Self {
            schema: Arc::new(schema),
            checksum,
            sync,
            metadata,
        })
    }

    /// Returns a user metadata value as text.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(|raw| std::str::from_utf8(raw).ok())
    }
}

/// Reads map blocks until the zero terminator. A negative count is followed
/// by the block's byte size, which is skipped.
fn read_metadata<R: Read>(
    stream: &mut StreamDecoder<R>,
) -> ContainerResult<BTreeMap<String, Vec<u8>>> {
    let mut metadata = BTreeMap::new();

    loop {
        let offset = stream.offset();
        let mut count = stream.read_long("metadata count")?;
        if count == 0 {
            return Ok(metadata);
        }
        if count < 0 {
            stream.read_long("metadata block size")?;
            count = count.checked_neg().ok_or_else(|| {
                ContainerError::corrupt(offset, "invalid metadata count")
            })?;
        }

        let count = usize::try_from(count)
            .ok()
            .filter(|c| metadata.len() + c <= MAX_METADATA_ENTRIES)
            .ok_or_else(|| {
                ContainerError::corrupt(offset, format!("too many metadata entries ({})", count))
            })?;

        for _ in 0..count {
            let key_offset = stream.offset();
            let key_len = stream.read_len("metadata key", MAX_METADATA_KEY)?;
            let key = String::from_utf8(stream.read_vec(key_len, "metadata key")?).map_err(|e| {
                ContainerError::corrupt(key_offset, format!("metadata key is not UTF-8: {}", e))
            })?;
            let value_len = stream.read_len("metadata value", MAX_METADATA_VALUE)?;
            let value = stream.read_vec(value_len, "metadata value")?;
            metadata.insert(key, value);
        }
    }
}
