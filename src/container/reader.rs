//! Container reader with strict corruption detection
//!
//! - The header is decoded and validated when the reader is created
//! - Blocks are read one at a time; a block is only handed out once its
//!   checksum, sync marker and record bodies have all been verified
//! - Records of a verified block are decoded one per call
//! - EOF exactly at a block boundary is the end of the stream
//! - Any error stops the reader: later calls return `Ok(None)`

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::checksum::ChecksumMode;
use super::encoding::{min_record_len, Decoder, StreamDecoder};
use super::errors::{ContainerError, ContainerResult};
use super::header::{Header, SYNC_SIZE};
use super::{display_path, MAX_BLOCK_BYTES, MAX_BLOCK_RECORDS};
use crate::observability::{log_event_with_fields, Event};
use crate::record::Record;
use crate::schema::Schema;

/// Verified block data and the decode cursor into it.
struct PendingBlock {
    data: Vec<u8>,
    base_offset: u64,
    pos: usize,
    remaining: u64,
}

/// Sequential reader over a container's records.
pub struct ContainerReader<R: Read> {
    stream: StreamDecoder<R>,
    header: Header,
    path: Option<PathBuf>,
    /// Fewest bytes one record of the header schema occupies
    min_record_len: usize,
    /// Verified block whose records are still being returned
    pending: Option<PendingBlock>,
    records_read: u64,
    blocks_read: u64,
    /// Set at end of stream or after the first error
    done: bool,
}

impl ContainerReader<BufReader<File>> {
    /// Opens a container file and decodes its header.
    ///
    /// # Errors
    ///
    /// - `Io` if the file is missing or unreadable
    /// - `Corrupt` if the header is invalid
    pub fn open(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ContainerError::io(format!("failed to open {}", path.display()), e)
        })?;
        Self::start(BufReader::new(file), Some(path.to_path_buf()))
    }
}

impl<R: Read> ContainerReader<R> {
    /// Reads a container from an arbitrary source.
    pub fn from_reader(source: R) -> ContainerResult<Self> {
        Self::start(source, None)
    }

    fn start(source: R, path: Option<PathBuf>) -> ContainerResult<Self> {
        let path_text = display_path(path.as_deref());

        let mut stream = StreamDecoder::new(source);
        let header = Header::read_from(&mut stream).map_err(|e| {
            log_failure(&path_text, &e);
            e
        })?;

        let schema_name = header.schema.full_name();
        log_event_with_fields(
            Event::ContainerOpen,
            &[
                ("path", path_text.as_str()),
                ("schema", schema_name.as_str()),
                ("checksum", header.checksum.as_str()),
            ],
        );

        let min_record_len = min_record_len(&header.schema);
        Ok(Self {
            stream,
            header,
            path,
            min_record_len,
            pending: None,
            records_read: 0,
            blocks_read: 0,
            done: false,
        })
    }

    /// The writer's schema, recovered from the header
    pub fn schema(&self) -> &Arc<Schema> {
        &self.header.schema
    }

    /// Looks up a header metadata value as text.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.header.metadata_str(key)
    }

    pub fn checksum(&self) -> ChecksumMode {
        self.header.checksum
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Records returned so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Blocks fully verified so far
    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    /// Reads the next record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if a record was read
    /// - `Ok(None)` at the end of the stream, or after an earlier error
    /// - `Err(ContainerError)` on corruption or a read failure
    pub fn next_record(&mut self) -> ContainerResult<Option<Record>> {
        if self.done {
            return Ok(None);
        }

        match self.advance() {
            Ok(Some(record)) => {
                self.records_read += 1;
                Ok(Some(record))
            }
            Ok(None) => {
                self.done = true;
                Ok(None)
            }
            Err(e) => {
                self.done = true;
                log_failure(&display_path(self.path.as_deref()), &e);
                Err(e)
            }
        }
    }

    /// Reads every remaining record.
    pub fn read_all(&mut self) -> ContainerResult<Vec<Record>> {
        self.by_ref().collect()
    }

    fn advance(&mut self) -> ContainerResult<Option<Record>> {
        loop {
            if let Some(block) = self.pending.as_mut().filter(|b| b.remaining > 0) {
                let mut decoder = Decoder::at(&block.data, block.pos, block.base_offset);
                let record = decoder.decode_record(&self.header.schema)?;
                block.pos = decoder.position();
                block.remaining -= 1;
                return Ok(Some(record));
            }

            self.pending = self.load_block()?;
            if self.pending.is_none() {
                return Ok(None);
            }
        }
    }

    /// Reads and verifies one block. Returns `None` on a clean end of stream.
    fn load_block(&mut self) -> ContainerResult<Option<PendingBlock>> {
        let block_offset = self.stream.offset();
        let count = match self.stream.read_long_or_eof("block record count")? {
            Some(count) => count,
            None => return Ok(None),
        };
        if count <= 0 || count as u64 > MAX_BLOCK_RECORDS {
            return Err(ContainerError::corrupt(
                block_offset,
                format!("invalid block record count {}", count),
            ));
        }

        let size = self.stream.read_len("block size", MAX_BLOCK_BYTES)?;
        if self.min_record_len > 0 && count as u64 > (size / self.min_record_len) as u64 {
            return Err(ContainerError::corrupt(
                block_offset,
                format!(
                    "block declares {} records in {} bytes, each needs at least {}",
                    count, size, self.min_record_len
                ),
            ));
        }
        let data_offset = self.stream.offset();
        let data = self.stream.read_vec(size, "block data")?;

        let trailer_offset = self.stream.offset();
        let mut trailer = vec![0u8; self.header.checksum.trailer_len()];
        self.stream.read_into(&mut trailer, "block checksum")?;
        if let Err((computed, stored)) = self.header.checksum.verify(&data, &trailer) {
            return Err(ContainerError::corrupt(
                trailer_offset,
                format!(
                    "checksum mismatch: computed {:08x}, stored {:08x}",
                    computed, stored
                ),
            ));
        }

        let sync_offset = self.stream.offset();
        let mut sync = [0u8; SYNC_SIZE];
        self.stream.read_into(&mut sync, "block sync marker")?;
        if sync != self.header.sync {
            return Err(ContainerError::corrupt(sync_offset, "sync marker mismatch"));
        }

        // All-null records occupy no bytes and cannot be malformed
        let mut decoder = Decoder::new(&data, data_offset);
        if self.min_record_len > 0 {
            for _ in 0..count {
                decoder.skip_record(&self.header.schema)?;
            }
        }
        if !decoder.is_empty() {
            return Err(ContainerError::corrupt(
                decoder.offset(),
                format!(
                    "block declares {} bytes but its {} records use {}",
                    size,
                    count,
                    decoder.position()
                ),
            ));
        }

        self.blocks_read += 1;
        Ok(Some(PendingBlock {
            data,
            base_offset: data_offset,
            pos: 0,
            remaining: count as u64,
        }))
    }
}

impl<R: Read> Iterator for ContainerReader<R> {
    type Item = ContainerResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn log_failure(path: &str, err: &ContainerError) {
    let event = if err.is_corruption() {
        Event::ContainerCorruption
    } else {
        Event::ContainerReadFailed
    };
    let error = err.to_string();
    log_event_with_fields(
        event,
        &[("path", path), ("code", err.code()), ("error", error.as_str())],
    );
}
