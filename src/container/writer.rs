//! Container writer
//!
//! Records are encoded into an in-memory block which is written out as one
//! framed unit once it reaches `block_records` records or `block_bytes`
//! bytes:
//!
//! ```text
//! long record_count | long byte_size | data | [u32 LE crc32] | sync marker
//! ```
//!
//! The writer owns its sink exclusively. `close` flushes the pending block
//! and the sink; a writer dropped without `close` does the same on a best
//! effort basis and logs any failure.
//!
//! A failed block write may leave a partial frame in the sink, so the
//! writer refuses every later append, flush or close with `Failed`.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::config::WriterConfig;
use super::encoding::{encode_record, write_long};
use super::errors::{ContainerError, ContainerResult};
use super::header::Header;
use super::{display_path, MAX_BLOCK_BYTES};
use crate::observability::{log_event_with_fields, Event};
use crate::record::Record;
use crate::schema::Schema;

/// Writes records of one schema into a container.
pub struct ContainerWriter<W: Write> {
    sink: W,
    header: Header,
    config: WriterConfig,
    /// Destination path, when writing to a file
    path: Option<PathBuf>,
    /// Encoded bodies of the pending block
    block: Vec<u8>,
    block_records: u64,
    records_written: u64,
    blocks_written: u64,
    /// Block number whose write failed, if any
    failed_block: Option<u64>,
    closed: bool,
}

impl ContainerWriter<BufWriter<File>> {
    /// Creates a container file at `path` and writes its header.
    ///
    /// An existing file is truncated unless `config.overwrite` is false, in
    /// which case it is left untouched and an `Io` error is returned.
    ///
    /// # Errors
    ///
    /// - `Config` if the configuration is invalid
    /// - `Io` if the file cannot be created or the header cannot be written
    pub fn create(
        schema: impl Into<Arc<Schema>>,
        path: impl AsRef<Path>,
        config: WriterConfig,
    ) -> ContainerResult<Self> {
        config.validate()?;
        let path = path.as_ref();

        let mut options = OpenOptions::new();
        options.write(true);
        if config.overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let file = options.open(path).map_err(|e| {
            ContainerError::io(format!("failed to create {}", path.display()), e)
        })?;

        Self::start(
            schema.into(),
            BufWriter::new(file),
            config,
            Some(path.to_path_buf()),
        )
    }

    /// Flushes everything written so far and syncs the file to disk.
    pub fn fsync(&mut self) -> ContainerResult<()> {
        self.flush()?;
        self.flush_sink()?;
        self.sink
            .get_ref()
            .sync_all()
            .map_err(|e| ContainerError::io("fsync failed", e))
    }
}

impl<W: Write> ContainerWriter<W> {
    /// Starts a container on an arbitrary sink and writes its header.
    pub fn new(
        schema: impl Into<Arc<Schema>>,
        sink: W,
        config: WriterConfig,
    ) -> ContainerResult<Self> {
        config.validate()?;
        Self::start(schema.into(), sink, config, None)
    }

    fn start(
        schema: Arc<Schema>,
        mut sink: W,
        config: WriterConfig,
        path: Option<PathBuf>,
    ) -> ContainerResult<Self> {
        let header = Header::new(schema, &config);
        sink.write_all(&header.encode())
            .map_err(|e| ContainerError::io("failed to write container header", e))?;

        let schema_name = header.schema.full_name();
        let path_text = display_path(path.as_deref());
        log_event_with_fields(
            Event::ContainerCreate,
            &[
                ("path", path_text.as_str()),
                ("schema", schema_name.as_str()),
                ("checksum", config.checksum.as_str()),
            ],
        );

        Ok(Self {
            sink,
            header,
            config,
            path,
            block: Vec::new(),
            block_records: 0,
            records_written: 0,
            blocks_written: 0,
            failed_block: None,
            closed: false,
        })
    }

    /// The schema every appended record must match
    pub fn schema(&self) -> &Arc<Schema> {
        &self.header.schema
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Records accepted so far, including those in the pending block.
    ///
    /// Records of a block whose write failed are not counted.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Blocks written to the sink so far
    pub fn blocks_written(&self) -> u64 {
        self.blocks_written
    }

    /// Appends one record, flushing the pending block when it is full.
    ///
    /// # Errors
    ///
    /// - `SchemaMismatch` if the record's schema differs from the writer's
    /// - `Config` if the record alone exceeds the maximum block size
    /// - `Io` if a block flush fails
    /// - `Failed` if an earlier block write failed
    pub fn append(&mut self, record: &Record) -> ContainerResult<()> {
        self.check_usable()?;
        let schema = &self.header.schema;
        if !Arc::ptr_eq(record.schema(), schema) && **record.schema() != **schema {
            return Err(ContainerError::schema_mismatch(
                schema.full_name(),
                record.schema().full_name(),
            ));
        }

        let start = self.block.len();
        encode_record(&mut self.block, record);
        let encoded = self.block.len() - start;

        if self.block.len() > MAX_BLOCK_BYTES {
            self.block.truncate(start);
            if encoded > MAX_BLOCK_BYTES {
                return Err(ContainerError::config(format!(
                    "record encodes to {} bytes, above the {} byte block limit",
                    encoded, MAX_BLOCK_BYTES
                )));
            }
            self.flush()?;
            encode_record(&mut self.block, record);
        }

        self.block_records += 1;
        self.records_written += 1;

        if self.block_records >= self.config.block_records
            || self.block.len() >= self.config.block_bytes
        {
            self.flush()?;
        }
        Ok(())
    }

    /// Appends every record from an iterator, stopping at the first error.
    pub fn append_all<'a, I>(&mut self, records: I) -> ContainerResult<()>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            self.append(record)?;
        }
        Ok(())
    }

    /// Writes the pending block, if any, as one framed unit.
    ///
    /// The block is discarded even if the write fails so a later flush
    /// never repeats a partially written frame.
    pub fn flush(&mut self) -> ContainerResult<()> {
        self.check_usable()?;
        if self.block_records == 0 {
            return Ok(());
        }

        let data = std::mem::take(&mut self.block);
        let count = std::mem::take(&mut self.block_records);

        let trailer = self.header.checksum.trailer(&data);
        let mut frame = Vec::with_capacity(data.len() + trailer.len() + 36);
        write_long(&mut frame, count as i64);
        write_long(&mut frame, data.len() as i64);
        frame.extend_from_slice(&data);
        frame.extend_from_slice(&trailer);
        frame.extend_from_slice(&self.header.sync);

        let block_number = self.blocks_written + 1;
        if let Err(e) = self.sink.write_all(&frame) {
            self.failed_block = Some(block_number);
            self.records_written -= count;
            return Err(ContainerError::io(
                format!("failed to write block {}", block_number),
                e,
            ));
        }
        self.blocks_written = block_number;

        let block = self.blocks_written.to_string();
        let records = count.to_string();
        let bytes = data.len().to_string();
        log_event_with_fields(
            Event::ContainerBlockFlush,
            &[
                ("block", block.as_str()),
                ("records", records.as_str()),
                ("bytes", bytes.as_str()),
            ],
        );

        self.block = data;
        self.block.clear();
        Ok(())
    }

    fn check_usable(&self) -> ContainerResult<()> {
        match self.failed_block {
            Some(block) => Err(ContainerError::Failed { block }),
            None => Ok(()),
        }
    }

    /// Flushes the pending block and the sink, then releases the writer.
    pub fn close(mut self) -> ContainerResult<()> {
        self.closed = true;
        self.finish()
    }

    fn flush_sink(&mut self) -> ContainerResult<()> {
        self.sink
            .flush()
            .map_err(|e| ContainerError::io("failed to flush container", e))
    }

    fn finish(&mut self) -> ContainerResult<()> {
        let result = self.flush().and_then(|_| self.flush_sink());
        let path = display_path(self.path.as_deref());

        match &result {
            Ok(()) => {
                let records = self.records_written.to_string();
                let blocks = self.blocks_written.to_string();
                log_event_with_fields(
                    Event::ContainerClose,
                    &[
                        ("path", path.as_str()),
                        ("records", records.as_str()),
                        ("blocks", blocks.as_str()),
                    ],
                );
            }
            Err(e) => {
                let error = e.to_string();
                log_event_with_fields(
                    Event::ContainerCloseFailed,
                    &[("path", path.as_str()), ("code", e.code()), ("error", error.as_str())],
                );
            }
        }
        result
    }
}

impl<W: Write> Drop for ContainerWriter<W> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.finish();
        }
    }
}
