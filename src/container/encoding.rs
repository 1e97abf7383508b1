//! Binary value encoding
//!
//! | type    | encoding                                  |
//! |---------|-------------------------------------------|
//! | null    | nothing                                   |
//! | boolean | one byte, 0 or 1                          |
//! | int     | zig-zag varint, must fit in i32           |
//! | long    | zig-zag varint, at most 10 bytes          |
//! | float   | 4 bytes IEEE-754 LE                       |
//! | double  | 8 bytes IEEE-754 LE                       |
//! | bytes   | long length, then the bytes               |
//! | string  | long length, then UTF-8 bytes             |
//!
//! A record body is its values concatenated in schema field order. There
//! are no field tags: the schema is required to decode.

use std::io::{self, Read};
use std::sync::Arc;

use super::errors::{ContainerError, ContainerResult};
use crate::record::Record;
use crate::schema::{FieldType, Schema, Value};

/// Longest valid varint for a 64-bit value
pub const MAX_VARINT_BYTES: usize = 10;

const READ_CHUNK: usize = 64 * 1024;

/// Maps signed to unsigned so small magnitudes encode short:
/// 0 → 0, -1 → 1, 1 → 2, -2 → 3, ...
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Appends a zig-zag varint.
pub fn write_long(buf: &mut Vec<u8>, n: i64) {
    let mut value = zigzag_encode(n);
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

pub fn write_int(buf: &mut Vec<u8>, n: i32) {
    write_long(buf, i64::from(n));
}

pub fn write_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    write_long(buf, data.len() as i64);
    buf.extend_from_slice(data);
}

pub fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_bytes(buf, s.as_bytes());
}

/// Appends one value. The caller guarantees it matches the field type.
pub fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => {}
        Value::Boolean(b) => buf.push(u8::from(*b)),
        Value::Int(v) => write_int(buf, *v),
        Value::Long(v) => write_long(buf, *v),
        Value::Float(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::Double(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::Bytes(b) => write_bytes(buf, b),
        Value::String(s) => write_string(buf, s),
    }
}

/// Appends a record body.
pub fn encode_record(buf: &mut Vec<u8>, record: &Record) {
    for value in record.values() {
        write_value(buf, value);
    }
}

/// Reads one zig-zag varint from a byte stream.
///
/// # Returns
///
/// - `Ok(Some((value, bytes_read)))` on success
/// - `Ok(None)` if the stream is at EOF before the first byte
/// - `Err(UnexpectedEof)` if the stream ends mid-varint
/// - `Err(InvalidData)` if the varint does not fit in 64 bits
pub fn read_long_from<R: Read>(reader: &mut R) -> io::Result<Option<(i64, usize)>> {
    let mut value: u64 = 0;
    let mut byte = [0u8; 1];

    for i in 0..MAX_VARINT_BYTES {
        if let Err(e) = reader.read_exact(&mut byte) {
            if i == 0 && e.kind() == io::ErrorKind::UnexpectedEof {
                return Ok(None);
            }
            return Err(e);
        }

        let b = byte[0];
        // The 10th byte carries only bit 63
        if i == MAX_VARINT_BYTES - 1 && b > 0x01 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "varint overflows 64 bits",
            ));
        }

        value |= u64::from(b & 0x7F) << (7 * i);
        if b & 0x80 == 0 {
            return Ok(Some((zigzag_decode(value), i + 1)));
        }
    }

    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "varint longer than 10 bytes",
    ))
}

/// Fewest bytes a record of `schema` can encode to.
///
/// Zero only when every field is `null`.
pub fn min_record_len(schema: &Schema) -> usize {
    schema
        .fields()
        .iter()
        .map(|field| match field.field_type {
            FieldType::Null => 0,
            FieldType::Boolean
            | FieldType::Int
            | FieldType::Long
            | FieldType::Bytes
            | FieldType::String => 1,
            FieldType::Float => 4,
            FieldType::Double => 8,
        })
        .sum()
}

/// Cursor over an in-memory block of encoded records.
///
/// Offsets in errors are absolute file offsets: `base_offset` is the file
/// position of `data[0]`.
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    base_offset: u64,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8], base_offset: u64) -> Self {
        Self::at(data, 0, base_offset)
    }

    /// Resumes decoding at `pos`.
    pub fn at(data: &'a [u8], pos: usize, base_offset: u64) -> Self {
        Self {
            data,
            pos,
            base_offset,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Absolute file offset of the cursor
    pub fn offset(&self) -> u64 {
        self.base_offset + self.pos as u64
    }

    fn take(&mut self, n: usize, what: &str) -> ContainerResult<&'a [u8]> {
        let slice = self
            .pos
            .checked_add(n)
            .and_then(|end| self.data.get(self.pos..end))
            .ok_or_else(|| {
                ContainerError::corrupt(
                    self.offset(),
                    format!(
                        "truncated {}: need {} bytes, {} remaining",
                        what,
                        n,
                        self.remaining()
                    ),
                )
            })?;
        self.pos += n;
        Ok(slice)
    }

    pub fn read_long(&mut self) -> ContainerResult<i64> {
        let offset = self.offset();
        let mut rest = self.data.get(self.pos..).unwrap_or_default();
        match read_long_from(&mut rest) {
            Ok(Some((value, len))) => {
                self.pos += len;
                Ok(value)
            }
            Ok(None) => Err(ContainerError::corrupt(offset, "truncated varint")),
            Err(e) => Err(ContainerError::from_read(offset, "varint", e)),
        }
    }

    pub fn read_int(&mut self) -> ContainerResult<i32> {
        let offset = self.offset();
        let value = self.read_long()?;
        i32::try_from(value)
            .map_err(|_| ContainerError::corrupt(offset, format!("int value {} out of range", value)))
    }

    /// Reads a non-negative length prefix.
    pub fn read_len(&mut self) -> ContainerResult<usize> {
        let offset = self.offset();
        let len = self.read_long()?;
        usize::try_from(len)
            .map_err(|_| ContainerError::corrupt(offset, format!("invalid length {}", len)))
    }

    pub fn read_boolean(&mut self) -> ContainerResult<bool> {
        let offset = self.offset();
        match self.take(1, "boolean")? {
            [0] => Ok(false),
            [1] => Ok(true),
            other => Err(ContainerError::corrupt(
                offset,
                format!("invalid boolean byte {:#04x}", other.first().copied().unwrap_or_default()),
            )),
        }
    }

    pub fn read_float(&mut self) -> ContainerResult<f32> {
        let raw = self.take(4, "float")?;
        Ok(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn read_double(&mut self) -> ContainerResult<f64> {
        let raw = self.take(8, "double")?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(raw);
        Ok(f64::from_le_bytes(buf))
    }

    pub fn read_bytes(&mut self) -> ContainerResult<Vec<u8>> {
        let len = self.read_len()?;
        Ok(self.take(len, "bytes")?.to_vec())
    }

    pub fn read_string(&mut self) -> ContainerResult<String> {
        let offset = self.offset();
        let len = self.read_len()?;
        let raw = self.take(len, "string")?;
        String::from_utf8(raw.to_vec())
            .map_err(|e| ContainerError::corrupt(offset, format!("invalid UTF-8 in string: {}", e)))
    }

    /// Reads one value of the given type.
    pub fn read_value(&mut self, field_type: FieldType) -> ContainerResult<Value> {
        Ok(match field_type {
            FieldType::Null => Value::Null,
            FieldType::Boolean => Value::Boolean(self.read_boolean()?),
            FieldType::Int => Value::Int(self.read_int()?),
            FieldType::Long => Value::Long(self.read_long()?),
            FieldType::Float => Value::Float(self.read_float()?),
            FieldType::Double => Value::Double(self.read_double()?),
            FieldType::Bytes => Value::Bytes(self.read_bytes()?),
            FieldType::String => Value::String(self.read_string()?),
        })
    }

    /// Validates one value of the given type without materialising it.
    pub fn skip_value(&mut self, field_type: FieldType) -> ContainerResult<()> {
        match field_type {
            FieldType::Null => {}
            FieldType::Boolean => {
                self.read_boolean()?;
            }
            FieldType::Int => {
                self.read_int()?;
            }
            FieldType::Long => {
                self.read_long()?;
            }
            FieldType::Float => {
                self.take(4, "float")?;
            }
            FieldType::Double => {
                self.take(8, "double")?;
            }
            FieldType::Bytes => {
                let len = self.read_len()?;
                self.take(len, "bytes")?;
            }
            FieldType::String => {
                let offset = self.offset();
                let len = self.read_len()?;
                let raw = self.take(len, "string")?;
                std::str::from_utf8(raw).map_err(|e| {
                    ContainerError::corrupt(offset, format!("invalid UTF-8 in string: {}", e))
                })?;
            }
        }
        Ok(())
    }

    /// Validates one record body in schema field order.
    pub fn skip_record(&mut self, schema: &Schema) -> ContainerResult<()> {
        for field in schema.fields() {
            self.skip_value(field.field_type)?;
        }
        Ok(())
    }

    /// Reads one record body in schema field order.
    pub fn decode_record(&mut self, schema: &Arc<Schema>) -> ContainerResult<Record> {
        let values = schema
            .fields()
            .iter()
            .map(|field| self.read_value(field.field_type))
            .collect::<ContainerResult<Vec<_>>>()?;
        Ok(Record::from_parts(Arc::clone(schema), values))
    }
}

/// Offset-tracking reader for the streamed parts of a container (header
/// and block framing).
pub struct StreamDecoder<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> StreamDecoder<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Number of bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads a varint, `None` on clean EOF before its first byte.
    pub fn read_long_or_eof(&mut self, what: &str) -> ContainerResult<Option<i64>> {
        let offset = self.offset;
        match read_long_from(&mut self.inner) {
            Ok(Some((value, len))) => {
                self.offset += len as u64;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(ContainerError::from_read(offset, what, e)),
        }
    }

    pub fn read_long(&mut self, what: &str) -> ContainerResult<i64> {
        let offset = self.offset;
        self.read_long_or_eof(what)?
            .ok_or_else(|| ContainerError::corrupt(offset, format!("truncated {}", what)))
    }

    /// Reads a length in `0..=max`.
    pub fn read_len(&mut self, what: &str, max: usize) -> ContainerResult<usize> {
        let offset = self.offset;
        let len = self.read_long(what)?;
        match usize::try_from(len) {
            Ok(len) if len <= max => Ok(len),
            _ => Err(ContainerError::corrupt(
                offset,
                format!("invalid {} length {} (max {})", what, len, max),
            )),
        }
    }

    /// Reads exactly `len` bytes. The buffer grows as data arrives, so a
    /// corrupt length cannot force a large up-front allocation.
    pub fn read_vec(&mut self, len: usize, what: &str) -> ContainerResult<Vec<u8>> {
        let offset = self.offset;
        let mut buf = Vec::with_capacity(len.min(READ_CHUNK));
        let read = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(|e| ContainerError::from_read(offset, what, e))?;
        self.offset += read as u64;
        if read < len {
            return Err(ContainerError::corrupt(
                offset,
                format!("truncated {}: need {} bytes, got {}", what, len, read),
            ));
        }
        Ok(buf)
    }

    pub fn read_into(&mut self, buf: &mut [u8], what: &str) -> ContainerResult<()> {
        self.inner
            .read_exact(buf)
            .map_err(|e| ContainerError::from_read(self.offset, what, e))?;
        self.offset += buf.len() as u64;
        Ok(())
    }
}
