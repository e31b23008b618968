//! A growable byte buffer with independent write-append and read-cursor
//! semantics. Every encode writes through this type and every decode reads
//! through it; no other part of the crate touches raw storage directly.

use crate::error::{Error, ErrorKind, Result};

/// A byte sequence that grows as values are appended to it and maintains a
/// read position independent of its write length.
///
/// The read position never passes the write length; a read that would do so
/// fails with [`ErrorKind::MalformedValue`](crate::error::ErrorKind) rather
/// than observing uninitialized storage.
#[derive(Clone, Debug, Default)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    position: usize,
}

impl ByteBuffer {
    /// Creates an empty buffer for encoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with at least the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            position: 0,
        }
    }

    /// Creates a buffer over existing bytes with the read position at the
    /// start, for decoding.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            position: 0,
        }
    }

    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether any bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The current read position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the buffer, returning the written bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    fn ensure_available(&self, count: usize) -> Result<()> {
        if self.position + count > self.bytes.len() {
            return Err(Error::malformed_value(format!(
                "unexpected end of BSON data: needed {} bytes, {} remain",
                count,
                self.bytes.len() - self.position
            )));
        }
        Ok(())
    }

    /// Appends a single byte.
    pub fn put_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Appends raw bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Appends a 32-bit integer in little-endian byte order.
    pub fn put_int32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends an unsigned 32-bit integer in little-endian byte order.
    pub fn put_uint32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a 64-bit integer in little-endian byte order.
    pub fn put_int64(&mut self, value: i64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a 64-bit IEEE 754 floating point value in little-endian byte
    /// order.
    pub fn put_double(&mut self, value: f64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends the UTF-8 bytes of `value` followed by a null terminator.
    ///
    /// Fails with [`ErrorKind::EmbeddedNullByte`] if `value` itself contains
    /// a null byte, since the terminator would otherwise be ambiguous.
    pub fn put_cstring(&mut self, value: &str) -> Result<()> {
        if value.as_bytes().contains(&0) {
            return Err(ErrorKind::EmbeddedNullByte.into());
        }
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.push(0);
        Ok(())
    }

    /// Appends a length-prefixed string: a 32-bit byte count that includes
    /// the null terminator, the UTF-8 bytes, and the terminator.
    pub fn put_string(&mut self, value: &str) {
        self.put_int32(value.len() as i32 + 1);
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.push(0);
    }

    /// Patches a previously written 32-bit integer at `position`.
    ///
    /// Used to fill in the length placeholder reserved at the start of a
    /// document, array, or code-with-scope container once its span is known.
    pub fn replace_int32(&mut self, position: usize, value: i32) {
        self.bytes[position..position + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Reads a single byte, advancing the read position.
    pub fn get_byte(&mut self) -> Result<u8> {
        self.ensure_available(1)?;
        let byte = self.bytes[self.position];
        self.position += 1;
        Ok(byte)
    }

    /// Reads `count` raw bytes, advancing the read position.
    pub fn get_bytes(&mut self, count: usize) -> Result<&[u8]> {
        self.ensure_available(count)?;
        let slice = &self.bytes[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Reads a little-endian 32-bit integer, advancing the read position.
    pub fn get_int32(&mut self) -> Result<i32> {
        self.ensure_available(4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[self.position..self.position + 4]);
        self.position += 4;
        Ok(i32::from_le_bytes(raw))
    }

    /// Reads a little-endian unsigned 32-bit integer, advancing the read
    /// position.
    pub fn get_uint32(&mut self) -> Result<u32> {
        self.get_int32().map(|v| v as u32)
    }

    /// Reads a little-endian 64-bit integer, advancing the read position.
    pub fn get_int64(&mut self) -> Result<i64> {
        self.ensure_available(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.bytes[self.position..self.position + 8]);
        self.position += 8;
        Ok(i64::from_le_bytes(raw))
    }

    /// Reads a little-endian 64-bit floating point value, advancing the read
    /// position.
    pub fn get_double(&mut self) -> Result<f64> {
        self.get_int64().map(|bits| f64::from_le_bytes(bits.to_le_bytes()))
    }

    /// Reads bytes up to the next null terminator as a UTF-8 string,
    /// advancing the read position past the terminator.
    pub fn get_cstring(&mut self) -> Result<String> {
        let start = self.position;
        let terminator = self.bytes[start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::malformed_value("unterminated cstring"))?;
        let s = str_from_utf8(&self.bytes[start..start + terminator])?.to_string();
        self.position = start + terminator + 1;
        Ok(s)
    }

    /// Reads a length-prefixed string, advancing the read position.
    pub fn get_string(&mut self) -> Result<String> {
        let declared = self.get_int32()?;
        if declared < 1 {
            return Err(Error::malformed_value(format!(
                "string length must be at least 1, got {declared}"
            )));
        }
        let bytes = self.get_bytes(declared as usize)?;
        let (data, terminator) = bytes.split_at(bytes.len() - 1);
        if terminator != [0] {
            return Err(Error::malformed_value("string missing null terminator"));
        }
        Ok(str_from_utf8(data)?.to_string())
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes, position: 0 }
    }
}

fn str_from_utf8(bytes: &[u8]) -> Result<&str> {
    simdutf8::basic::from_utf8(bytes).map_err(|_| ErrorKind::Utf8Encoding.into())
}
