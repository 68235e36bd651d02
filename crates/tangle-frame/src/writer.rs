use bytes::{Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Cursor-based writer over a fixed-capacity byte buffer.
///
/// A write that does not fit fails with [`FrameError::BufferOverflow`] and
/// leaves both the cursor and the buffer contents untouched.
#[derive(Debug, Clone)]
pub struct BufferWriter {
    buf: BytesMut,
    cursor: usize,
}

impl BufferWriter {
    /// Create a zero-filled writer holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::zeroed(capacity),
            cursor: 0,
        }
    }

    /// Total capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of bytes written so far.
    pub fn written(&self) -> usize {
        self.cursor
    }

    /// Bytes still available before the buffer is full.
    pub fn available(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// Rewind the cursor to the start. Previously written bytes stay in place.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.put(&[value])
    }

    /// Alias of [`write_u8`](Self::write_u8) for message and literal tags.
    pub fn write_flag(&mut self, flag: u8) -> Result<()> {
        self.put(&[flag])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    /// Write exactly `bytes` with no length bound.
    pub fn write_slice(&mut self, bytes: &[u8]) -> Result<()> {
        self.put(bytes)
    }

    /// Write a fixed-length run: zero-padded when `bytes` is shorter than
    /// `len`, truncated when longer.
    pub fn write_bytes(&mut self, bytes: &[u8], len: usize) -> Result<()> {
        self.ensure(len)?;
        let used = bytes.len().min(len);
        let start = self.cursor;
        self.buf[start..start + used].copy_from_slice(&bytes[..used]);
        self.buf[start + used..start + len].fill(0);
        self.cursor += len;
        Ok(())
    }

    /// Fixed-length character run, same padding rules as [`write_bytes`](Self::write_bytes).
    pub fn write_string(&mut self, text: &str, len: usize) -> Result<()> {
        self.write_bytes(text.as_bytes(), len)
    }

    /// Reserve a `len`-byte run and copy at most `len` bytes of `bytes` into it.
    ///
    /// Unlike [`write_bytes`](Self::write_bytes) the tail of a short run is
    /// not cleared: whatever the buffer held there before stays.
    pub fn write_bytes_unpadded(&mut self, bytes: &[u8], len: usize) -> Result<()> {
        self.ensure(len)?;
        let used = bytes.len().min(len);
        let start = self.cursor;
        self.buf[start..start + used].copy_from_slice(&bytes[..used]);
        self.cursor += len;
        Ok(())
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.cursor]
    }

    /// Copy the written bytes out as an immutable buffer.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure(bytes.len())?;
        let start = self.cursor;
        self.buf[start..start + bytes.len()].copy_from_slice(bytes);
        self.cursor += bytes.len();
        Ok(())
    }

    fn ensure(&self, requested: usize) -> Result<()> {
        if requested > self.available() {
            return Err(FrameError::BufferOverflow {
                requested,
                available: self.available(),
            });
        }
        Ok(())
    }
}
