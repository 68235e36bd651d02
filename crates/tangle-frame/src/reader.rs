use crate::error::{FrameError, Result};

/// Cursor-based reader over a borrowed byte buffer.
///
/// `peek_*` reads without moving the cursor, `read_*` reads then advances.
/// Reads past the end fail with [`FrameError::OutOfRange`].
#[derive(Debug, Clone)]
pub struct BufferReader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> BufferReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Unread bytes remaining.
    pub fn available(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Current cursor offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    pub fn peek_u8(&self) -> Result<u8> {
        Ok(u8::from_le_bytes(self.peek_array()?))
    }

    pub fn peek_u16(&self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.peek_array()?))
    }

    pub fn peek_u32(&self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.peek_array()?))
    }

    pub fn peek_i8(&self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.peek_array()?))
    }

    pub fn peek_i16(&self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.peek_array()?))
    }

    pub fn peek_i32(&self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.peek_array()?))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(u8::from_le_bytes(self.read_array()?))
    }

    pub fn read_flag(&mut self) -> Result<u8> {
        self.read_u8()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Read a raw run of `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let start = self.cursor;
        self.cursor += len;
        Ok(&self.data[start..start + len])
    }

    /// Read a fixed-length string, cut at the first NUL byte.
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        let raw = self.read_bytes(len)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Everything not read yet, without advancing.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.cursor..]
    }

    /// Advance the cursor, clamped to the end of the buffer.
    pub fn forward(&mut self, len: usize) {
        self.cursor = self.cursor.saturating_add(len).min(self.data.len());
    }

    /// Rewind the cursor, clamped to the start of the buffer.
    pub fn back(&mut self, len: usize) {
        self.cursor = self.cursor.saturating_sub(len);
    }

    fn peek_array<const N: usize>(&self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.cursor..self.cursor + N]);
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let out = self.peek_array::<N>()?;
        self.cursor += N;
        Ok(out)
    }

    fn ensure(&self, requested: usize) -> Result<()> {
        if requested > self.available() {
            return Err(FrameError::OutOfRange {
                requested,
                available: self.available(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::BufferWriter;

    #[test]
    fn integer_roundtrip_edges() {
        let mut w = BufferWriter::new(64);
        for v in [0u8, 1, 0x7F, 0xFF] {
            w.write_u8(v).unwrap();
        }
        for v in [i16::MIN, -1, 0, i16::MAX] {
            w.write_i16(v).unwrap();
        }
        for v in [i32::MIN, -123_456, 0, i32::MAX] {
            w.write_i32(v).unwrap();
        }
        w.write_u32(u32::MAX).unwrap();
        w.write_i8(-128).unwrap();

        let mut r = BufferReader::new(w.as_bytes());
        for v in [0u8, 1, 0x7F, 0xFF] {
            assert_eq!(r.read_u8().unwrap(), v);
        }
        for v in [i16::MIN, -1, 0, i16::MAX] {
            assert_eq!(r.read_i16().unwrap(), v);
        }
        for v in [i32::MIN, -123_456, 0, i32::MAX] {
            assert_eq!(r.read_i32().unwrap(), v);
        }
        assert_eq!(r.read_u32().unwrap(), u32::MAX);
        assert_eq!(r.read_i8().unwrap(), -128);
        assert!(r.is_empty());
    }

    #[test]
    fn peek_does_not_advance() {
        let data = [0x34, 0x12, 0xFF];
        let mut r = BufferReader::new(&data);
        assert_eq!(r.peek_u16().unwrap(), 0x1234);
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.peek_i8().unwrap(), -1);
        assert_eq!(r.available(), 1);
    }

    #[test]
    fn out_of_range_is_reported() {
        let data = [1, 2, 3];
        let mut r = BufferReader::new(&data);
        r.read_u8().unwrap();
        assert_eq!(
            r.read_u32().unwrap_err(),
            FrameError::OutOfRange {
                requested: 4,
                available: 2
            }
        );
        assert_eq!(r.position(), 1);
        assert!(r.read_bytes(3).is_err());
    }

    #[test]
    fn forward_and_back_are_clamped() {
        let data = [0u8; 4];
        let mut r = BufferReader::new(&data);
        r.forward(10);
        assert_eq!(r.available(), 0);
        r.back(2);
        assert_eq!(r.position(), 2);
        r.back(100);
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn read_string_stops_at_nul() {
        let data = *b"evt1\0xyz";
        let mut r = BufferReader::new(&data);
        assert_eq!(r.read_string(5).unwrap(), "evt1");
        assert_eq!(r.rest(), b"xyz");
    }
}
