//! BMS byte stream cursor
//!
//! BMS control flow (track start, subroutine call/return) jumps around the
//! file by absolute offset, so the input is held fully in memory and read
//! through an explicit cursor instead of an OS file position.

use crate::error::{Error, Result};

/// Cursor over raw BMS data
pub struct BmsStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BmsStream<'a> {
    /// Create a new stream over raw BMS data
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Get current position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Seek to an absolute position
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        if self.pos >= self.data.len() {
            return Err(Error::UnexpectedEof(self.pos));
        }
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    /// Read a 16-bit big-endian value
    pub fn read_u16(&mut self) -> Result<u16> {
        let hi = self.read_u8()? as u16;
        let lo = self.read_u8()? as u16;
        Ok((hi << 8) | lo)
    }

    /// Read a 24-bit big-endian value
    pub fn read_u24(&mut self) -> Result<u32> {
        let hi = self.read_u8()? as u32;
        let mid = self.read_u8()? as u32;
        let lo = self.read_u8()? as u32;
        Ok((hi << 16) | (mid << 8) | lo)
    }

    /// Read a 32-bit big-endian value
    pub fn read_u32(&mut self) -> Result<u32> {
        let hi = self.read_u16()? as u32;
        let lo = self.read_u16()? as u32;
        Ok((hi << 16) | lo)
    }

    /// Skip over a fixed-length payload
    pub fn skip(&mut self, len: usize) -> Result<()> {
        if self.pos + len > self.data.len() {
            return Err(Error::UnexpectedEof(self.data.len()));
        }
        self.pos += len;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_reads() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22];
        let mut stream = BmsStream::new(&data);
        assert_eq!(stream.read_u8().unwrap(), 0x12);
        assert_eq!(stream.read_u16().unwrap(), 0x3456);
        assert_eq!(stream.read_u24().unwrap(), 0x789ABC);
        assert_eq!(stream.read_u32().unwrap(), 0xDEF01122);
    }

    #[test]
    fn test_seek_and_skip() {
        let data = [0, 1, 2, 3, 4, 5];
        let mut stream = BmsStream::new(&data);
        stream.skip(3).unwrap();
        assert_eq!(stream.position(), 3);
        assert_eq!(stream.read_u8().unwrap(), 3);
        stream.seek(1);
        assert_eq!(stream.read_u8().unwrap(), 1);
    }

    #[test]
    fn test_eof_errors() {
        let data = [0xAB];
        let mut stream = BmsStream::new(&data);
        assert!(matches!(stream.read_u16(), Err(Error::UnexpectedEof(_))));
        stream.seek(0);
        assert!(matches!(stream.skip(2), Err(Error::UnexpectedEof(_))));
        stream.read_u8().unwrap();
        assert!(matches!(stream.read_u8(), Err(Error::UnexpectedEof(1))));
    }
}
