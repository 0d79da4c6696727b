//! Bounds-checked binary reader with cursor tracking.

use std::str;

use crate::BufferError;

/// A binary reader over a byte slice.
///
/// Every read is bounds-checked and returns [`BufferError`] instead of
/// panicking, since decoded buffers are untrusted input.
///
/// # Example
///
/// ```
/// use likeness_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8().unwrap(), 0x01);
/// assert_eq!(reader.u16().unwrap(), 0x0302);
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader at offset zero.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Creates a reader positioned at `x`.
    pub fn at(uint8: &'a [u8], x: usize) -> Self {
        Self { uint8, x }
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.uint8.len()
    }

    /// Returns `true` when the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.uint8.is_empty()
    }

    /// Number of bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.uint8.len().saturating_sub(self.x)
    }

    /// Moves the cursor to an absolute offset.
    pub fn seek(&mut self, x: usize) {
        self.x = x;
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        if self.x.checked_add(n).map_or(true, |end| end > self.uint8.len()) {
            Err(BufferError::EndOfBuffer {
                offset: self.x,
                needed: n,
            })
        } else {
            Ok(())
        }
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.uint8[self.x])
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads an unsigned 16-bit little-endian integer.
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.check(2)?;
        let val = u16::from_le_bytes([self.uint8[self.x], self.uint8[self.x + 1]]);
        self.x += 2;
        Ok(val)
    }

    /// Reads an unsigned 32-bit little-endian integer.
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.check(4)?;
        let x = self.x;
        let val = u32::from_le_bytes([
            self.uint8[x],
            self.uint8[x + 1],
            self.uint8[x + 2],
            self.uint8[x + 3],
        ]);
        self.x += 4;
        Ok(val)
    }

    /// Reads a 32-bit little-endian float.
    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        self.u32().map(f32::from_bits)
    }

    /// Reads a little-endian two's complement integer of `width` bytes
    /// (1 to 8) and sign-extends it.
    pub fn int(&mut self, width: usize) -> Result<i64, BufferError> {
        debug_assert!((1..=8).contains(&width));
        self.check(width)?;
        let mut raw = [0u8; 8];
        raw[..width].copy_from_slice(&self.uint8[self.x..self.x + width]);
        self.x += width;
        let shift = 64 - (width as u32) * 8;
        Ok((i64::from_le_bytes(raw) << shift) >> shift)
    }

    /// Reads an unsigned LEB128 varint.
    pub fn vu(&mut self) -> Result<u64, BufferError> {
        let start = self.x;
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let b = self.u8()?;
            if shift >= 64 || (shift == 63 && b > 1) {
                return Err(BufferError::VarintOverflow(start));
            }
            result |= ((b & 0x7f) as u64) << shift;
            if b & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    /// Returns the next `size` bytes and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let bin = &self.uint8[self.x..self.x + size];
        self.x += size;
        Ok(bin)
    }

    /// Reads `size` bytes as UTF-8 text.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        let start = self.x;
        let bin = self.buf(size)?;
        str::from_utf8(bin).map_err(|_| BufferError::InvalidUtf8(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_integers() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8().unwrap(), 0x01);
        assert_eq!(reader.u16().unwrap(), 0x0302);
        assert_eq!(reader.u32().unwrap(), 0x07060504);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn reports_end_of_buffer() {
        let data = [0x01];
        let mut reader = Reader::new(&data);
        assert_eq!(
            reader.u16(),
            Err(BufferError::EndOfBuffer {
                offset: 0,
                needed: 2
            })
        );
    }

    #[test]
    fn sign_extends_narrow_integers() {
        let data = [0xff, 0xfe, 0xff, 0x7f];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.int(1).unwrap(), -1);
        assert_eq!(reader.int(2).unwrap(), -2);
        assert_eq!(reader.int(1).unwrap(), 127);
    }

    #[test]
    fn reads_varints() {
        let data = [0x00, 0x7f, 0x80, 0x01, 0xe5, 0x8e, 0x26];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.vu().unwrap(), 0);
        assert_eq!(reader.vu().unwrap(), 127);
        assert_eq!(reader.vu().unwrap(), 128);
        assert_eq!(reader.vu().unwrap(), 624_485);
    }

    #[test]
    fn rejects_overlong_varints() {
        let data = [0xff; 11];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.vu(), Err(BufferError::VarintOverflow(0)));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let data = [0xc3, 0x28];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.utf8(2), Err(BufferError::InvalidUtf8(0)));
    }
}
