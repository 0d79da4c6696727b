//! Binary buffer writer with auto-growing capacity and slot back-patching.

/// A binary writer that grows automatically as needed.
///
/// # Example
///
/// ```
/// use likeness_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01);
/// let slot = writer.reserve_u32();
/// writer.patch_u32(slot, 0x0403_0201);
/// assert_eq!(writer.flush(), [0x01, 0x01, 0x02, 0x03, 0x04]);
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Current cursor position.
    pub x: usize,
    /// Allocation size when buffer needs to grow.
    alloc_size: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with the default allocation size (4KB).
    pub fn new() -> Self {
        Self::with_alloc_size(4 * 1024)
    }

    /// Creates a new writer with a custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self {
            uint8: vec![0u8; alloc_size],
            x: 0,
            alloc_size,
        }
    }

    /// Ensures at least `capacity` bytes are available past the cursor.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let remaining = self.uint8.len() - self.x;
        if remaining < capacity {
            let required = self.x + capacity;
            let new_size = (required * 2).max(self.alloc_size);
            self.uint8.resize(new_size, 0);
        }
    }

    /// Current write offset.
    pub fn position(&self) -> usize {
        self.x
    }

    /// Returns the written bytes and resets the writer.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[..self.x].to_vec();
        self.x = 0;
        result
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.ensure_capacity(1);
        self.uint8[self.x] = val;
        self.x += 1;
    }

    /// Writes an unsigned 16-bit little-endian integer.
    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.buf(&val.to_le_bytes());
    }

    /// Writes an unsigned 32-bit little-endian integer.
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.buf(&val.to_le_bytes());
    }

    /// Writes a 32-bit little-endian float.
    #[inline]
    pub fn f32(&mut self, val: f32) {
        self.u32(val.to_bits());
    }

    /// Writes the low `width` bytes of a two's complement integer.
    pub fn int(&mut self, val: i64, width: usize) {
        debug_assert!((1..=8).contains(&width));
        let bytes = val.to_le_bytes();
        self.buf(&bytes[..width]);
    }

    /// Writes an unsigned LEB128 varint.
    pub fn vu(&mut self, mut val: u64) {
        loop {
            let b = (val & 0x7f) as u8;
            val >>= 7;
            if val == 0 {
                self.u8(b);
                return;
            }
            self.u8(b | 0x80);
        }
    }

    /// Writes a raw byte slice.
    pub fn buf(&mut self, buf: &[u8]) {
        let length = buf.len();
        self.ensure_capacity(length);
        self.uint8[self.x..self.x + length].copy_from_slice(buf);
        self.x += length;
    }

    /// Writes a UTF-8 string's bytes (no length prefix).
    pub fn utf8(&mut self, s: &str) {
        self.buf(s.as_bytes());
    }

    /// Reserves a zeroed 32-bit slot and returns its offset.
    pub fn reserve_u32(&mut self) -> usize {
        let at = self.x;
        self.u32(0);
        at
    }

    /// Overwrites a previously written 32-bit slot.
    pub fn patch_u32(&mut self, at: usize, val: u32) {
        debug_assert!(at + 4 <= self.x);
        self.uint8[at..at + 4].copy_from_slice(&val.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reader;

    #[test]
    fn grows_past_initial_allocation() {
        let mut writer = Writer::with_alloc_size(2);
        for i in 0..10u8 {
            writer.u8(i);
        }
        assert_eq!(writer.flush(), (0..10u8).collect::<Vec<_>>());
    }

    #[test]
    fn varints_read_back() {
        let mut writer = Writer::new();
        for v in [0u64, 1, 127, 128, 300, 624_485, u32::MAX as u64, u64::MAX] {
            writer.vu(v);
        }
        let bytes = writer.flush();
        let mut reader = Reader::new(&bytes);
        for v in [0u64, 1, 127, 128, 300, 624_485, u32::MAX as u64, u64::MAX] {
            assert_eq!(reader.vu().unwrap(), v);
        }
    }

    #[test]
    fn narrow_integers_read_back() {
        let mut writer = Writer::new();
        writer.int(-129, 2);
        writer.int(1 << 40, 6);
        let bytes = writer.flush();
        assert_eq!(bytes.len(), 8);
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.int(2).unwrap(), -129);
        assert_eq!(reader.int(6).unwrap(), 1 << 40);
    }

    #[test]
    fn patches_reserved_slots() {
        let mut writer = Writer::new();
        let a = writer.reserve_u32();
        writer.u8(0xaa);
        let b = writer.reserve_u32();
        writer.patch_u32(b, 7);
        writer.patch_u32(a, 5);
        let bytes = writer.flush();
        assert_eq!(bytes, [5, 0, 0, 0, 0xaa, 7, 0, 0, 0]);
    }
}
