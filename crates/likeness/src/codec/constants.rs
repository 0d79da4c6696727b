//! Record tags and inline value codes.

pub const FORMAT_VERSION: u16 = 1;

// ── Record tags ──

pub const TAG_BOOLEAN: u8 = 0x01;
pub const TAG_NULL: u8 = 0x02;
pub const TAG_UNDEFINED: u8 = 0x03;
pub const TAG_NUMBER: u8 = 0x04;
pub const TAG_BIG_INTEGER: u8 = 0x05;
pub const TAG_STRING: u8 = 0x06;
pub const TAG_SYMBOL: u8 = 0x07;
pub const TAG_RECORD: u8 = 0x08;
pub const TAG_BYTES: u8 = 0x09;
pub const TAG_MAP: u8 = 0x0a;
pub const TAG_SET: u8 = 0x0b;
pub const TAG_DATE: u8 = 0x0c;
pub const TAG_PATTERN: u8 = 0x0d;
pub const TAG_FAULT: u8 = 0x0e;
pub const TAG_CALLABLE: u8 = 0x0f;
pub const TAG_DEFERRED: u8 = 0x10;
pub const TAG_BOXED: u8 = 0x11;
pub const TAG_SINGLETON: u8 = 0x12;
pub const TAG_PROPERTY: u8 = 0x13;
pub const TAG_ITEM: u8 = 0x14;
pub const TAG_ENTRY: u8 = 0x15;
pub const TAG_POINTER: u8 = 0x16;
pub const TAG_BOUNDARY: u8 = 0x17;

/// Tags `0x00..=0x1d` are reserved for the format.
pub const TAG_RESERVED_MAX: u8 = 0x1d;

pub fn is_complex_tag(tag: u8) -> bool {
    (TAG_RECORD..=TAG_SINGLETON).contains(&tag)
}

// ── Inline value codes ──

pub const CODE_ZERO: u8 = 0x01;
pub const CODE_NEGATIVE_ZERO: u8 = 0x02;
pub const CODE_NAN: u8 = 0x03;
pub const CODE_INFINITY: u8 = 0x04;
pub const CODE_NEGATIVE_INFINITY: u8 = 0x05;
pub const CODE_UNDEFINED: u8 = 0x06;
pub const CODE_NULL: u8 = 0x07;
pub const CODE_TRUE: u8 = 0x08;
pub const CODE_FALSE: u8 = 0x09;

/// `CODE_INT_BASE + width - 1` for a signed integer of `width` bytes (1 to 6).
pub const CODE_INT_BASE: u8 = 0x10;
pub const CODE_INT_MAX_WIDTH: usize = 6;

pub const CODE_DECIMAL: u8 = 0x18;
pub const CODE_FLOAT32: u8 = 0x1a;
pub const CODE_TEXT: u8 = 0x20;
pub const CODE_BYTES: u8 = 0x21;
pub const CODE_LIST: u8 = 0x22;
pub const CODE_RECORD_LIST: u8 = 0x23;

// ── Record flavours and boundary phases inside complex state ──

pub const FLAVOR_PLAIN: i64 = 0;
pub const FLAVOR_LIST: i64 = 1;
pub const FLAVOR_ARGUMENTS: i64 = 2;
