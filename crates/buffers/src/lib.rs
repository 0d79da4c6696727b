//! likeness-buffers - binary reader/writer primitives for the likeness record format.
//!
//! All multi-byte integers are little-endian. Lengths and counts use an
//! unsigned LEB128 varint.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// Errors raised while reading from a [`Reader`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A read needed more bytes than the buffer holds.
    #[error("unexpected end of buffer at offset {offset} (needed {needed} bytes)")]
    EndOfBuffer { offset: usize, needed: usize },
    /// A varint ran past 64 bits.
    #[error("varint overflow at offset {0}")]
    VarintOverflow(usize),
    /// A text slice was not valid UTF-8.
    #[error("invalid utf-8 at offset {0}")]
    InvalidUtf8(usize),
}
