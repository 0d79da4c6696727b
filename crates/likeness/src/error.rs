//! Error types for the likeness crate.

use likeness_buffers::BufferError;
use thiserror::Error;

use crate::value::PointerId;

/// Errors surfaced by decoding and diffing.
///
/// Comparison ambiguity is not an error: it is the
/// [`Comparison::Ambiguous`](crate::Comparison::Ambiguous) result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A back-reference points at a record the current traversal has not
    /// visited yet. Decoding the same buffer in greedy mode resolves it.
    #[error("back-reference to pointer {pointer} cannot be resolved before its record is visited")]
    PointerLookup { pointer: PointerId },

    /// The buffer holds an unknown tag, a bad inline value or is truncated.
    #[error("malformed record at offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },

    /// The buffer was written by an incompatible format version.
    #[error("unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    /// A decoded node's children lie below the decode depth limit.
    #[error("children of a node at depth {depth} lie below the decode depth limit {max_depth}")]
    DepthLimit { depth: usize, max_depth: usize },

    /// A custom diff preparation returned an instruction the differ cannot act on.
    #[error("illegal diff instruction: {0}")]
    IllegalDiffInstruction(String),
}

impl Error {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            offset,
            reason: reason.into(),
        }
    }

    /// Returns `true` for failures a greedy decode of the same buffer avoids.
    pub fn is_pointer_lookup(&self) -> bool {
        matches!(self, Error::PointerLookup { .. })
    }
}

impl From<BufferError> for Error {
    fn from(err: BufferError) -> Self {
        let offset = match err {
            BufferError::EndOfBuffer { offset, .. } => offset,
            BufferError::VarintOverflow(offset) | BufferError::InvalidUtf8(offset) => offset,
        };
        Error::malformed(offset, err.to_string())
    }
}

/// Convenience alias for likeness results.
pub type Result<T> = std::result::Result<T, Error>;
