//! Pointer-based binary codec for value trees.
//!
//! Layout: a little-endian `u16` format version, then records. Each record is
//! `[tag u8][varint child count][count × u32 LE absolute child offset][inline
//! state]`. Records are emitted breadth-first and child offsets are
//! back-patched once a child's record starts. A complex value is written in
//! full once; every other occurrence is a back-reference record holding its
//! pointer id.

mod constants;
mod decoder;
mod encoder;
mod inline;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::Tree;

pub use constants::FORMAT_VERSION;
pub(crate) use decoder::Decoder;
pub use encoder::encode;

/// How back-references are resolved while decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Records materialize as the traversal reaches them. A back-reference
    /// to a record not reached yet fails with
    /// [`Error::PointerLookup`](crate::Error::PointerLookup).
    #[default]
    Lazy,
    /// Every record address is registered up front, so back-references
    /// always resolve.
    Greedy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub mode: DecodeMode,
    /// Children of nodes nested this deep are not materialized; pulling
    /// them fails with [`Error::DepthLimit`](crate::Error::DepthLimit).
    pub max_depth: Option<usize>,
}

/// Decodes a buffer produced by [`encode`].
pub fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<Tree> {
    decoder::decode_tree(bytes, options)
}
