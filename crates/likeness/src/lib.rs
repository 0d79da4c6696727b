//! likeness - structural comparison, diffing and serialization of dynamically
//! shaped value graphs.
//!
//! A host value ([`Host`]) is classified once into a [`Tree`] of typed
//! values. Trees can then be compared ([`compare_trees`]), diffed ([`diff`]),
//! rendered ([`format`]) or written to a compact pointer-based binary form
//! ([`encode`] / [`decode`]). Decoded trees have the same shape as described
//! ones, so every consumer works on either.
//!
//! All traversal is iterative. Cycles and deep nesting never grow the call
//! stack.
//!
//! ```
//! use likeness::{compare_trees, describe, Host};
//! use serde_json::json;
//!
//! let a = describe(&Host::from(&json!({"a": [1, 2]})));
//! let b = describe(&Host::from(&json!({"a": [1, 2]})));
//! assert!(compare_trees(&a, &b).unwrap());
//! ```

pub mod codec;
pub mod compare;
pub mod cursor;
pub mod describe;
pub mod diff;
pub mod error;
pub mod format;
pub mod host;
pub mod value;

pub use codec::{decode, encode, DecodeMode, DecodeOptions, FORMAT_VERSION};
pub use compare::{
    compare, compare_children, compare_trees, compare_trees_verdict, compare_trees_with,
    CompareOptions, Verdict,
};
pub use cursor::{Cursor, Recorded, Source};
pub use describe::{describe, describe_with, Classifier, DescribeOptions};
pub use diff::{diff, diff_text, render_diff, DiffLine, DiffOptions, Instruction, LineTag};
pub use error::{Error, Result};
pub use format::{format, FormatOptions};
pub use host::{Host, HostObject, HostRef, HostSymbol, Internal, PropertyKey};
pub use value::{
    Child, Children, Comparison, Kind, Node, NodeId, Phase, PointerId, RecordFlavor, Symbol, Tree,
    Value, Variant,
};
