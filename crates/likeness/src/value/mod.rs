//! The value model: classified values, complex nodes and traversal meta nodes.
//!
//! A [`Tree`] owns an arena of complex [`Node`]s. Primitive values are held
//! inline; complex values are referenced by arena index ([`Value::Complex`])
//! or, after their first occurrence, by pointer id ([`Value::Pointer`]).

mod open;
mod tree;

pub use tree::{ChildSource, Children, Tree};

pub(crate) use open::OpenStack;
pub(crate) use tree::{Origin, Slot, State};

/// Arena index of a complex node inside one [`Tree`].
pub type NodeId = usize;

/// Per-pass, first-visit-order identity of a complex value.
pub type PointerId = u32;

/// The four-valued comparison algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Terminal failure.
    Unequal,
    /// Shape matches, but deciding needs context the node alone lacks.
    Ambiguous,
    /// Shape matches; children decide the verdict.
    ShallowEqual,
    /// Terminal success.
    DeepEqual,
}

/// A classified symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub description: Option<String>,
    /// Registry or well-known key, comparable across serialization.
    pub canonical: Option<String>,
    /// Host identity; `None` once the symbol went through the codec.
    pub identity: Option<usize>,
}

/// A classified value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Boolean(bool),
    Number(f64),
    BigInteger(i128),
    String(String),
    Symbol(Symbol),
    /// First occurrence of a complex value.
    Complex(NodeId),
    /// Back-reference to a complex value already visited in this tree.
    Pointer(PointerId),
}

impl Value {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Complex(_) | Value::Pointer(_))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }
}

/// Traversal phase announced by a [`Child::Boundary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    List,
    Iterable,
}

impl Phase {
    pub(crate) fn code(self) -> u8 {
        match self {
            Phase::List => 0,
            Phase::Iterable => 1,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Phase::List),
            1 => Some(Phase::Iterable),
            _ => None,
        }
    }
}

/// A meta node produced while traversing a complex value.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// Own property. Keys are always primitive (string or symbol).
    Property { key: Value, value: Value },
    /// Indexed list item or set member.
    Item { index: usize, value: Value },
    /// Map entry; key and value may each be complex.
    Entry { key: Value, value: Value },
    /// Start of a list or iterable phase with its element count.
    Boundary { phase: Phase, count: usize },
}

impl Child {
    pub fn is_symbol_property(&self) -> bool {
        matches!(self, Child::Property { key, .. } if key.is_symbol())
    }
}

/// Flavour of a generic keyed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFlavor {
    Plain,
    List,
    Arguments,
}

/// Variant-specific state of a complex node.
#[derive(Debug, Clone)]
pub enum Kind {
    Record(RecordFlavor),
    Bytes(Vec<u8>),
    Map { size: usize },
    Set { size: usize },
    /// Timestamp in milliseconds; `None` for an invalid date.
    Date(Option<f64>),
    /// Flags are sorted and deduplicated.
    Pattern { source: String, flags: String },
    Fault { name: String, message: String },
    Callable { name: String, identity: Option<usize> },
    Deferred { identity: Option<usize> },
    /// A wrapped primitive.
    Boxed(Value),
    Singleton,
}

/// The closed set of variants a complex value classifies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Record,
    List,
    Arguments,
    Bytes,
    Map,
    Set,
    Date,
    Pattern,
    Fault,
    Callable,
    Deferred,
    Boxed,
    Singleton,
}

/// A complex value.
#[derive(Debug, Clone)]
pub struct Node {
    pub pointer: PointerId,
    pub tag: String,
    pub class_name: Option<String>,
    pub kind: Kind,
    /// Index of the custom classifier that claimed this value.
    pub(crate) classifier: Option<usize>,
}

impl Node {
    pub fn variant(&self) -> Variant {
        match &self.kind {
            Kind::Record(RecordFlavor::Plain) => Variant::Record,
            Kind::Record(RecordFlavor::List) => Variant::List,
            Kind::Record(RecordFlavor::Arguments) => Variant::Arguments,
            Kind::Bytes(_) => Variant::Bytes,
            Kind::Map { .. } => Variant::Map,
            Kind::Set { .. } => Variant::Set,
            Kind::Date(_) => Variant::Date,
            Kind::Pattern { .. } => Variant::Pattern,
            Kind::Fault { .. } => Variant::Fault,
            Kind::Callable { .. } => Variant::Callable,
            Kind::Deferred { .. } => Variant::Deferred,
            Kind::Boxed(_) => Variant::Boxed,
            Kind::Singleton => Variant::Singleton,
        }
    }
}
