//! Record decoder with lazy child materialization.
//!
//! A record becomes a node the first time something reaches it, either by
//! pulling its parent's children or by resolving a back-reference. Greedy
//! mode adds one up-front pass that maps every pointer id to its record
//! address, so back-references resolve even before the traversal has
//! reached their target.
//!
//! With a depth limit, children of nodes at or below the limit are never
//! materialized. Back-references still resolve in greedy mode, whatever the
//! depth of their target.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use likeness_buffers::Reader;
use tracing::{debug, trace};

use super::constants::*;
use super::inline::{read_inline, Inline};
use super::{DecodeMode, DecodeOptions};
use crate::error::{Error, Result};
use crate::value::{
    Child, Kind, Node, NodeId, Origin, Phase, PointerId, RecordFlavor, Slot, State, Symbol, Tree,
    Value,
};

/// Offset of the first record, right after the version header.
const ROOT_OFFSET: usize = 2;

struct Record {
    tag: u8,
    children: Vec<usize>,
    state: Inline,
}

pub(crate) struct Decoder {
    bytes: Rc<[u8]>,
    /// Record address to materialized node.
    nodes: HashMap<usize, NodeId>,
    /// Pointer id to materialized node.
    pointers: HashMap<PointerId, NodeId>,
    /// Pointer id to record address, filled by the greedy pass only.
    addresses: HashMap<PointerId, usize>,
    /// Complex nesting depth per record address, filled by the greedy pass.
    record_depths: HashMap<usize, usize>,
    /// Child record offsets per node and how many have been produced.
    pending: Vec<(Vec<usize>, usize)>,
    /// Nesting depth per node.
    depths: Vec<usize>,
    max_depth: Option<usize>,
}

pub fn decode_tree(bytes: &[u8], options: &DecodeOptions) -> Result<Tree> {
    let mode = options.mode;
    let mut reader = Reader::new(bytes);
    let found = reader.u16()?;
    if found != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion {
            found,
            expected: FORMAT_VERSION,
        });
    }
    let mut decoder = Decoder {
        bytes: bytes.into(),
        nodes: HashMap::new(),
        pointers: HashMap::new(),
        addresses: HashMap::new(),
        record_depths: HashMap::new(),
        pending: Vec::new(),
        depths: Vec::new(),
        max_depth: options.max_depth,
    };
    if mode == DecodeMode::Greedy {
        decoder.register_all()?;
    }
    let mut slots = Vec::new();
    let root = decoder.read_value(&mut slots, ROOT_OFFSET, 0)?;
    debug!(bytes = bytes.len(), ?mode, max_depth = ?options.max_depth, "decoded tree root");
    let state = State {
        slots,
        origin: Origin::Decoded(decoder),
    };
    Ok(Tree::from_parts(root, state, Rc::from(Vec::new())))
}

impl Decoder {
    /// Produces the next child of `node`.
    pub(crate) fn produce(&mut self, slots: &mut Vec<Slot>, node: NodeId) -> Result<Option<Child>> {
        let depth = self.depths.get(node).copied().unwrap_or_default();
        let Some((offsets, next)) = self.pending.get_mut(node) else {
            return Ok(None);
        };
        let Some(&at) = offsets.get(*next) else {
            return Ok(None);
        };
        if let Some(max_depth) = self.max_depth.filter(|max| depth >= *max) {
            return Err(Error::DepthLimit { depth, max_depth });
        }
        *next += 1;
        self.read_meta(slots, at, depth + 1).map(Some)
    }

    /// Resolves a back-reference to its node.
    pub(crate) fn lookup(&mut self, slots: &mut Vec<Slot>, pointer: PointerId) -> Result<NodeId> {
        if let Some(&id) = self.pointers.get(&pointer) {
            return Ok(id);
        }
        let Some(&at) = self.addresses.get(&pointer) else {
            return Err(Error::PointerLookup { pointer });
        };
        let depth = self.record_depths.get(&at).copied().unwrap_or_default();
        match self.read_value(slots, at, depth)? {
            Value::Complex(id) => Ok(id),
            _ => Err(Error::malformed(at, "back-reference target is not a complex record")),
        }
    }

    /// Pre-order pass over every record reachable from the root.
    fn register_all(&mut self) -> Result<()> {
        let mut visited = HashSet::new();
        // Each entry carries the depth a complex value at that address has.
        let mut stack = vec![(ROOT_OFFSET, 0)];
        while let Some((at, depth)) = stack.pop() {
            if !visited.insert(at) {
                continue;
            }
            let record = self.record(at)?;
            let child_depth = if is_complex_tag(record.tag) {
                let pointer = complex_pointer(&record.state, at)?;
                self.addresses.entry(pointer).or_insert(at);
                self.record_depths.insert(at, depth);
                trace!(pointer, address = at, depth, "registered record address");
                depth + 1
            } else {
                depth
            };
            stack.extend(
                record
                    .children
                    .iter()
                    .rev()
                    .filter(|c| !visited.contains(*c))
                    .map(|&c| (c, child_depth)),
            );
        }
        debug!(records = visited.len(), "registered greedy addresses");
        Ok(())
    }

    fn record(&self, at: usize) -> Result<Record> {
        if at < ROOT_OFFSET || at >= self.bytes.len() {
            return Err(Error::malformed(at, "record offset outside buffer"));
        }
        let mut reader = Reader::at(&self.bytes, at);
        let tag = reader.u8()?;
        if tag == 0 || tag > TAG_BOUNDARY {
            let reason = if tag <= TAG_RESERVED_MAX {
                format!("reserved record tag 0x{tag:02x}")
            } else {
                format!("unknown record tag 0x{tag:02x}")
            };
            return Err(Error::malformed(at, reason));
        }
        let count = reader.vu()?;
        if count > (reader.remaining() / 4) as u64 {
            return Err(Error::malformed(at, format!("child count {count} exceeds buffer")));
        }
        let mut children = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let offset = reader.u32()? as usize;
            if offset < ROOT_OFFSET || offset >= self.bytes.len() {
                return Err(Error::malformed(at, format!("child offset {offset} outside buffer")));
            }
            children.push(offset);
        }
        let state = read_inline(&mut reader)?;
        Ok(Record {
            tag,
            children,
            state,
        })
    }

    fn read_value(&mut self, slots: &mut Vec<Slot>, at: usize, depth: usize) -> Result<Value> {
        if let Some(&id) = self.nodes.get(&at) {
            return Ok(Value::Complex(id));
        }
        let record = self.record(at)?;
        match record.tag {
            TAG_POINTER => {
                expect_children(&record, 0, at)?;
                Ok(Value::Pointer(pointer_id(&record.state, at)?))
            }
            tag if is_complex_tag(tag) => self.materialize(slots, at, record, depth),
            TAG_PROPERTY | TAG_ITEM | TAG_ENTRY | TAG_BOUNDARY => {
                Err(Error::malformed(at, "meta record where a value was expected"))
            }
            tag => {
                expect_children(&record, 0, at)?;
                primitive_value(tag, &record.state, at)
            }
        }
    }

    fn materialize(
        &mut self,
        slots: &mut Vec<Slot>,
        at: usize,
        record: Record,
        depth: usize,
    ) -> Result<Value> {
        let node = complex_node(record.tag, &record.state, at)?;
        let id = slots.len();
        trace!(pointer = node.pointer, address = at, node = id, "materialized record");
        self.pointers.entry(node.pointer).or_insert(id);
        self.nodes.insert(at, id);
        self.pending.push((record.children, 0));
        self.depths.push(depth);
        slots.push(Slot::new(node));
        Ok(Value::Complex(id))
    }

    /// Reads a meta record whose values sit at `depth`.
    fn read_meta(&mut self, slots: &mut Vec<Slot>, at: usize, depth: usize) -> Result<Child> {
        let record = self.record(at)?;
        match record.tag {
            TAG_PROPERTY => {
                expect_children(&record, 2, at)?;
                let key = self.read_value(slots, record.children[0], depth)?;
                if !matches!(key, Value::String(_) | Value::Symbol(_)) {
                    return Err(Error::malformed(at, "property key must be a string or symbol"));
                }
                let value = self.read_value(slots, record.children[1], depth)?;
                Ok(Child::Property { key, value })
            }
            TAG_ITEM => {
                expect_children(&record, 1, at)?;
                let index = count(&record.state, at)?;
                let value = self.read_value(slots, record.children[0], depth)?;
                Ok(Child::Item { index, value })
            }
            TAG_ENTRY => {
                expect_children(&record, 2, at)?;
                let key = self.read_value(slots, record.children[0], depth)?;
                let value = self.read_value(slots, record.children[1], depth)?;
                Ok(Child::Entry { key, value })
            }
            TAG_BOUNDARY => {
                expect_children(&record, 0, at)?;
                let Inline::List(items) = &record.state else {
                    return Err(Error::malformed(at, "boundary state must be a list"));
                };
                let [phase, n] = items.as_slice() else {
                    return Err(Error::malformed(at, "boundary state must hold two fields"));
                };
                let phase = u8::try_from(count(phase, at)?)
                    .ok()
                    .and_then(Phase::from_code)
                    .ok_or_else(|| Error::malformed(at, "unknown boundary phase"))?;
                Ok(Child::Boundary {
                    phase,
                    count: count(n, at)?,
                })
            }
            _ => Err(Error::malformed(at, "value record where a meta record was expected")),
        }
    }
}

// ── State parsing ──

fn expect_children(record: &Record, n: usize, at: usize) -> Result<()> {
    if record.children.len() == n {
        Ok(())
    } else {
        Err(Error::malformed(
            at,
            format!("expected {n} children, found {}", record.children.len()),
        ))
    }
}

fn count(value: &Inline, at: usize) -> Result<usize> {
    match value {
        Inline::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64 => {
            Ok(*n as usize)
        }
        _ => Err(Error::malformed(at, "expected a non-negative integer")),
    }
}

fn pointer_id(value: &Inline, at: usize) -> Result<PointerId> {
    count(value, at).map(|n| n as PointerId)
}

fn text(value: &Inline, at: usize) -> Result<String> {
    match value {
        Inline::Text(s) => Ok(s.clone()),
        _ => Err(Error::malformed(at, "expected text")),
    }
}

fn optional_text(value: &Inline, at: usize) -> Result<Option<String>> {
    match value {
        Inline::Undefined => Ok(None),
        other => text(other, at).map(Some),
    }
}

fn complex_pointer(state: &Inline, at: usize) -> Result<PointerId> {
    match state {
        Inline::List(items) if !items.is_empty() => pointer_id(&items[0], at),
        _ => Err(Error::malformed(at, "complex state must be a list")),
    }
}

fn primitive_value(tag: u8, state: &Inline, at: usize) -> Result<Value> {
    let mismatch = || Error::malformed(at, format!("state does not match record tag 0x{tag:02x}"));
    Ok(match (tag, state) {
        (TAG_BOOLEAN, Inline::Bool(b)) => Value::Boolean(*b),
        (TAG_NULL, Inline::Null) => Value::Null,
        (TAG_UNDEFINED, Inline::Undefined) => Value::Undefined,
        (TAG_NUMBER, Inline::Number(n)) => Value::Number(*n),
        (TAG_BIG_INTEGER, Inline::Text(s)) => Value::BigInteger(s.parse().map_err(|_| mismatch())?),
        (TAG_STRING, Inline::Text(s)) => Value::String(s.clone()),
        (TAG_SYMBOL, Inline::List(items)) => {
            let [description, canonical] = items.as_slice() else {
                return Err(mismatch());
            };
            Value::Symbol(Symbol {
                description: optional_text(description, at)?,
                canonical: optional_text(canonical, at)?,
                identity: None,
            })
        }
        _ => return Err(mismatch()),
    })
}

fn complex_node(tag: u8, state: &Inline, at: usize) -> Result<Node> {
    let Inline::List(items) = state else {
        return Err(Error::malformed(at, "complex state must be a list"));
    };
    let [pointer, display, class_name, fields @ ..] = items.as_slice() else {
        return Err(Error::malformed(at, "complex state is too short"));
    };
    let mismatch = || Error::malformed(at, format!("state does not match record tag 0x{tag:02x}"));
    let kind = match (tag, fields) {
        (TAG_RECORD, [flavor]) => Kind::Record(match count(flavor, at)? as i64 {
            FLAVOR_PLAIN => RecordFlavor::Plain,
            FLAVOR_LIST => RecordFlavor::List,
            FLAVOR_ARGUMENTS => RecordFlavor::Arguments,
            _ => return Err(mismatch()),
        }),
        (TAG_BYTES, [Inline::Bytes(bytes)]) => Kind::Bytes(bytes.clone()),
        (TAG_MAP, [size]) => Kind::Map {
            size: count(size, at)?,
        },
        (TAG_SET, [size]) => Kind::Set {
            size: count(size, at)?,
        },
        (TAG_DATE, [Inline::Number(t)]) => Kind::Date(Some(*t)),
        (TAG_DATE, [Inline::Null]) => Kind::Date(None),
        (TAG_PATTERN, [source, flags]) => Kind::Pattern {
            source: text(source, at)?,
            flags: text(flags, at)?,
        },
        (TAG_FAULT, [name, message]) => Kind::Fault {
            name: text(name, at)?,
            message: text(message, at)?,
        },
        (TAG_CALLABLE, [name]) => Kind::Callable {
            name: text(name, at)?,
            identity: None,
        },
        (TAG_DEFERRED, []) => Kind::Deferred { identity: None },
        (TAG_BOXED, [Inline::RecordList(boxed)]) => {
            let [inner_tag, inner] = boxed.as_slice() else {
                return Err(mismatch());
            };
            let inner_tag = u8::try_from(count(inner_tag, at)?).map_err(|_| mismatch())?;
            if is_complex_tag(inner_tag) || inner_tag == 0 || inner_tag > TAG_SYMBOL {
                return Err(mismatch());
            }
            Kind::Boxed(primitive_value(inner_tag, inner, at)?)
        }
        (TAG_SINGLETON, []) => Kind::Singleton,
        _ => return Err(mismatch()),
    };
    Ok(Node {
        pointer: pointer_id(pointer, at)?,
        tag: text(display, at)?,
        class_name: optional_text(class_name, at)?,
        kind,
        classifier: None,
    })
}
