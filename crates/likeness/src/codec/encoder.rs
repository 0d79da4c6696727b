//! Breadth-first record encoder.

use std::collections::{HashMap, HashSet, VecDeque};

use likeness_buffers::Writer;
use tracing::debug;

use super::constants::*;
use super::inline::{write_inline, Inline};
use crate::error::Result;
use crate::value::{Child, Children, Kind, Node, NodeId, RecordFlavor, Tree, Value};

/// Position of a value inside the tree: the root, or part `part` of child
/// `index` of `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Site {
    Root,
    Child {
        parent: NodeId,
        index: usize,
        part: u8,
    },
}

enum Pending {
    Value { value: Value, site: Site },
    Meta { child: Child, parent: NodeId, index: usize },
}

/// Encodes `tree` into a self-contained buffer.
pub fn encode(tree: &Tree) -> Result<Vec<u8>> {
    let owners = find_owners(tree)?;
    let mut encoder = Encoder {
        tree,
        owners,
        writer: Writer::new(),
        records: 0,
    };
    encoder.writer.u16(FORMAT_VERSION);
    let mut queue: VecDeque<(Pending, Option<usize>)> = VecDeque::new();
    queue.push_back((
        Pending::Value {
            value: tree.root().clone(),
            site: Site::Root,
        },
        None,
    ));
    while let Some((pending, slot)) = queue.pop_front() {
        if let Some(slot) = slot {
            let at = encoder.writer.position() as u32;
            encoder.writer.patch_u32(slot, at);
        }
        for child in encoder.write_record(pending)? {
            queue.push_back(child);
        }
    }
    let records = encoder.records;
    let bytes = encoder.writer.flush();
    debug!(records, bytes = bytes.len(), "encoded tree");
    Ok(bytes)
}

enum Visit<'t> {
    Value { value: Value, site: Site },
    Node { id: NodeId, cursor: Children<'t>, index: usize },
}

/// Depth-first pass locating the first occurrence of every complex node.
/// The full record goes there; every other occurrence is a back-reference.
fn find_owners(tree: &Tree) -> Result<HashMap<NodeId, Site>> {
    let mut owners = HashMap::new();
    let mut visited = HashSet::new();
    let mut stack = vec![Visit::Value {
        value: tree.root().clone(),
        site: Site::Root,
    }];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Value { value, site } => {
                if let Some((id, _)) = tree.complex(&value)? {
                    if visited.insert(id) {
                        owners.insert(id, site);
                        stack.push(Visit::Node {
                            id,
                            cursor: tree.children(id),
                            index: 0,
                        });
                    }
                }
            }
            Visit::Node {
                id,
                mut cursor,
                index,
            } => {
                let Some(child) = cursor.pull()? else {
                    continue;
                };
                stack.push(Visit::Node {
                    id,
                    cursor,
                    index: index + 1,
                });
                // Entries descend into their key before their value.
                for (part, value) in parts(child).into_iter().enumerate().rev() {
                    stack.push(Visit::Value {
                        value,
                        site: Site::Child {
                            parent: id,
                            index,
                            part: part as u8,
                        },
                    });
                }
            }
        }
    }
    Ok(owners)
}

/// The values a meta node carries, in traversal order.
fn parts(child: Child) -> Vec<Value> {
    match child {
        Child::Property { key, value } | Child::Entry { key, value } => vec![key, value],
        Child::Item { value, .. } => vec![value],
        Child::Boundary { .. } => Vec::new(),
    }
}

struct Encoder<'t> {
    tree: &'t Tree,
    owners: HashMap<NodeId, Site>,
    writer: Writer,
    records: usize,
}

impl Encoder<'_> {
    /// Writes one record and returns its children with their offset slots.
    fn write_record(&mut self, pending: Pending) -> Result<Vec<(Pending, Option<usize>)>> {
        self.records += 1;
        match pending {
            Pending::Value { value, site } => self.write_value(value, site),
            Pending::Meta {
                child,
                parent,
                index,
            } => Ok(self.write_meta(child, parent, index)),
        }
    }

    fn write_value(&mut self, value: Value, site: Site) -> Result<Vec<(Pending, Option<usize>)>> {
        let id = match self.tree.resolve(&value)? {
            Value::Complex(id) => id,
            primitive => {
                let (tag, state) = primitive_state(&primitive);
                self.header(tag, 0);
                write_inline(&mut self.writer, &state);
                return Ok(Vec::new());
            }
        };
        let node = self.tree.node(id);
        if self.owners.get(&id) != Some(&site) {
            self.header(TAG_POINTER, 0);
            write_inline(&mut self.writer, &Inline::Number(node.pointer as f64));
            return Ok(Vec::new());
        }
        let mut children = Vec::new();
        let mut cursor = self.tree.children(id);
        while let Some(child) = cursor.pull()? {
            children.push(child);
        }
        let slots = self.header(complex_tag(&node), children.len());
        write_inline(&mut self.writer, &complex_state(&node));
        Ok(children
            .into_iter()
            .enumerate()
            .zip(slots)
            .map(|((index, child), slot)| {
                (
                    Pending::Meta {
                        child,
                        parent: id,
                        index,
                    },
                    Some(slot),
                )
            })
            .collect())
    }

    fn write_meta(&mut self, child: Child, parent: NodeId, index: usize) -> Vec<(Pending, Option<usize>)> {
        let site = |part| Site::Child {
            parent,
            index,
            part,
        };
        let (tag, state, values) = match child {
            Child::Property { key, value } => (TAG_PROPERTY, Inline::Undefined, vec![key, value]),
            Child::Entry { key, value } => (TAG_ENTRY, Inline::Undefined, vec![key, value]),
            Child::Item { index, value } => (TAG_ITEM, Inline::count(index), vec![value]),
            Child::Boundary { phase, count } => (
                TAG_BOUNDARY,
                Inline::List(vec![Inline::count(phase.code() as usize), Inline::count(count)]),
                Vec::new(),
            ),
        };
        let slots = self.header(tag, values.len());
        write_inline(&mut self.writer, &state);
        values
            .into_iter()
            .zip(slots)
            .enumerate()
            .map(|(part, (value, slot))| {
                (
                    Pending::Value {
                        value,
                        site: site(part as u8),
                    },
                    Some(slot),
                )
            })
            .collect()
    }

    /// Writes the tag, child count and reserved offset slots.
    fn header(&mut self, tag: u8, children: usize) -> Vec<usize> {
        self.writer.u8(tag);
        self.writer.vu(children as u64);
        (0..children).map(|_| self.writer.reserve_u32()).collect()
    }
}

pub(crate) fn primitive_state(value: &Value) -> (u8, Inline) {
    match value {
        Value::Null => (TAG_NULL, Inline::Null),
        Value::Undefined => (TAG_UNDEFINED, Inline::Undefined),
        Value::Boolean(b) => (TAG_BOOLEAN, Inline::Bool(*b)),
        Value::Number(n) => (TAG_NUMBER, Inline::Number(*n)),
        Value::BigInteger(i) => (TAG_BIG_INTEGER, Inline::text(i.to_string())),
        Value::String(s) => (TAG_STRING, Inline::text(s.as_str())),
        Value::Symbol(sym) => (
            TAG_SYMBOL,
            Inline::List(vec![
                Inline::optional_text(sym.description.as_deref()),
                Inline::optional_text(sym.canonical.as_deref()),
            ]),
        ),
        // Callers resolve complex values first.
        Value::Complex(_) | Value::Pointer(_) => (TAG_UNDEFINED, Inline::Undefined),
    }
}

fn complex_tag(node: &Node) -> u8 {
    match node.kind {
        Kind::Record(_) => TAG_RECORD,
        Kind::Bytes(_) => TAG_BYTES,
        Kind::Map { .. } => TAG_MAP,
        Kind::Set { .. } => TAG_SET,
        Kind::Date(_) => TAG_DATE,
        Kind::Pattern { .. } => TAG_PATTERN,
        Kind::Fault { .. } => TAG_FAULT,
        Kind::Callable { .. } => TAG_CALLABLE,
        Kind::Deferred { .. } => TAG_DEFERRED,
        Kind::Boxed(_) => TAG_BOXED,
        Kind::Singleton => TAG_SINGLETON,
    }
}

fn complex_state(node: &Node) -> Inline {
    let mut state = vec![
        Inline::Number(node.pointer as f64),
        Inline::text(node.tag.as_str()),
        Inline::optional_text(node.class_name.as_deref()),
    ];
    match &node.kind {
        Kind::Record(flavor) => state.push(Inline::Number(match flavor {
            RecordFlavor::Plain => FLAVOR_PLAIN,
            RecordFlavor::List => FLAVOR_LIST,
            RecordFlavor::Arguments => FLAVOR_ARGUMENTS,
        } as f64)),
        Kind::Bytes(bytes) => state.push(Inline::Bytes(bytes.clone())),
        Kind::Map { size } | Kind::Set { size } => state.push(Inline::count(*size)),
        Kind::Date(time) => state.push(time.map_or(Inline::Null, Inline::Number)),
        Kind::Pattern { source, flags } => {
            state.push(Inline::text(source.as_str()));
            state.push(Inline::text(flags.as_str()));
        }
        Kind::Fault { name, message } => {
            state.push(Inline::text(name.as_str()));
            state.push(Inline::text(message.as_str()));
        }
        Kind::Callable { name, .. } => state.push(Inline::text(name.as_str())),
        Kind::Boxed(primitive) => {
            let (tag, inner) = primitive_state(primitive);
            state.push(Inline::RecordList(vec![Inline::Number(tag as f64), inner]));
        }
        Kind::Deferred { .. } | Kind::Singleton => {}
    }
    Inline::List(state)
}
