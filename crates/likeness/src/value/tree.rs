//! Arena-backed value trees with lazily produced children.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{Child, Node, NodeId, PointerId, Value};
use crate::codec::Decoder;
use crate::cursor::{Cursor, Source};
use crate::describe::{Classifier, Describer};
use crate::error::Result;

/// One arena entry: the node plus the children produced for it so far.
pub(crate) struct Slot {
    pub node: Rc<Node>,
    pub children: Vec<Child>,
    pub exhausted: bool,
}

impl Slot {
    pub fn new(node: Node) -> Self {
        Self {
            node: Rc::new(node),
            children: Vec::new(),
            exhausted: false,
        }
    }
}

/// Where a tree's children come from.
pub(crate) enum Origin {
    Described(Describer),
    Decoded(Decoder),
}

pub(crate) struct State {
    pub slots: Vec<Slot>,
    pub origin: Origin,
}

impl State {
    fn child(&mut self, node: NodeId, index: usize) -> Result<Option<Child>> {
        loop {
            let slot = &self.slots[node];
            if let Some(child) = slot.children.get(index) {
                return Ok(Some(child.clone()));
            }
            if slot.exhausted {
                return Ok(None);
            }
            let next = match &mut self.origin {
                Origin::Described(describer) => describer.produce(&mut self.slots, node),
                Origin::Decoded(decoder) => decoder.produce(&mut self.slots, node)?,
            };
            let slot = &mut self.slots[node];
            match next {
                Some(child) => slot.children.push(child),
                None => slot.exhausted = true,
            }
        }
    }

    fn lookup(&mut self, pointer: PointerId) -> Result<NodeId> {
        match &mut self.origin {
            Origin::Described(describer) => describer.lookup(pointer),
            Origin::Decoded(decoder) => decoder.lookup(&mut self.slots, pointer),
        }
    }
}

/// A classified or decoded value tree.
///
/// Trees are immutable from the outside. Children are produced on first
/// access and buffered, so walking a tree again replays the same order.
pub struct Tree {
    root: Value,
    state: RefCell<State>,
    classifiers: Rc<[Rc<dyn Classifier>]>,
}

impl Tree {
    pub(crate) fn from_parts(root: Value, state: State, classifiers: Rc<[Rc<dyn Classifier>]>) -> Self {
        Self {
            root,
            state: RefCell::new(state),
            classifiers,
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Number of complex nodes materialized so far.
    pub fn len(&self) -> usize {
        self.state.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, id: NodeId) -> Rc<Node> {
        Rc::clone(&self.state.borrow().slots[id].node)
    }

    /// A cursor over the children of `id`.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Cursor::new(ChildSource { tree: self, node: id })
    }

    /// Replaces a back-reference with its referent.
    pub fn resolve(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Pointer(pointer) => {
                let id = self.state.borrow_mut().lookup(*pointer)?;
                Ok(Value::Complex(id))
            }
            other => Ok(other.clone()),
        }
    }

    /// Resolves `value` and returns its node, if complex.
    pub fn complex(&self, value: &Value) -> Result<Option<(NodeId, Rc<Node>)>> {
        match self.resolve(value)? {
            Value::Complex(id) => Ok(Some((id, self.node(id)))),
            _ => Ok(None),
        }
    }

    pub fn ptr_eq(&self, other: &Tree) -> bool {
        std::ptr::eq(self, other)
    }

    pub(crate) fn classifier(&self, index: usize) -> Option<Rc<dyn Classifier>> {
        self.classifiers.get(index).cloned()
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("nodes", &self.len())
            .finish()
    }
}

/// Child source for one node of a [`Tree`].
#[derive(Clone, Copy)]
pub struct ChildSource<'t> {
    tree: &'t Tree,
    node: NodeId,
}

impl Source for ChildSource<'_> {
    type Item = Child;

    fn fetch(&self, index: usize) -> Result<Option<Child>> {
        self.tree.state.borrow_mut().child(self.node, index)
    }
}

/// Cursor over a node's children.
pub type Children<'t> = Cursor<ChildSource<'t>>;
