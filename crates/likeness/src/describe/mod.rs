//! Classification of host values into a [`Tree`].
//!
//! Classification order is fixed: primitive test, custom [`Classifier`]s in
//! registration order, the built-in tag table, unboxing, generic record.
//! Pointer ids are allocated before any child is described, so a cycle that
//! re-enters a host object finds it in the registry.

mod table;

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::diff::Instruction;
use crate::error::{Error, Result};
use crate::host::{Host, HostObject, HostRef, HostSymbol, Internal, PropertyKey};
use crate::value::{
    Child, Kind, Node, NodeId, Origin, Phase, PointerId, RecordFlavor, Slot, State, Symbol, Tree,
    Value, Variant,
};

pub use table::builtin_variant;

/// Custom classification hook, tried before the built-in table.
pub trait Classifier {
    /// Returns the variant to use for `object`, or `None` to defer.
    fn classify(&self, object: &HostObject, tag: &str, class_name: Option<&str>) -> Option<Variant>;

    /// Overrides the differ's decision for a pair of nodes this classifier
    /// claimed. `None` keeps the built-in decision.
    fn prepare_diff(&self, _lhs: &Node, _rhs: &Node) -> Option<Instruction> {
        None
    }
}

/// Options for [`describe_with`].
#[derive(Clone, Default)]
pub struct DescribeOptions {
    pub classifiers: Vec<Rc<dyn Classifier>>,
}

impl DescribeOptions {
    pub fn with_classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifiers.push(Rc::new(classifier));
        self
    }
}

/// Classifies `host` with the built-in rules only.
pub fn describe(host: &Host) -> Tree {
    describe_with(host, &DescribeOptions::default())
}

/// Classifies `host`, trying `options.classifiers` first.
pub fn describe_with(host: &Host, options: &DescribeOptions) -> Tree {
    let classifiers: Rc<[Rc<dyn Classifier>]> = options.classifiers.clone().into();
    let mut describer = Describer {
        classifiers: Rc::clone(&classifiers),
        registry: HashMap::new(),
        producers: Vec::new(),
    };
    let mut slots = Vec::new();
    let root = describer.describe(&mut slots, host);
    debug!(classifiers = classifiers.len(), "described host value");
    let state = State {
        slots,
        origin: Origin::Described(describer),
    };
    Tree::from_parts(root, state, classifiers)
}

/// What a host object's children are built from, captured when its node is
/// allocated.
enum Iterable {
    Entries(Vec<(Host, Host)>),
    Members(Vec<Host>),
}

#[derive(Clone, Copy)]
enum HostPhase {
    Properties(usize),
    ListBoundary,
    List(usize),
    IterableBoundary,
    Iterable(usize),
    Done,
}

struct Producer {
    properties: Vec<(PropertyKey, Host)>,
    list: Option<Vec<Host>>,
    iterable: Option<Iterable>,
    phase: HostPhase,
}

impl Producer {
    fn empty() -> Self {
        Self {
            properties: Vec::new(),
            list: None,
            iterable: None,
            phase: HostPhase::Done,
        }
    }
}

pub(crate) struct Describer {
    classifiers: Rc<[Rc<dyn Classifier>]>,
    /// Host identity to node; holding the `HostRef` pins the address.
    registry: HashMap<usize, (HostRef, NodeId)>,
    producers: Vec<Producer>,
}

impl Describer {
    fn describe(&mut self, slots: &mut Vec<Slot>, host: &Host) -> Value {
        match host {
            Host::Null => Value::Null,
            Host::Undefined => Value::Undefined,
            Host::Boolean(b) => Value::Boolean(*b),
            Host::Number(n) => Value::Number(*n),
            Host::BigInteger(i) => Value::BigInteger(*i),
            Host::String(s) => Value::String(s.clone()),
            Host::Symbol(sym) => Value::Symbol(describe_symbol(sym)),
            Host::Object(r) => self.describe_object(slots, r),
        }
    }

    fn describe_object(&mut self, slots: &mut Vec<Slot>, r: &HostRef) -> Value {
        if let Some((_, id)) = self.registry.get(&r.identity()) {
            return Value::Pointer(slots[*id].node.pointer);
        }
        let id = slots.len();
        let object = r.borrow();
        let (variant, classifier) = self.classify(&object);
        let (kind, producer) = self.build(slots, variant, &object, r.identity());
        slots.push(Slot::new(Node {
            pointer: id as PointerId,
            tag: object.tag.clone(),
            class_name: object.class_name.clone(),
            kind,
            classifier,
        }));
        self.producers.push(producer);
        self.registry.insert(r.identity(), (r.clone(), id));
        Value::Complex(id)
    }

    fn classify(&self, object: &HostObject) -> (Variant, Option<usize>) {
        let tag = object.tag.as_str();
        let class_name = object.class_name.as_deref();
        for (index, classifier) in self.classifiers.iter().enumerate() {
            if let Some(variant) = classifier.classify(object, tag, class_name) {
                return (variant, Some(index));
            }
        }
        if let Some(variant) = builtin_variant(tag) {
            return (variant, None);
        }
        if matches!(object.internal, Internal::Primitive(_)) {
            return (Variant::Boxed, None);
        }
        (Variant::Record, None)
    }

    /// Builds the node state and child producer. Only primitives are
    /// described eagerly here; complex children wait for the cursor.
    fn build(
        &mut self,
        slots: &mut Vec<Slot>,
        variant: Variant,
        object: &HostObject,
        identity: usize,
    ) -> (Kind, Producer) {
        let mut properties = ordered_properties(&object.properties);
        let mut list = None;
        let mut iterable = None;
        let kind = match variant {
            Variant::Record => Kind::Record(RecordFlavor::Plain),
            Variant::List | Variant::Arguments => {
                list = Some(list_items(&object.internal));
                Kind::Record(if variant == Variant::List {
                    RecordFlavor::List
                } else {
                    RecordFlavor::Arguments
                })
            }
            Variant::Bytes => {
                let bytes = match &object.internal {
                    Internal::Bytes(b) => b.clone(),
                    _ => Vec::new(),
                };
                properties.insert(0, ("byteLength".into(), Host::Number(bytes.len() as f64)));
                Kind::Bytes(bytes)
            }
            Variant::Map => {
                let entries = match &object.internal {
                    Internal::Entries(e) => e.clone(),
                    _ => Vec::new(),
                };
                let size = entries.len();
                iterable = Some(Iterable::Entries(entries));
                Kind::Map { size }
            }
            Variant::Set => {
                let members = list_items(&object.internal);
                let size = members.len();
                iterable = Some(Iterable::Members(members));
                Kind::Set { size }
            }
            Variant::Date => Kind::Date(match object.internal {
                Internal::Time(Some(t)) if t.is_finite() => Some(t),
                _ => None,
            }),
            Variant::Pattern => match &object.internal {
                Internal::Pattern { source, flags } => Kind::Pattern {
                    source: source.clone(),
                    flags: normalize_flags(flags),
                },
                _ => Kind::Pattern {
                    source: String::new(),
                    flags: String::new(),
                },
            },
            Variant::Fault => match &object.internal {
                Internal::Fault { name, message } => Kind::Fault {
                    name: name.clone(),
                    message: message.clone(),
                },
                _ => Kind::Fault {
                    name: object.class_name.clone().unwrap_or_else(|| "Error".to_string()),
                    message: String::new(),
                },
            },
            Variant::Callable => Kind::Callable {
                name: match &object.internal {
                    Internal::Function { name } => name.clone(),
                    _ => String::new(),
                },
                identity: Some(identity),
            },
            Variant::Deferred => Kind::Deferred {
                identity: Some(identity),
            },
            Variant::Boxed => {
                let inner = match &object.internal {
                    Internal::Primitive(p) if p.is_primitive() => self.describe(slots, p),
                    _ => Value::Undefined,
                };
                Kind::Boxed(inner)
            }
            Variant::Singleton => return (Kind::Singleton, Producer::empty()),
        };
        let producer = Producer {
            properties,
            list,
            iterable,
            phase: HostPhase::Properties(0),
        };
        (kind, producer)
    }

    /// Produces the next child of `node`.
    pub(crate) fn produce(&mut self, slots: &mut Vec<Slot>, node: NodeId) -> Option<Child> {
        loop {
            let phase = self.producers[node].phase;
            match phase {
                HostPhase::Properties(i) => {
                    let producer = &mut self.producers[node];
                    if let Some((key, value)) = producer.properties.get(i).cloned() {
                        producer.phase = HostPhase::Properties(i + 1);
                        let key = match key {
                            PropertyKey::String(s) => Value::String(s),
                            PropertyKey::Symbol(sym) => Value::Symbol(describe_symbol(&sym)),
                        };
                        let value = self.describe(slots, &value);
                        return Some(Child::Property { key, value });
                    }
                    producer.phase = if producer.list.is_some() {
                        HostPhase::ListBoundary
                    } else {
                        HostPhase::IterableBoundary
                    };
                }
                HostPhase::ListBoundary => {
                    let producer = &mut self.producers[node];
                    producer.phase = HostPhase::List(0);
                    let count = producer.list.as_ref().map_or(0, Vec::len);
                    return Some(Child::Boundary {
                        phase: Phase::List,
                        count,
                    });
                }
                HostPhase::List(i) => {
                    let producer = &mut self.producers[node];
                    if let Some(item) = producer.list.as_ref().and_then(|l| l.get(i)).cloned() {
                        producer.phase = HostPhase::List(i + 1);
                        let value = self.describe(slots, &item);
                        return Some(Child::Item { index: i, value });
                    }
                    producer.phase = HostPhase::IterableBoundary;
                }
                HostPhase::IterableBoundary => {
                    let producer = &mut self.producers[node];
                    let count = match &producer.iterable {
                        Some(Iterable::Entries(e)) => e.len(),
                        Some(Iterable::Members(m)) => m.len(),
                        None => {
                            producer.phase = HostPhase::Done;
                            continue;
                        }
                    };
                    producer.phase = HostPhase::Iterable(0);
                    return Some(Child::Boundary {
                        phase: Phase::Iterable,
                        count,
                    });
                }
                HostPhase::Iterable(i) => {
                    let producer = &mut self.producers[node];
                    producer.phase = HostPhase::Iterable(i + 1);
                    match &producer.iterable {
                        Some(Iterable::Entries(entries)) => {
                            if let Some((k, v)) = entries.get(i).cloned() {
                                let key = self.describe(slots, &k);
                                let value = self.describe(slots, &v);
                                return Some(Child::Entry { key, value });
                            }
                        }
                        Some(Iterable::Members(members)) => {
                            if let Some(m) = members.get(i).cloned() {
                                let value = self.describe(slots, &m);
                                return Some(Child::Item { index: i, value });
                            }
                        }
                        None => {}
                    }
                    self.producers[node].phase = HostPhase::Done;
                }
                HostPhase::Done => return None,
            }
        }
    }

    pub(crate) fn lookup(&self, pointer: PointerId) -> Result<NodeId> {
        let id = pointer as NodeId;
        if id < self.producers.len() {
            Ok(id)
        } else {
            Err(Error::PointerLookup { pointer })
        }
    }
}

fn describe_symbol(sym: &HostSymbol) -> Symbol {
    Symbol {
        description: sym.description().map(str::to_string),
        canonical: sym.canonical().map(str::to_string),
        identity: Some(sym.identity()),
    }
}

/// String-keyed properties first, then symbol-keyed, each in insertion order.
fn ordered_properties(properties: &[(PropertyKey, Host)]) -> Vec<(PropertyKey, Host)> {
    let (strings, symbols): (Vec<_>, Vec<_>) = properties
        .iter()
        .cloned()
        .partition(|(k, _)| matches!(k, PropertyKey::String(_)));
    strings.into_iter().chain(symbols).collect()
}

fn list_items(internal: &Internal) -> Vec<Host> {
    match internal {
        Internal::List(items) | Internal::Members(items) => items.clone(),
        _ => Vec::new(),
    }
}

pub(crate) fn normalize_flags(flags: &str) -> String {
    let mut chars: Vec<char> = flags.chars().collect();
    chars.sort_unstable();
    chars.dedup();
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drain(tree: &Tree, id: NodeId) -> Vec<Child> {
        let mut cursor = tree.children(id);
        let mut out = Vec::new();
        while let Some(c) = cursor.pull().unwrap() {
            out.push(c);
        }
        out
    }

    #[test]
    fn primitives_stay_inline() {
        let tree = describe(&Host::Number(-0.0));
        assert!(matches!(tree.root(), Value::Number(n) if n.is_sign_negative()));
        assert!(tree.is_empty());
    }

    #[test]
    fn pointer_ids_follow_first_visit_order() {
        let tree = describe(&Host::from(&json!({"a": {"b": {}}, "c": []})));
        let Value::Complex(root) = tree.root() else { panic!("root must be complex") };
        assert_eq!(tree.node(*root).pointer, 0);
        let children = drain(&tree, *root);
        assert_eq!(children.len(), 2);
        let Child::Property { value: Value::Complex(a), .. } = &children[0] else { panic!() };
        assert_eq!(tree.node(*a).pointer, 1);
        // `c` is described when the root's second child is produced, before
        // anything inside `a` is pulled.
        let Child::Property { value: Value::Complex(c), .. } = &children[1] else { panic!() };
        assert_eq!(tree.node(*c).pointer, 2);
    }

    #[test]
    fn self_reference_becomes_pointer() {
        let obj = HostRef::object();
        obj.set("self", obj.clone());
        let tree = describe(&obj.clone().into());
        let children = drain(&tree, 0);
        assert!(matches!(
            &children[0],
            Child::Property { value: Value::Pointer(0), .. }
        ));
        assert!(matches!(tree.resolve(&Value::Pointer(0)).unwrap(), Value::Complex(0)));
    }

    #[test]
    fn lists_emit_boundary_then_items() {
        let tree = describe(&Host::from(&json!([1, "x"])));
        let children = drain(&tree, 0);
        assert!(matches!(children[0], Child::Boundary { phase: Phase::List, count: 2 }));
        assert!(matches!(&children[2], Child::Item { index: 1, value: Value::String(s) } if s == "x"));
    }

    #[test]
    fn symbol_properties_follow_string_properties() {
        let obj = HostRef::object();
        let s = HostSymbol::new(Some("s"));
        obj.set(s, 1.0).set("a", 2.0);
        let tree = describe(&obj.into());
        let children = drain(&tree, 0);
        assert!(matches!(&children[0], Child::Property { key: Value::String(k), .. } if k == "a"));
        assert!(children[1].is_symbol_property());
    }

    #[test]
    fn byte_buffers_expose_byte_length() {
        let tree = describe(&HostRef::bytes("Uint8Array", vec![1, 2, 3]).into());
        assert!(matches!(&tree.node(0).kind, Kind::Bytes(b) if b == &[1, 2, 3]));
        let children = drain(&tree, 0);
        assert_eq!(children.len(), 1);
        assert!(matches!(
            &children[0],
            Child::Property { key: Value::String(k), value: Value::Number(n) } if k == "byteLength" && *n == 3.0
        ));
    }

    #[test]
    fn maps_emit_entries_after_boundary() {
        let map = HostRef::map(vec![(Host::from("k"), Host::from(1.0))]);
        let tree = describe(&map.into());
        let children = drain(&tree, 0);
        assert!(matches!(children[0], Child::Boundary { phase: Phase::Iterable, count: 1 }));
        assert!(matches!(children[1], Child::Entry { .. }));
    }

    #[test]
    fn pattern_flags_are_sorted() {
        let tree = describe(&HostRef::regexp("a+", "mgi").into());
        assert!(matches!(&tree.node(0).kind, Kind::Pattern { flags, .. } if flags == "gim"));
    }

    #[test]
    fn unknown_tags_unbox_then_fall_back() {
        let odd = HostRef::new(HostObject::new(
            "Custom",
            None,
            Internal::Primitive(Box::new(Host::from("x"))),
        ));
        let tree = describe(&odd.into());
        assert_eq!(tree.node(0).variant(), Variant::Boxed);

        let plain = HostRef::new(HostObject::new("WeakMap", Some("WeakMap"), Internal::None));
        let tree = describe(&plain.into());
        assert_eq!(tree.node(0).variant(), Variant::Record);
    }

    struct VectorClassifier;

    impl Classifier for VectorClassifier {
        fn classify(&self, _: &HostObject, tag: &str, _: Option<&str>) -> Option<Variant> {
            (tag == "Vector").then_some(Variant::List)
        }
    }

    #[test]
    fn custom_classifiers_run_before_builtins() {
        let v = HostRef::new(HostObject::new(
            "Vector",
            Some("Vector"),
            Internal::List(vec![Host::from(1.0)]),
        ));
        let options = DescribeOptions::default().with_classifier(VectorClassifier);
        let tree = describe_with(&v.into(), &options);
        let node = tree.node(0);
        assert_eq!(node.variant(), Variant::List);
        assert_eq!(node.classifier, Some(0));
    }

    #[test]
    fn callables_carry_host_identity() {
        let f = HostRef::function("f");
        let a = describe(&f.clone().into());
        let b = describe(&f.into());
        let (Kind::Callable { identity: x, .. }, Kind::Callable { identity: y, .. }) =
            (&a.node(0).kind, &b.node(0).kind)
        else {
            panic!("expected callables")
        };
        assert!(x.is_some());
        assert_eq!(x, y);
    }
}
