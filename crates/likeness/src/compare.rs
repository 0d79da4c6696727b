//! Structural comparison over two value trees.
//!
//! [`compare`] decides a single pair of nodes in the four-valued algebra.
//! [`compare_trees`] walks both trees with an explicit stack and two stacks of
//! open (ancestor) nodes; a pair that closes a cycle on both sides at the same
//! ancestor depth is consistent, a cycle closed on one side only is not.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::cursor::Cursor;
use crate::error::Result;
use crate::value::{
    Child, Children, Comparison, Kind, Node, NodeId, OpenStack, RecordFlavor, Symbol, Tree, Value,
};

/// Overall verdict of a tree comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Equal,
    Unequal,
    /// Unequal only because some leaf could not be confirmed, e.g. a
    /// deserialized function compared against a live one.
    Ambiguous,
}

/// Compares two values at node level, resolving back-references first.
pub fn compare(lt: &Tree, lhs: &Value, rt: &Tree, rhs: &Value) -> Result<Comparison> {
    let lhs = lt.resolve(lhs)?;
    let rhs = rt.resolve(rhs)?;
    Ok(match (&lhs, &rhs) {
        (Value::Complex(x), Value::Complex(y)) => {
            if lt.ptr_eq(rt) && x == y {
                Comparison::DeepEqual
            } else {
                compare_nodes(&lt.node(*x), &rt.node(*y))
            }
        }
        (a, b) if a.is_primitive() && b.is_primitive() => compare_primitives(a, b),
        _ => Comparison::Unequal,
    })
}

/// Compares two meta nodes by their own state (keys, indices, counts).
pub fn compare_children(lhs: &Child, rhs: &Child) -> Comparison {
    match (lhs, rhs) {
        (Child::Property { key: a, .. }, Child::Property { key: b, .. }) => match (a, b) {
            (Value::String(x), Value::String(y)) if x == y => Comparison::ShallowEqual,
            (Value::Symbol(x), Value::Symbol(y)) => match compare_symbols(x, y) {
                Comparison::DeepEqual => Comparison::ShallowEqual,
                _ => Comparison::Ambiguous,
            },
            _ => Comparison::Unequal,
        },
        (Child::Item { index: a, .. }, Child::Item { index: b, .. }) if a == b => {
            Comparison::ShallowEqual
        }
        (Child::Entry { .. }, Child::Entry { .. }) => Comparison::ShallowEqual,
        (
            Child::Boundary { phase: a, count: x },
            Child::Boundary { phase: b, count: y },
        ) if a == b && x == y => Comparison::DeepEqual,
        _ => Comparison::Unequal,
    }
}

pub(crate) fn compare_primitives(lhs: &Value, rhs: &Value) -> Comparison {
    let equal = match (lhs, rhs) {
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(*a, *b),
        (Value::BigInteger(a), Value::BigInteger(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Symbol(a), Value::Symbol(b)) => return compare_symbols(a, b),
        _ => false,
    };
    if equal {
        Comparison::DeepEqual
    } else {
        Comparison::Unequal
    }
}

/// NaN equals NaN; otherwise bit patterns decide, so `0` and `-0` differ.
pub(crate) fn numbers_equal(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
}

pub(crate) fn compare_symbols(a: &Symbol, b: &Symbol) -> Comparison {
    if let (Some(x), Some(y)) = (a.identity, b.identity) {
        if x == y {
            return Comparison::DeepEqual;
        }
    }
    match (&a.canonical, &b.canonical) {
        (Some(x), Some(y)) if x == y => return Comparison::DeepEqual,
        (Some(_), Some(_)) | (Some(_), None) | (None, Some(_)) => return Comparison::Unequal,
        (None, None) => {}
    }
    if a.identity.is_some() && b.identity.is_some() {
        return Comparison::Unequal;
    }
    if a.description == b.description {
        Comparison::Ambiguous
    } else {
        Comparison::Unequal
    }
}

fn same_label(a: &Node, b: &Node) -> bool {
    a.tag == b.tag && a.class_name == b.class_name
}

fn sameness(equal: bool) -> Comparison {
    if equal {
        Comparison::ShallowEqual
    } else {
        Comparison::Unequal
    }
}

pub(crate) fn compare_nodes(a: &Node, b: &Node) -> Comparison {
    match (&a.kind, &b.kind) {
        (Kind::Record(RecordFlavor::Arguments), Kind::Record(RecordFlavor::List)) => {
            Comparison::Ambiguous
        }
        (Kind::Record(x), Kind::Record(y)) => sameness(x == y && same_label(a, b)),
        (Kind::Bytes(x), Kind::Bytes(y)) => sameness(x == y && same_label(a, b)),
        (Kind::Map { .. }, Kind::Map { .. }) | (Kind::Set { .. }, Kind::Set { .. }) => {
            sameness(same_label(a, b))
        }
        (Kind::Date(x), Kind::Date(y)) => {
            let same_time = match (x, y) {
                (Some(x), Some(y)) => numbers_equal(*x, *y),
                (None, None) => true,
                _ => false,
            };
            sameness(same_time && same_label(a, b))
        }
        (
            Kind::Pattern { source: s1, flags: f1 },
            Kind::Pattern { source: s2, flags: f2 },
        ) => sameness(s1 == s2 && f1 == f2 && same_label(a, b)),
        (
            Kind::Fault { name: n1, message: m1 },
            Kind::Fault { name: n2, message: m2 },
        ) => sameness(n1 == n2 && m1 == m2 && same_label(a, b)),
        (
            Kind::Callable { name: n1, identity: i1 },
            Kind::Callable { name: n2, identity: i2 },
        ) => match (i1, i2) {
            (Some(x), Some(y)) => sameness(x == y),
            _ if n1 == n2 && same_label(a, b) => Comparison::Ambiguous,
            _ => Comparison::Unequal,
        },
        (Kind::Deferred { identity: i1 }, Kind::Deferred { identity: i2 }) => match (i1, i2) {
            (Some(x), Some(y)) => sameness(x == y),
            _ if same_label(a, b) => Comparison::Ambiguous,
            _ => Comparison::Unequal,
        },
        (Kind::Boxed(x), Kind::Boxed(y)) => {
            if !same_label(a, b) {
                return Comparison::Unequal;
            }
            match compare_primitives(x, y) {
                Comparison::DeepEqual => Comparison::ShallowEqual,
                other => other,
            }
        }
        (Kind::Singleton, Kind::Singleton) if same_label(a, b) => Comparison::DeepEqual,
        _ => Comparison::Unequal,
    }
}

/// Options for [`compare_trees_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Complex values nested deeper than this are not opened. A pair that
    /// would have to be opened there cannot be confirmed and yields
    /// [`Verdict::Ambiguous`].
    pub max_depth: Option<usize>,
}

/// Returns `true` when both trees are structurally equal.
///
/// Ambiguous leaves count as unequal; use [`compare_trees_verdict`] to tell
/// them apart.
pub fn compare_trees(lhs: &Tree, rhs: &Tree) -> Result<bool> {
    Ok(compare_trees_verdict(lhs, rhs)? == Verdict::Equal)
}

/// Full-depth comparison that keeps ambiguity visible.
pub fn compare_trees_verdict(lhs: &Tree, rhs: &Tree) -> Result<Verdict> {
    compare_trees_with(lhs, rhs, &CompareOptions::default())
}

/// [`compare_trees_verdict`] under `options`.
pub fn compare_trees_with(lhs: &Tree, rhs: &Tree, options: &CompareOptions) -> Result<Verdict> {
    let mut walker = Walker::new(lhs, rhs);
    walker.max_depth = options.max_depth;
    let equal =
        walker.walk(Operand::Value(lhs.root().clone()), Operand::Value(rhs.root().clone()))?;
    Ok(if equal {
        Verdict::Equal
    } else if walker.ambiguous {
        Verdict::Ambiguous
    } else {
        Verdict::Unequal
    })
}

/// Either side of a pair being walked.
#[derive(Debug, Clone)]
pub(crate) enum Operand {
    Value(Value),
    Child(Child),
}

enum Frame<'t> {
    Nodes {
        lhs: Children<'t>,
        rhs: Children<'t>,
        pair: (NodeId, NodeId),
        /// Open-stack position of `pair`.
        depth: usize,
        /// Shallowest open position a cycle inside this frame closed at.
        low: usize,
    },
    Pairs(Cursor<crate::cursor::Recorded<(Operand, Operand)>>),
}

/// Why a walk failed.
#[derive(Debug, Clone, Copy)]
struct Failure {
    /// Shallowest open position the failure depends on, `usize::MAX` when
    /// it depends on none.
    low: usize,
    ambiguous: bool,
}

impl Failure {
    const PLAIN: Failure = Failure {
        low: usize::MAX,
        ambiguous: false,
    };

    const AMBIGUOUS: Failure = Failure {
        low: usize::MAX,
        ambiguous: true,
    };

    fn at(low: usize) -> Self {
        Failure {
            low,
            ambiguous: false,
        }
    }
}

enum Step<'t> {
    Equal,
    /// Equal under the assumption that the pair open at this position is.
    Closed(usize),
    Unequal(Failure),
    Descend(Frame<'t>),
}

/// Iterative deep comparison with explicit ancestor stacks.
///
/// The differ reuses one walker so its own open stacks seed every
/// comparison it asks for. Verdicts are memoized across walks only when
/// they hold regardless of those seeded ancestors.
pub(crate) struct Walker<'t> {
    lt: &'t Tree,
    rt: &'t Tree,
    pub lhs_open: OpenStack,
    pub rhs_open: OpenStack,
    /// Node pairs proven equal without assumptions about enclosing pairs.
    memo: HashSet<(NodeId, NodeId)>,
    /// Node pairs proven unequal, and whether an ambiguous leaf decided it.
    unequal: HashMap<(NodeId, NodeId), bool>,
    /// Whether the last failed walk failed on an unconfirmable leaf.
    pub ambiguous: bool,
    pub max_depth: Option<usize>,
}

impl<'t> Walker<'t> {
    pub fn new(lt: &'t Tree, rt: &'t Tree) -> Self {
        Self {
            lt,
            rt,
            lhs_open: OpenStack::default(),
            rhs_open: OpenStack::default(),
            memo: HashSet::new(),
            unequal: HashMap::new(),
            ambiguous: false,
            max_depth: None,
        }
    }

    /// Where `lhs`/`rhs` sit on their open stacks, if they close a cycle.
    pub fn open_positions(&self, lhs: NodeId, rhs: NodeId) -> (Option<usize>, Option<usize>) {
        (self.lhs_open.position(lhs), self.rhs_open.position(rhs))
    }

    /// Deeply compares one pair. Open stacks are restored on return.
    pub fn walk(&mut self, lhs: Operand, rhs: Operand) -> Result<bool> {
        let base = (self.lhs_open.len(), self.rhs_open.len());
        self.ambiguous = false;
        let result = self.walk_inner(lhs, rhs);
        self.lhs_open.truncate(base.0);
        self.rhs_open.truncate(base.1);
        result
    }

    fn walk_inner(&mut self, lhs: Operand, rhs: Operand) -> Result<bool> {
        let mut stack: Vec<Frame<'t>> = Vec::new();
        let mut next = Some((lhs, rhs));
        loop {
            if let Some((l, r)) = next.take() {
                let step = self.step(l, r)?;
                if !self.apply(&mut stack, step) {
                    return Ok(false);
                }
            }
            let Some(top) = stack.last_mut() else {
                return Ok(true);
            };
            let step = match top {
                Frame::Nodes { lhs, rhs, .. } => match (lhs.pull()?, rhs.pull()?) {
                    (Some(a), Some(b))
                        if a.is_symbol_property()
                            && b.is_symbol_property()
                            && compare_children(&a, &b) == Comparison::Ambiguous =>
                    {
                        self.collect_symbols(a, b, lhs, rhs)?
                    }
                    (Some(a), Some(b)) => {
                        next = Some((Operand::Child(a), Operand::Child(b)));
                        continue;
                    }
                    (None, None) => {
                        self.close(&mut stack);
                        continue;
                    }
                    _ => Step::Unequal(Failure::PLAIN),
                },
                Frame::Pairs(pairs) => match pairs.pull()? {
                    Some(pair) => {
                        next = Some(pair);
                        continue;
                    }
                    None => {
                        stack.pop();
                        continue;
                    }
                },
            };
            if !self.apply(&mut stack, step) {
                return Ok(false);
            }
        }
    }

    /// Applies one step to the frame stack; `false` once the walk failed.
    fn apply(&mut self, stack: &mut Vec<Frame<'t>>, step: Step<'t>) -> bool {
        match step {
            Step::Equal => true,
            Step::Closed(at) => {
                lower(stack, at);
                true
            }
            Step::Unequal(failure) => {
                self.fail(stack, failure);
                false
            }
            Step::Descend(frame) => {
                stack.push(frame);
                true
            }
        }
    }

    /// Pops a node frame whose children all matched.
    fn close(&mut self, stack: &mut Vec<Frame<'t>>) {
        if let Some(Frame::Nodes {
            pair, depth, low, ..
        }) = stack.pop()
        {
            if low >= depth {
                self.memo.insert(pair);
            }
            self.lhs_open.pop();
            self.rhs_open.pop();
            lower(stack, low);
        }
    }

    /// Records the failure on every open frame that it does not depend on
    /// an enclosing pair for.
    fn fail(&mut self, stack: &[Frame<'t>], failure: Failure) {
        self.ambiguous = failure.ambiguous;
        if self.max_depth.is_some() {
            return;
        }
        for frame in stack {
            if let Frame::Nodes { pair, depth, .. } = frame {
                if *depth <= failure.low {
                    self.unequal.insert(*pair, failure.ambiguous);
                }
            }
        }
    }

    fn step(&mut self, lhs: Operand, rhs: Operand) -> Result<Step<'t>> {
        match (lhs, rhs) {
            (Operand::Value(a), Operand::Value(b)) => self.step_values(&a, &b),
            (Operand::Child(a), Operand::Child(b)) => Ok(match compare_children(&a, &b) {
                Comparison::DeepEqual => Step::Equal,
                Comparison::ShallowEqual => {
                    Step::Descend(Frame::Pairs(Cursor::from(child_pairs(a, b))))
                }
                Comparison::Ambiguous => Step::Unequal(Failure::AMBIGUOUS),
                Comparison::Unequal => Step::Unequal(Failure::PLAIN),
            }),
            _ => Ok(Step::Unequal(Failure::PLAIN)),
        }
    }

    fn step_values(&mut self, lhs: &Value, rhs: &Value) -> Result<Step<'t>> {
        let lhs = self.lt.resolve(lhs)?;
        let rhs = self.rt.resolve(rhs)?;
        let (x, y) = match (&lhs, &rhs) {
            (Value::Complex(x), Value::Complex(y)) => (*x, *y),
            (a, b) if a.is_primitive() && b.is_primitive() => {
                return Ok(match compare_primitives(a, b) {
                    Comparison::DeepEqual => Step::Equal,
                    Comparison::Ambiguous => Step::Unequal(Failure::AMBIGUOUS),
                    _ => Step::Unequal(Failure::PLAIN),
                });
            }
            _ => return Ok(Step::Unequal(Failure::PLAIN)),
        };
        match self.open_positions(x, y) {
            (Some(p), Some(q)) if p == q => return Ok(Step::Closed(p)),
            (Some(p), Some(q)) => return Ok(Step::Unequal(Failure::at(p.min(q)))),
            (Some(p), None) | (None, Some(p)) => return Ok(Step::Unequal(Failure::at(p))),
            (None, None) => {}
        }
        if (self.lt.ptr_eq(self.rt) && x == y) || self.memo.contains(&(x, y)) {
            return Ok(Step::Equal);
        }
        if let Some(&ambiguous) = self.unequal.get(&(x, y)) {
            return Ok(Step::Unequal(Failure {
                low: usize::MAX,
                ambiguous,
            }));
        }
        let (a, b) = (self.lt.node(x), self.rt.node(y));
        match compare_nodes(&a, &b) {
            Comparison::DeepEqual => return Ok(Step::Equal),
            Comparison::Unequal => return Ok(Step::Unequal(Failure::PLAIN)),
            Comparison::ShallowEqual => {}
            // Arguments compared against a plain list recurse; other
            // ambiguity cannot be settled here.
            Comparison::Ambiguous => {
                let promotable = matches!(
                    (&a.kind, &b.kind),
                    (Kind::Record(RecordFlavor::Arguments), Kind::Record(RecordFlavor::List))
                );
                if !promotable {
                    return Ok(Step::Unequal(Failure::AMBIGUOUS));
                }
            }
        }
        if self.max_depth.is_some_and(|max| self.lhs_open.len() >= max) {
            return Ok(Step::Unequal(Failure::AMBIGUOUS));
        }
        let depth = self.lhs_open.len();
        self.lhs_open.push(x);
        self.rhs_open.push(y);
        Ok(Step::Descend(Frame::Nodes {
            lhs: self.lt.children(x),
            rhs: self.rt.children(y),
            pair: (x, y),
            depth,
            low: usize::MAX,
        }))
    }

    /// Pulls the run of symbol-keyed properties on both sides and pairs
    /// them by key.
    fn collect_symbols(
        &mut self,
        first_lhs: Child,
        first_rhs: Child,
        lhs: &mut Children<'t>,
        rhs: &mut Children<'t>,
    ) -> Result<Step<'t>> {
        let left = collect_symbol_run(first_lhs, lhs)?;
        let right = collect_symbol_run(first_rhs, rhs)?;
        let matched = match_symbol_keys(&left, &right);
        Ok(match matched.pairs {
            Some(pairs) => {
                let pairs: Vec<(Operand, Operand)> = pairs
                    .into_iter()
                    .map(|(l, r)| (Operand::Value(l), Operand::Value(r)))
                    .collect();
                Step::Descend(Frame::Pairs(Cursor::from(pairs)))
            }
            None => Step::Unequal(Failure {
                low: usize::MAX,
                ambiguous: matched.unmatched_ambiguous,
            }),
        })
    }
}

/// Lowers the closure mark of the innermost node frame.
fn lower(stack: &mut [Frame<'_>], at: usize) {
    for frame in stack.iter_mut().rev() {
        if let Frame::Nodes { low, .. } = frame {
            *low = (*low).min(at);
            return;
        }
    }
}

/// Pulls `first` plus every directly following symbol-keyed property.
pub(crate) fn collect_symbol_run(first: Child, cursor: &mut Children<'_>) -> Result<Vec<Child>> {
    let mut run = vec![first];
    while let Some(child) = cursor.pull_if(Child::is_symbol_property)? {
        run.push(child);
    }
    Ok(run)
}

pub(crate) struct SymbolMatch {
    /// Value pairs in lhs order, or `None` if some key found no partner.
    pub pairs: Option<Vec<(Value, Value)>>,
    /// Index pairs (lhs, rhs) of matched keys.
    pub matched: Vec<(usize, usize)>,
    pub unmatched_ambiguous: bool,
}

/// Matches two runs of symbol-keyed properties by key, ignoring order.
pub(crate) fn match_symbol_keys(left: &[Child], right: &[Child]) -> SymbolMatch {
    let mut taken = vec![false; right.len()];
    let mut matched = Vec::new();
    let mut complete = left.len() == right.len();
    let mut unmatched_ambiguous = false;
    for (i, l) in left.iter().enumerate() {
        let Child::Property { key: Value::Symbol(lk), .. } = l else {
            complete = false;
            continue;
        };
        let mut found = None;
        for (j, r) in right.iter().enumerate() {
            if taken[j] {
                continue;
            }
            if let Child::Property { key: Value::Symbol(rk), .. } = r {
                match compare_symbols(lk, rk) {
                    Comparison::DeepEqual => {
                        found = Some(j);
                        break;
                    }
                    Comparison::Ambiguous => unmatched_ambiguous = true,
                    _ => {}
                }
            }
        }
        match found {
            Some(j) => {
                taken[j] = true;
                matched.push((i, j));
            }
            None => complete = false,
        }
    }
    let pairs = complete.then(|| {
        matched
            .iter()
            .filter_map(|&(i, j)| match (&left[i], &right[j]) {
                (Child::Property { value: a, .. }, Child::Property { value: b, .. }) => {
                    Some((a.clone(), b.clone()))
                }
                _ => None,
            })
            .collect()
    });
    SymbolMatch {
        pairs,
        unmatched_ambiguous: unmatched_ambiguous && !complete,
        matched,
    }
}

/// The operands a meta node recurses into once its own state matched.
pub(crate) fn child_pairs(lhs: Child, rhs: Child) -> Vec<(Operand, Operand)> {
    match (lhs, rhs) {
        (Child::Property { value: a, .. }, Child::Property { value: b, .. })
        | (Child::Item { value: a, .. }, Child::Item { value: b, .. }) => {
            vec![(Operand::Value(a), Operand::Value(b))]
        }
        (Child::Entry { key: k1, value: v1 }, Child::Entry { key: k2, value: v2 }) => vec![
            (Operand::Value(k1), Operand::Value(k2)),
            (Operand::Value(v1), Operand::Value(v2)),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode, DecodeOptions};
    use crate::describe::describe;
    use crate::host::{Host, HostRef, HostSymbol};
    use serde_json::json;

    fn tree(v: serde_json::Value) -> Tree {
        describe(&Host::from(&v))
    }

    fn equal(a: &Tree, b: &Tree) -> bool {
        compare_trees(a, b).unwrap()
    }

    #[test]
    fn equal_json_documents() {
        let doc = json!({"a": [1, 2, {"b": null}], "c": "x"});
        assert!(equal(&tree(doc.clone()), &tree(doc)));
    }

    #[test]
    fn detects_changed_leaf() {
        assert!(!equal(&tree(json!({"a": [1, 2]})), &tree(json!({"a": [1, 3]}))));
    }

    #[test]
    fn detects_length_mismatch() {
        assert!(!equal(&tree(json!([1, 2])), &tree(json!([1, 2, 3]))));
    }

    #[test]
    fn detects_extra_property() {
        assert!(!equal(&tree(json!({"a": 1})), &tree(json!({"a": 1, "b": 2}))));
    }

    #[test]
    fn nan_equals_nan_but_zero_signs_differ() {
        let nan = |n: f64| describe(&Host::Number(n));
        assert!(equal(&nan(f64::NAN), &nan(f64::NAN)));
        assert!(!equal(&nan(0.0), &nan(-0.0)));
    }

    #[test]
    fn same_tree_same_node_is_deep_equal() {
        let t = tree(json!({"a": 1}));
        assert_eq!(
            compare(&t, &Value::Complex(0), &t, &Value::Complex(0)).unwrap(),
            Comparison::DeepEqual
        );
    }

    #[test]
    fn consistent_cycles_are_equal() {
        let a = HostRef::object();
        a.set("self", a.clone());
        let b = HostRef::object();
        b.set("self", b.clone());
        assert!(equal(&describe(&a.into()), &describe(&b.into())));
    }

    #[test]
    fn one_sided_cycle_is_unequal() {
        let a = HostRef::object();
        a.set("next", a.clone());
        let inner = HostRef::object();
        let b = HostRef::object();
        b.set("next", inner.clone());
        inner.set("next", inner.clone());
        // a.next = a; b.next = inner, inner.next = inner: same shape at every
        // depth but the cycles close at different ancestors.
        assert!(!equal(&describe(&a.into()), &describe(&b.into())));
    }

    #[test]
    fn symbol_keys_match_in_any_order() {
        let s1 = HostSymbol::new(Some("s1"));
        let s2 = HostSymbol::new(Some("s2"));
        let a = HostRef::object();
        a.set(s1.clone(), 1.0).set(s2.clone(), 2.0);
        let b = HostRef::object();
        b.set(s2.clone(), 2.0).set(s1.clone(), 1.0);
        assert!(equal(&describe(&a.into()), &describe(&b.into())));

        let c = HostRef::object();
        c.set(s2, 1.0).set(s1, 2.0);
        let a2 = HostRef::object();
        a2.set(HostSymbol::new(Some("x")), 1.0);
        assert!(!equal(&describe(&c.into()), &describe(&a2.into())));
    }

    #[test]
    fn arguments_compare_against_lists_one_way() {
        let args = describe(&HostRef::arguments(vec![Host::from(1.0)]).into());
        let list = describe(&HostRef::array(vec![Host::from(1.0)]).into());
        assert!(equal(&args, &list));
        assert!(!equal(&list, &args));
    }

    #[test]
    fn functions_compare_by_identity() {
        let f = HostRef::function("f");
        let g = HostRef::function("f");
        assert!(equal(&describe(&f.clone().into()), &describe(&f.into())));
        assert!(!equal(
            &describe(&HostRef::promise().into()),
            &describe(&HostRef::promise().into())
        ));
        assert!(!equal(&describe(&g.into()), &describe(&HostRef::function("f").into())));
    }

    #[test]
    fn registered_symbols_compare_by_key() {
        let a = describe(&HostSymbol::registered("k").into());
        let b = describe(&HostSymbol::registered("k").into());
        assert!(equal(&a, &b));
        let c = describe(&HostSymbol::new(Some("k")).into());
        let d = describe(&HostSymbol::new(Some("k")).into());
        assert!(!equal(&c, &d));
    }

    #[test]
    fn shared_subtrees_compare_against_copies() {
        let shared = HostRef::array(vec![Host::from(1.0)]);
        let a = HostRef::array(vec![shared.clone().into(), shared.into()]);
        let b = tree(json!([[1], [1]]));
        assert!(equal(&describe(&a.into()), &b));
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let mut host = Host::Null;
        for _ in 0..5_000 {
            host = HostRef::array(vec![host]).into();
        }
        let a = describe(&host);
        let b = describe(&host);
        assert!(equal(&a, &b));
    }

    #[test]
    fn dates_and_patterns() {
        assert!(equal(
            &describe(&HostRef::date(5.0).into()),
            &describe(&HostRef::date(5.0).into())
        ));
        assert!(!equal(
            &describe(&HostRef::date(5.0).into()),
            &describe(&HostRef::invalid_date().into())
        ));
        assert!(equal(
            &describe(&HostRef::regexp("a", "gi").into()),
            &describe(&HostRef::regexp("a", "ig").into())
        ));
    }

    fn through_codec(tree: &Tree) -> Tree {
        decode(&encode(tree).unwrap(), &DecodeOptions::default()).unwrap()
    }

    #[test]
    fn decoded_function_is_ambiguous_against_live_one() {
        let live = describe(&HostRef::function("f").into());
        let decoded = through_codec(&live);
        assert_eq!(compare_trees_verdict(&decoded, &live).unwrap(), Verdict::Ambiguous);
        assert!(!compare_trees(&decoded, &live).unwrap());
    }

    #[test]
    fn decoded_symbol_key_is_ambiguous() {
        let obj = HostRef::object();
        obj.set(HostSymbol::new(Some("s")), 1.0);
        let live = describe(&obj.into());
        let decoded = through_codec(&live);
        assert_eq!(compare_trees_verdict(&decoded, &live).unwrap(), Verdict::Ambiguous);
    }

    #[test]
    fn real_mismatch_is_unequal() {
        let verdict = compare_trees_verdict(&tree(json!({"a": 1})), &tree(json!({"a": 2})));
        assert_eq!(verdict.unwrap(), Verdict::Unequal);
        // A plain mismatch next to an unconfirmable leaf still decides.
        let f = HostRef::function("f");
        let live = HostRef::array(vec![Host::from(1.0), f.into()]);
        let other = HostRef::array(vec![Host::from(2.0), HostRef::function("f").into()]);
        let verdict = compare_trees_verdict(&describe(&live.into()), &describe(&other.into()));
        assert_eq!(verdict.unwrap(), Verdict::Unequal);
    }

    #[test]
    fn depth_limit_leaves_deeper_pairs_unconfirmed() {
        let a = tree(json!({"a": {"b": 1}, "c": 1}));
        let b = tree(json!({"a": {"b": 1}, "c": 1}));
        let limit = |max_depth| CompareOptions {
            max_depth: Some(max_depth),
        };
        assert_eq!(compare_trees_with(&a, &b, &limit(0)).unwrap(), Verdict::Ambiguous);
        assert_eq!(compare_trees_with(&a, &b, &limit(1)).unwrap(), Verdict::Ambiguous);
        assert_eq!(compare_trees_with(&a, &b, &limit(2)).unwrap(), Verdict::Equal);
        let c = tree(json!({"a": {"b": 1}, "c": 2}));
        assert_eq!(compare_trees_with(&c, &b, &limit(1)).unwrap(), Verdict::Ambiguous);
        let d = tree(json!({"c": 2}));
        let e = tree(json!({"c": 1}));
        assert_eq!(compare_trees_with(&d, &e, &limit(1)).unwrap(), Verdict::Unequal);
    }

    /// `R = {a: A, c: C}`, `A = {c: C, v}` and `C = {back: A}`.
    fn crossed_cycles(v: f64) -> Tree {
        let a = HostRef::object();
        let c = HostRef::object();
        c.set("back", a.clone());
        a.set("c", c.clone()).set("v", v);
        let root = HostRef::object();
        root.set("a", a).set("c", c);
        describe(&root.into())
    }

    fn property_node(tree: &Tree, node: NodeId, index: usize) -> NodeId {
        let mut children = tree.children(node);
        let mut found = None;
        for _ in 0..=index {
            found = children.pull().unwrap();
        }
        let Some(Child::Property { value, .. }) = found else {
            panic!("expected a property");
        };
        tree.complex(&value).unwrap().unwrap().0
    }

    #[test]
    fn reused_walker_keeps_context_bound_equality_out_of_the_memo() {
        let (lt, rt) = (crossed_cycles(1.0), crossed_cycles(2.0));
        let mut walker = Walker::new(&lt, &rt);
        let roots = (Operand::Value(lt.root().clone()), Operand::Value(rt.root().clone()));
        assert!(!walker.walk(roots.0, roots.1).unwrap());
        // `C` matched `C'` only while `A` and `A'` were assumed equal.
        let (c, d) = (property_node(&lt, 0, 1), property_node(&rt, 0, 1));
        let again = walker
            .walk(Operand::Value(Value::Complex(c)), Operand::Value(Value::Complex(d)))
            .unwrap();
        assert!(!again);
        assert!(walker.lhs_open.is_empty() && walker.rhs_open.is_empty());
    }
}
