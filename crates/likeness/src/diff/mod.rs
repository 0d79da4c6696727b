//! Structural diff between an actual and an expected tree.
//!
//! The differ walks both trees in lockstep. Equal subtrees print once as
//! unchanged lines; complex values of the same shape are opened and their
//! children aligned with [`rebalance`]; everything else prints as a removed
//! (actual-only) and an added (expected-only) rendering.

mod rebalance;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compare::{
    collect_symbol_run, compare_nodes, match_symbol_keys, Operand, Walker,
};
use crate::error::{Error, Result};
use crate::format::{brackets, descriptor, render, Affix, Line};
use crate::value::{Child, Children, Comparison, Kind, NodeId, RecordFlavor, Tree, Value};
use rebalance::{realign, Align};

// ── Public API ──────────────────────────────────────────────────────────────

/// A custom classifier's decision for one pair of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Settled. Only [`Comparison::DeepEqual`] and [`Comparison::Unequal`]
    /// are accepted.
    Resolved(Comparison),
    /// Treat the expected value as inserted before the actual one.
    ExpectedMissing,
    /// Treat the actual value as having no counterpart.
    ActualExtraneous,
    /// Treat the pair as a change in place.
    Substitute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTag {
    Same,
    ActualOnly,
    ExpectedOnly,
    /// One line that differs; `expected` holds the other side.
    Changed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub tag: LineTag,
    pub depth: usize,
    pub text: String,
    pub expected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Complex values nested deeper than this are not opened.
    pub max_depth: Option<usize>,
    /// Spaces per depth level in [`diff_text`].
    pub indent: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            indent: 2,
        }
    }
}

/// Diffs `actual` against `expected`.
pub fn diff(actual: &Tree, expected: &Tree, options: &DiffOptions) -> Result<Vec<DiffLine>> {
    let mut differ = Differ {
        lt: actual,
        rt: expected,
        walker: Walker::new(actual, expected),
        max_depth: options.max_depth,
        lines: Vec::new(),
    };
    differ.run()?;
    debug!(lines = differ.lines.len(), "diffed trees");
    Ok(differ.lines)
}

/// [`diff`] rendered with [`render_diff`].
pub fn diff_text(actual: &Tree, expected: &Tree, options: &DiffOptions) -> Result<String> {
    Ok(render_diff(&diff(actual, expected, options)?, options.indent))
}

/// Prints lines with a `-` (actual) or `+` (expected) marker.
pub fn render_diff(lines: &[DiffLine], indent: usize) -> String {
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let pad = " ".repeat(line.depth * indent);
        match line.tag {
            LineTag::Same => out.push(format!("  {pad}{}", line.text)),
            LineTag::ActualOnly => out.push(format!("- {pad}{}", line.text)),
            LineTag::ExpectedOnly => out.push(format!("+ {pad}{}", line.text)),
            LineTag::Changed => {
                out.push(format!("- {pad}{}", line.text));
                out.push(format!("+ {pad}{}", line.expected.as_deref().unwrap_or_default()));
            }
        }
    }
    out.join("\n")
}

// ── Walk ────────────────────────────────────────────────────────────────────

enum Work<'t> {
    Pair {
        lhs: Value,
        rhs: Value,
        lhs_affix: Affix,
        rhs_affix: Affix,
        depth: usize,
    },
    Children {
        lhs: Children<'t>,
        rhs: Children<'t>,
        depth: usize,
        lhs_close: String,
        rhs_close: String,
    },
    Emit(Vec<DiffLine>),
}

struct Differ<'t> {
    lt: &'t Tree,
    rt: &'t Tree,
    /// Carries the open ancestor stacks of the current path.
    walker: Walker<'t>,
    max_depth: Option<usize>,
    lines: Vec<DiffLine>,
}

impl<'t> Differ<'t> {
    fn run(&mut self) -> Result<()> {
        let mut work = vec![Work::Pair {
            lhs: self.lt.root().clone(),
            rhs: self.rt.root().clone(),
            lhs_affix: Affix::default(),
            rhs_affix: Affix::default(),
            depth: 0,
        }];
        while let Some(item) = work.pop() {
            match item {
                Work::Pair {
                    lhs,
                    rhs,
                    lhs_affix,
                    rhs_affix,
                    depth,
                } => self.pair(&mut work, lhs, rhs, lhs_affix, rhs_affix, depth)?,
                Work::Children {
                    lhs,
                    rhs,
                    depth,
                    lhs_close,
                    rhs_close,
                } => self.children(&mut work, lhs, rhs, depth, lhs_close, rhs_close)?,
                Work::Emit(lines) => self.lines.extend(lines),
            }
        }
        Ok(())
    }

    fn pair(
        &mut self,
        work: &mut Vec<Work<'t>>,
        lhs: Value,
        rhs: Value,
        lhs_affix: Affix,
        rhs_affix: Affix,
        depth: usize,
    ) -> Result<()> {
        match self.custom_instruction(&lhs, &rhs)?.map(Align::from) {
            Some(Align::Same) => return self.emit_same_value(&lhs, lhs_affix, depth),
            Some(Align::Changed | Align::ExpectedMissing | Align::ActualExtraneous) => {
                return self.emit_changed(&lhs, &rhs, lhs_affix, rhs_affix, depth);
            }
            Some(Align::Substitute) | None => {}
        }
        if self
            .walker
            .walk(Operand::Value(lhs.clone()), Operand::Value(rhs.clone()))?
        {
            return self.emit_same_value(&lhs, lhs_affix, depth);
        }
        let Some((lid, rid)) = self.openable(&lhs, &rhs, depth)? else {
            return self.emit_changed(&lhs, &rhs, lhs_affix, rhs_affix, depth);
        };
        let (lnode, rnode) = (self.lt.node(lid), self.rt.node(rid));
        let (lopen, lclose) = brackets(&lnode);
        let (ropen, rclose) = brackets(&rnode);
        let lhead = format!("{}{} {lopen}", lhs_affix.prefix, descriptor(&lnode));
        let rhead = format!("{}{} {ropen}", rhs_affix.prefix, descriptor(&rnode));
        self.push_line(depth, lhead, rhead);
        self.walker.lhs_open.push(lid);
        self.walker.rhs_open.push(rid);
        work.push(Work::Children {
            lhs: self.lt.children(lid),
            rhs: self.rt.children(rid),
            depth: depth + 1,
            lhs_close: format!("{lclose}{}", lhs_affix.suffix),
            rhs_close: format!("{rclose}{}", rhs_affix.suffix),
        });
        Ok(())
    }

    fn children(
        &mut self,
        work: &mut Vec<Work<'t>>,
        mut lhs: Children<'t>,
        mut rhs: Children<'t>,
        depth: usize,
        lhs_close: String,
        rhs_close: String,
    ) -> Result<()> {
        let (a, b) = match (lhs.pull()?, rhs.pull()?) {
            (None, None) => {
                self.walker.lhs_open.pop();
                self.walker.rhs_open.pop();
                self.push_line(depth - 1, lhs_close, rhs_close);
                return Ok(());
            }
            (a, b) => (a, b),
        };
        let mut next: Vec<Work<'t>> = Vec::new();
        match (a, b) {
            (Some(Child::Boundary { .. }), Some(Child::Boundary { .. })) => {}
            (Some(a), None) => self.emit_child(LineTag::ActualOnly, &a, depth)?,
            (None, Some(b)) => self.emit_child(LineTag::ExpectedOnly, &b, depth)?,
            (Some(a @ Child::Boundary { .. }), Some(b)) => {
                self.emit_child(LineTag::ExpectedOnly, &b, depth)?;
                lhs.unshift(a);
            }
            (Some(a), Some(b @ Child::Boundary { .. })) => {
                self.emit_child(LineTag::ActualOnly, &a, depth)?;
                rhs.unshift(b);
            }
            (Some(a), Some(b)) if a.is_symbol_property() && b.is_symbol_property() => {
                next = self.symbol_run(a, b, &mut lhs, &mut rhs, depth)?;
            }
            (Some(a), Some(b)) => match self.align(&a, &b, &lhs, &rhs)? {
                Align::Same => self.emit_child(LineTag::Same, &a, depth)?,
                Align::ExpectedMissing => {
                    self.emit_child(LineTag::ExpectedOnly, &b, depth)?;
                    lhs.unshift(a);
                }
                Align::ActualExtraneous => {
                    self.emit_child(LineTag::ActualOnly, &a, depth)?;
                    rhs.unshift(b);
                }
                Align::Changed => {
                    let lines = self.changed_lines(&a, &b, depth)?;
                    self.lines.extend(lines);
                }
                Align::Substitute => next = self.substitute(a, b, depth)?,
            },
            (None, None) => {}
        }
        work.push(Work::Children {
            lhs,
            rhs,
            depth,
            lhs_close,
            rhs_close,
        });
        work.extend(next.into_iter().rev());
        Ok(())
    }

    fn align(
        &mut self,
        a: &Child,
        b: &Child,
        lhs_rest: &Children<'t>,
        rhs_rest: &Children<'t>,
    ) -> Result<Align> {
        if let (Some(x), Some(y)) = (child_value(a), child_value(b)) {
            if let Some(instruction) = self.custom_instruction(x, y)? {
                return Ok(Align::from(instruction));
            }
        }
        let equal = match (a, b) {
            (Child::Item { value: x, .. }, Child::Item { value: y, .. }) => self
                .walker
                .walk(Operand::Value(x.clone()), Operand::Value(y.clone()))?,
            _ => self
                .walker
                .walk(Operand::Child(a.clone()), Operand::Child(b.clone()))?,
        };
        if equal {
            return Ok(Align::Same);
        }
        realign(&mut self.walker, self.lt, self.rt, a, b, lhs_rest, rhs_rest)
    }

    /// Work for a pair that changed in place.
    fn substitute(&mut self, a: Child, b: Child, depth: usize) -> Result<Vec<Work<'t>>> {
        let lhs_affix = Affix::for_child(&a);
        let rhs_affix = Affix::for_child(&b);
        let mut next = Vec::new();
        let (lhs, rhs) = match (a, b) {
            (Child::Entry { key, value: x }, Child::Entry { value: y, .. }) => {
                if !key.is_primitive() {
                    let lines = render(
                        self.lt,
                        &key,
                        Affix::new("", " =>"),
                        depth,
                        self.max_depth,
                        &self.walker.lhs_open,
                    )?;
                    next.push(Work::Emit(tagged(LineTag::Same, lines)));
                }
                (x, y)
            }
            (Child::Property { value: x, .. }, Child::Property { value: y, .. })
            | (Child::Item { value: x, .. }, Child::Item { value: y, .. }) => (x, y),
            (a, b) => {
                let lines = self.changed_lines(&a, &b, depth)?;
                return Ok(vec![Work::Emit(lines)]);
            }
        };
        next.push(Work::Pair {
            lhs,
            rhs,
            lhs_affix,
            rhs_affix,
            depth,
        });
        Ok(next)
    }

    /// Pairs a run of symbol-keyed properties by key, in any order.
    fn symbol_run(
        &mut self,
        a: Child,
        b: Child,
        lhs: &mut Children<'t>,
        rhs: &mut Children<'t>,
        depth: usize,
    ) -> Result<Vec<Work<'t>>> {
        let left = collect_symbol_run(a, lhs)?;
        let right = collect_symbol_run(b, rhs)?;
        let matched = match_symbol_keys(&left, &right).matched;
        let taken: HashSet<usize> = matched.iter().map(|&(_, j)| j).collect();
        let mut next = Vec::new();
        for (i, l) in left.iter().enumerate() {
            match matched.iter().find(|&&(li, _)| li == i) {
                Some(&(_, j)) => next.extend(self.substitute(l.clone(), right[j].clone(), depth)?),
                None => {
                    let lines = self.child_lines(self.lt, l, depth, false)?;
                    next.push(Work::Emit(tagged(LineTag::ActualOnly, lines)));
                }
            }
        }
        for (j, r) in right.iter().enumerate() {
            if !taken.contains(&j) {
                let lines = self.child_lines(self.rt, r, depth, true)?;
                next.push(Work::Emit(tagged(LineTag::ExpectedOnly, lines)));
            }
        }
        Ok(next)
    }

    /// Both sides as complex nodes that may be opened side by side.
    fn openable(&self, lhs: &Value, rhs: &Value, depth: usize) -> Result<Option<(NodeId, NodeId)>> {
        if self.max_depth.is_some_and(|max| depth >= max) {
            return Ok(None);
        }
        let (Some((lid, lnode)), Some((rid, rnode))) = (self.lt.complex(lhs)?, self.rt.complex(rhs)?)
        else {
            return Ok(None);
        };
        if self.walker.open_positions(lid, rid) != (None, None) {
            return Ok(None);
        }
        let open = match compare_nodes(&lnode, &rnode) {
            Comparison::ShallowEqual => true,
            Comparison::Ambiguous => matches!(
                (&lnode.kind, &rnode.kind),
                (Kind::Record(RecordFlavor::Arguments), Kind::Record(RecordFlavor::List))
            ),
            Comparison::DeepEqual | Comparison::Unequal => false,
        };
        Ok(open.then_some((lid, rid)))
    }

    fn custom_instruction(&self, lhs: &Value, rhs: &Value) -> Result<Option<Instruction>> {
        let (Some((_, lnode)), Some((_, rnode))) = (self.lt.complex(lhs)?, self.rt.complex(rhs)?)
        else {
            return Ok(None);
        };
        let Some(classifier) = lnode.classifier.and_then(|i| self.lt.classifier(i)) else {
            return Ok(None);
        };
        match classifier.prepare_diff(&lnode, &rnode) {
            Some(Instruction::Resolved(c))
                if !matches!(c, Comparison::DeepEqual | Comparison::Unequal) =>
            {
                Err(Error::IllegalDiffInstruction(format!(
                    "resolved comparison must be DeepEqual or Unequal, got {c:?}"
                )))
            }
            other => Ok(other),
        }
    }

    // ── Emission ──

    fn push_line(&mut self, depth: usize, text: String, expected: String) {
        let line = if text == expected {
            DiffLine {
                tag: LineTag::Same,
                depth,
                text,
                expected: None,
            }
        } else {
            DiffLine {
                tag: LineTag::Changed,
                depth,
                text,
                expected: Some(expected),
            }
        };
        self.lines.push(line);
    }

    fn emit_same_value(&mut self, value: &Value, affix: Affix, depth: usize) -> Result<()> {
        let lines = render(self.lt, value, affix, depth, self.max_depth, &self.walker.lhs_open)?;
        self.lines.extend(tagged(LineTag::Same, lines));
        Ok(())
    }

    fn emit_changed(
        &mut self,
        lhs: &Value,
        rhs: &Value,
        lhs_affix: Affix,
        rhs_affix: Affix,
        depth: usize,
    ) -> Result<()> {
        let actual = render(self.lt, lhs, lhs_affix, depth, self.max_depth, &self.walker.lhs_open)?;
        let expected = render(self.rt, rhs, rhs_affix, depth, self.max_depth, &self.walker.rhs_open)?;
        self.lines.extend(changed(actual, expected));
        Ok(())
    }

    fn emit_child(&mut self, tag: LineTag, child: &Child, depth: usize) -> Result<()> {
        let expected_side = tag == LineTag::ExpectedOnly;
        let tree = if expected_side { self.rt } else { self.lt };
        let lines = self.child_lines(tree, child, depth, expected_side)?;
        self.lines.extend(tagged(tag, lines));
        Ok(())
    }

    fn changed_lines(&self, a: &Child, b: &Child, depth: usize) -> Result<Vec<DiffLine>> {
        let actual = self.child_lines(self.lt, a, depth, false)?;
        let expected = self.child_lines(self.rt, b, depth, true)?;
        Ok(changed(actual, expected))
    }

    /// Renders a child of `tree` with the open stack of its side.
    fn child_lines(&self, tree: &Tree, child: &Child, depth: usize, expected_side: bool) -> Result<Vec<Line>> {
        let open = if expected_side {
            &self.walker.rhs_open
        } else {
            &self.walker.lhs_open
        };
        match child {
            Child::Boundary { .. } => Ok(Vec::new()),
            Child::Entry { key, value } if !key.is_primitive() => {
                let mut lines = render(tree, key, Affix::new("", " =>"), depth, self.max_depth, open)?;
                lines.extend(render(tree, value, Affix::new("", ","), depth, self.max_depth, open)?);
                Ok(lines)
            }
            Child::Property { value, .. } | Child::Item { value, .. } | Child::Entry { value, .. } => {
                render(tree, value, Affix::for_child(child), depth, self.max_depth, open)
            }
        }
    }
}

fn child_value(child: &Child) -> Option<&Value> {
    match child {
        Child::Property { value, .. } | Child::Item { value, .. } | Child::Entry { value, .. } => {
            Some(value)
        }
        Child::Boundary { .. } => None,
    }
}

fn tagged(tag: LineTag, lines: Vec<Line>) -> Vec<DiffLine> {
    lines
        .into_iter()
        .map(|line| DiffLine {
            tag,
            depth: line.depth,
            text: line.text,
            expected: None,
        })
        .collect()
}

/// One changed line when both sides fit on a line, else two blocks.
///
/// Circular markers that read the same but point at different ancestors
/// are spelled out with the ancestor's depth.
fn changed(actual: Vec<Line>, expected: Vec<Line>) -> Vec<DiffLine> {
    match (actual.as_slice(), expected.as_slice()) {
        ([a], [e]) if a.depth == e.depth => {
            let (text, other) = if a.text == e.text && a.circular != e.circular {
                (a.with_ancestor(), e.with_ancestor())
            } else {
                (a.text.clone(), e.text.clone())
            };
            vec![DiffLine {
                tag: LineTag::Changed,
                depth: a.depth,
                text,
                expected: Some(other),
            }]
        }
        _ => {
            let mut lines = tagged(LineTag::ActualOnly, actual);
            lines.extend(tagged(LineTag::ExpectedOnly, expected));
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{describe, describe_with, Classifier, DescribeOptions};
    use crate::host::{Host, HostObject, HostRef};
    use crate::value::{Node, Variant};
    use serde_json::json;

    fn tree(v: serde_json::Value) -> Tree {
        describe(&Host::from(&v))
    }

    fn text(actual: serde_json::Value, expected: serde_json::Value) -> String {
        diff_text(&tree(actual), &tree(expected), &DiffOptions::default()).unwrap()
    }

    #[test]
    fn equal_values_print_unchanged() {
        assert_eq!(text(json!(1), json!(1)), "  1");
        let lines = diff(&tree(json!([1])), &tree(json!([1])), &DiffOptions::default()).unwrap();
        assert!(lines.iter().all(|l| l.tag == LineTag::Same));
    }

    #[test]
    fn changed_primitive_root() {
        assert_eq!(text(json!(1), json!(2)), "- 1\n+ 2");
    }

    #[test]
    fn changed_property_value() {
        assert_eq!(
            text(json!({"a": 1, "b": 2}), json!({"a": 1, "b": 3})),
            "  Object {\n    a: 1,\n-   b: 2,\n+   b: 3,\n  }"
        );
    }

    #[test]
    fn missing_and_extra_properties() {
        assert_eq!(
            text(json!({"a": 1, "c": 3}), json!({"b": 2, "c": 3})),
            "  Object {\n-   a: 1,\n+   b: 2,\n    c: 3,\n  }"
        );
    }

    #[test]
    fn nested_changes_recurse() {
        assert_eq!(
            text(json!({"a": {"b": 1}}), json!({"a": {"b": 2}})),
            "  Object {\n    a: Object {\n-     b: 1,\n+     b: 2,\n    },\n  }"
        );
    }

    #[test]
    fn substituted_list_item_realigns() {
        assert_eq!(
            text(json!([1, 2, 4]), json!([1, 3, 4])),
            "  Array [\n    1,\n-   2,\n+   3,\n    4,\n  ]"
        );
    }

    #[test]
    fn inserted_list_item() {
        assert_eq!(
            text(json!([1, 3]), json!([1, 2, 3])),
            "  Array [\n    1,\n+   2,\n    3,\n  ]"
        );
    }

    #[test]
    fn signed_zero_shows_as_change() {
        let lines = diff(
            &describe(&Host::from(0.0)),
            &describe(&Host::from(-0.0)),
            &DiffOptions::default(),
        )
        .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].tag, LineTag::Changed);
        assert_eq!(lines[0].expected.as_deref(), Some("-0"));
    }

    #[test]
    fn mismatched_types_print_blocks() {
        assert_eq!(
            text(json!({"a": [1]}), json!({"a": 1})),
            "  Object {\n-   a: Array [\n-     1,\n-   ],\n+   a: 1,\n  }"
        );
    }

    #[test]
    fn map_size_mismatch_still_diffs_content() {
        let a = HostRef::map(vec![(Host::from("x"), Host::from(1.0))]);
        let b = HostRef::map(vec![
            (Host::from("x"), Host::from(1.0)),
            (Host::from("y"), Host::from(2.0)),
        ]);
        let out = render_diff(
            &diff(&describe(&a.into()), &describe(&b.into()), &DiffOptions::default()).unwrap(),
            2,
        );
        assert_eq!(out, "  Map {\n    'x' => 1,\n+   'y' => 2,\n  }");
    }

    #[test]
    fn circular_values_diff_without_looping() {
        let a = HostRef::object();
        a.set("self", a.clone()).set("v", 1.0);
        let b = HostRef::object();
        b.set("self", b.clone()).set("v", 2.0);
        let out = render_diff(
            &diff(&describe(&a.into()), &describe(&b.into()), &DiffOptions::default()).unwrap(),
            2,
        );
        assert_eq!(out, "  Object {\n    self: [Circular],\n-   v: 1,\n+   v: 2,\n  }");
    }

    #[test]
    fn depth_limit_stops_opening() {
        let options = DiffOptions {
            max_depth: Some(1),
            ..DiffOptions::default()
        };
        let out = diff_text(
            &tree(json!({"a": {"b": 1}})),
            &tree(json!({"a": {"b": 2}})),
            &options,
        )
        .unwrap();
        assert_eq!(out, "  Object {\n-   a: Object {…},\n+   a: Object {…},\n  }");
    }

    #[test]
    fn circular_markers_at_different_ancestors_show_their_depth() {
        // a = {x: {y: a}}; b = {x: c}, c = {y: c}.
        let a = HostRef::object();
        let ax = HostRef::object();
        ax.set("y", a.clone());
        a.set("x", ax);
        let b = HostRef::object();
        let c = HostRef::object();
        c.set("y", c.clone());
        b.set("x", c);
        let out = render_diff(
            &diff(&describe(&a.into()), &describe(&b.into()), &DiffOptions::default()).unwrap(),
            2,
        );
        assert_eq!(
            out,
            "  Object {\n    x: Object {\n-     y: [Circular *0],\n+     y: [Circular *1],\n    },\n  }"
        );
    }

    struct Strict(Instruction);

    impl Classifier for Strict {
        fn classify(&self, _: &HostObject, tag: &str, _: Option<&str>) -> Option<Variant> {
            (tag == "Vec").then_some(Variant::Record)
        }

        fn prepare_diff(&self, _: &Node, _: &Node) -> Option<Instruction> {
            Some(self.0)
        }
    }

    fn vec_host(v: f64) -> Host {
        let r = HostRef::new(HostObject::new("Vec", None, crate::host::Internal::None));
        r.set("x", v);
        r.into()
    }

    #[test]
    fn custom_instruction_resolves_pairs() {
        let options = DescribeOptions::default().with_classifier(Strict(Instruction::Resolved(
            Comparison::DeepEqual,
        )));
        let a = describe_with(&vec_host(1.0), &options);
        let b = describe_with(&vec_host(2.0), &options);
        let lines = diff(&a, &b, &DiffOptions::default()).unwrap();
        assert!(lines.iter().all(|l| l.tag == LineTag::Same));
    }

    #[test]
    fn illegal_instruction_is_an_error() {
        let options = DescribeOptions::default().with_classifier(Strict(Instruction::Resolved(
            Comparison::ShallowEqual,
        )));
        let a = describe_with(&vec_host(1.0), &options);
        let b = describe_with(&vec_host(2.0), &options);
        assert!(matches!(
            diff(&a, &b, &DiffOptions::default()),
            Err(Error::IllegalDiffInstruction(_))
        ));
    }
}
