//! Plain, deterministic text rendering of value trees.
//!
//! Output is line based: a complex value opens with a header such as
//! `Object {`, lists its children one per line at the next depth and closes
//! with the matching bracket. Values already open on the current path render
//! as `[Circular]`; values below the depth limit collapse to `Object {…}`.

use serde::Deserialize;

use crate::cursor::Cursor;
use crate::error::Result;
use crate::value::{Child, ChildSource, Kind, Node, OpenStack, RecordFlavor, Symbol, Tree, Value};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Complex values nested deeper than this collapse to one line.
    pub max_depth: Option<usize>,
    /// Spaces per depth level.
    pub indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            indent: 2,
        }
    }
}

/// Renders the whole tree.
pub fn format(tree: &Tree, options: &FormatOptions) -> Result<String> {
    let open = OpenStack::default();
    let lines = render(tree, tree.root(), Affix::default(), 0, options.max_depth, &open)?;
    Ok(join_lines(&lines, options.indent))
}

const CIRCULAR: &str = "[Circular";

/// One rendered line and its nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub depth: usize,
    pub text: String,
    /// Open-stack position of the ancestor a `[Circular]` line points at,
    /// and the byte offset of the marker.
    pub circular: Option<(usize, usize)>,
}

impl Line {
    pub fn new(depth: usize, text: impl Into<String>) -> Self {
        Self {
            depth,
            text: text.into(),
            circular: None,
        }
    }

    /// The text with a `[Circular]` marker spelled `[Circular *N]`, where
    /// `N` is the depth of the ancestor it points at.
    pub fn with_ancestor(&self) -> String {
        match self.circular {
            Some((ancestor, at)) => {
                let split = at + CIRCULAR.len();
                format!("{} *{ancestor}{}", &self.text[..split], &self.text[split..])
            }
            None => self.text.clone(),
        }
    }
}

/// Text placed around a rendered value, e.g. `key: ` and `,`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Affix {
    pub prefix: String,
    pub suffix: String,
}

impl Affix {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn wrap(&self, text: &str) -> String {
        format!("{}{text}{}", self.prefix, self.suffix)
    }

    /// The affix a meta node's value is rendered with.
    pub fn for_child(child: &Child) -> Self {
        match child {
            Child::Property { key, .. } => Affix::new(format!("{}: ", key_text(key)), ","),
            Child::Entry { key, .. } if key.is_primitive() => {
                Affix::new(format!("{} => ", primitive_text(key)), ",")
            }
            _ => Affix::new("", ","),
        }
    }
}

pub(crate) fn join_lines(lines: &[Line], indent: usize) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&" ".repeat(line.depth * indent));
        out.push_str(&line.text);
    }
    out
}

enum Work<'t> {
    Value {
        value: Value,
        affix: Affix,
        depth: usize,
    },
    Children {
        cursor: Cursor<ChildSource<'t>>,
        depth: usize,
        close: String,
    },
}

/// Renders `value` starting at `depth`. Nodes in `outer` count as ancestors.
pub(crate) fn render(
    tree: &Tree,
    value: &Value,
    affix: Affix,
    depth: usize,
    max_depth: Option<usize>,
    outer: &OpenStack,
) -> Result<Vec<Line>> {
    let mut lines = Vec::new();
    let mut open = OpenStack::default();
    let mut work = vec![Work::Value {
        value: value.clone(),
        affix,
        depth,
    }];
    while let Some(item) = work.pop() {
        match item {
            Work::Value {
                value,
                affix,
                depth,
            } => {
                let id = match tree.resolve(&value)? {
                    Value::Complex(id) => id,
                    primitive => {
                        let text = primitive_text(&primitive);
                        lines.push(Line::new(depth, affix.wrap(&text)));
                        continue;
                    }
                };
                let node = tree.node(id);
                let ancestor = outer
                    .position(id)
                    .or_else(|| open.position(id).map(|p| outer.len() + p));
                if let Some(ancestor) = ancestor {
                    lines.push(Line {
                        depth,
                        text: affix.wrap(&format!("{CIRCULAR}]")),
                        circular: Some((ancestor, affix.prefix.len())),
                    });
                    continue;
                }
                let (open_bracket, close_bracket) = brackets(&node);
                let head = descriptor(&node);
                if max_depth.is_some_and(|max| depth >= max) {
                    let text = if collection(&node) {
                        format!("{head} {open_bracket}…{close_bracket}")
                    } else {
                        head
                    };
                    lines.push(Line::new(depth, affix.wrap(&text)));
                    continue;
                }
                let mut cursor = tree.children(id);
                let Some(first) = next_visible(&mut cursor)? else {
                    let text = if collection(&node) {
                        format!("{head} {open_bracket}{close_bracket}")
                    } else {
                        head
                    };
                    lines.push(Line::new(depth, affix.wrap(&text)));
                    continue;
                };
                cursor.unshift(first);
                lines.push(Line::new(depth, format!("{}{head} {open_bracket}", affix.prefix)));
                open.push(id);
                work.push(Work::Children {
                    cursor,
                    depth: depth + 1,
                    close: format!("{close_bracket}{}", affix.suffix),
                });
            }
            Work::Children {
                mut cursor,
                depth,
                close,
            } => match next_visible(&mut cursor)? {
                Some(child) => {
                    work.push(Work::Children {
                        cursor,
                        depth,
                        close,
                    });
                    for entry in child_work(child, depth).into_iter().rev() {
                        work.push(entry);
                    }
                }
                None => {
                    open.pop();
                    lines.push(Line::new(depth - 1, close));
                }
            },
        }
    }
    debug_assert!(open.is_empty());
    Ok(lines)
}

/// Pulls the next child that renders, skipping boundaries.
pub(crate) fn next_visible<S>(cursor: &mut Cursor<S>) -> Result<Option<Child>>
where
    S: crate::cursor::Source<Item = Child>,
{
    while let Some(child) = cursor.pull()? {
        if !matches!(child, Child::Boundary { .. }) {
            return Ok(Some(child));
        }
    }
    Ok(None)
}

fn child_work<'t>(child: Child, depth: usize) -> Vec<Work<'t>> {
    let affix = Affix::for_child(&child);
    match child {
        Child::Entry { key, value } if !key.is_primitive() => vec![
            Work::Value {
                value: key,
                affix: Affix::new("", " =>"),
                depth,
            },
            Work::Value {
                value,
                affix,
                depth,
            },
        ],
        Child::Property { value, .. } | Child::Item { value, .. } | Child::Entry { value, .. } => {
            vec![Work::Value {
                value,
                affix,
                depth,
            }]
        }
        Child::Boundary { .. } => Vec::new(),
    }
}

// ── Text helpers ──

fn label(node: &Node) -> &str {
    node.class_name.as_deref().unwrap_or(&node.tag)
}

/// Records, maps and sets always show their brackets.
fn collection(node: &Node) -> bool {
    matches!(node.kind, Kind::Record(_) | Kind::Map { .. } | Kind::Set { .. })
}

pub(crate) fn brackets(node: &Node) -> (&'static str, &'static str) {
    match node.kind {
        Kind::Record(RecordFlavor::List | RecordFlavor::Arguments) => ("[", "]"),
        _ => ("{", "}"),
    }
}

/// The header text of a complex node, without brackets.
pub(crate) fn descriptor(node: &Node) -> String {
    let label = label(node);
    match &node.kind {
        Kind::Record(_) | Kind::Map { .. } | Kind::Set { .. } => label.to_string(),
        Kind::Bytes(bytes) => {
            let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
            format!("{label} <{}>", hex.join(" "))
        }
        Kind::Date(Some(time)) => format!("{label} {}", number_text(*time)),
        Kind::Date(None) => format!("{label} invalid"),
        Kind::Pattern { source, flags } => format!("/{source}/{flags}"),
        Kind::Fault { name, message } => {
            if message.is_empty() {
                name.clone()
            } else {
                format!("{name}: {message}")
            }
        }
        Kind::Callable { name, .. } if name.is_empty() => label.to_string(),
        Kind::Callable { name, .. } => format!("{label} {name}"),
        Kind::Boxed(inner) => format!("{label} {}", primitive_text(inner)),
        Kind::Deferred { .. } | Kind::Singleton => label.to_string(),
    }
}

pub(crate) fn primitive_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => number_text(*n),
        Value::BigInteger(i) => format!("{i}n"),
        Value::String(s) => quote(s),
        Value::Symbol(sym) => symbol_text(sym),
        Value::Complex(id) => format!("<node {id}>"),
        Value::Pointer(id) => format!("<pointer {id}>"),
    }
}

pub(crate) fn number_text(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 && n.is_sign_negative() {
        return "-0".to_string();
    }
    let abs = n.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        let text = format!("{n:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    n.to_string()
}

fn symbol_text(sym: &Symbol) -> String {
    format!("Symbol({})", sym.description.as_deref().unwrap_or(""))
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

pub(crate) fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) if is_identifier(s) => s.clone(),
        Value::Symbol(sym) => format!("[{}]", symbol_text(sym)),
        other => primitive_text(other),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
