//! Host values: the raw, dynamically shaped input graph that gets classified.
//!
//! Complex host values are shared through [`HostRef`], whose allocation
//! address is its reference identity. Cycles are created by mutating an
//! object after it has been stored somewhere inside itself.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value as Json;

/// A raw host value.
#[derive(Clone, Debug)]
pub enum Host {
    Null,
    Undefined,
    Boolean(bool),
    Number(f64),
    BigInteger(i128),
    String(String),
    Symbol(HostSymbol),
    Object(HostRef),
}

impl Host {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Host::Object(_))
    }

    /// Symbol-style description of a primitive's boxed constructor tag.
    pub(crate) fn boxed_tag(&self) -> &'static str {
        match self {
            Host::Boolean(_) => "Boolean",
            Host::Number(_) => "Number",
            Host::BigInteger(_) => "BigInt",
            Host::String(_) => "String",
            Host::Symbol(_) => "Symbol",
            _ => "Object",
        }
    }
}

impl From<HostRef> for Host {
    fn from(r: HostRef) -> Self {
        Host::Object(r)
    }
}

impl From<&str> for Host {
    fn from(s: &str) -> Self {
        Host::String(s.to_string())
    }
}

impl From<f64> for Host {
    fn from(n: f64) -> Self {
        Host::Number(n)
    }
}

impl From<bool> for Host {
    fn from(b: bool) -> Self {
        Host::Boolean(b)
    }
}

impl From<HostSymbol> for Host {
    fn from(s: HostSymbol) -> Self {
        Host::Symbol(s)
    }
}

impl From<&Json> for Host {
    fn from(v: &Json) -> Self {
        match v {
            Json::Null => Host::Null,
            Json::Bool(b) => Host::Boolean(*b),
            Json::Number(n) => Host::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Host::String(s.clone()),
            Json::Array(items) => HostRef::array(items.iter().map(Host::from).collect()).into(),
            Json::Object(obj) => {
                let r = HostRef::object();
                for (k, v) in obj {
                    r.set(k.as_str(), Host::from(v));
                }
                r.into()
            }
        }
    }
}

struct SymbolData {
    description: Option<String>,
    canonical: Option<String>,
}

/// A symbol with reference identity.
///
/// Registry (`Symbol.for`) and well-known symbols also carry a canonical
/// key, which survives serialization where identity does not.
#[derive(Clone)]
pub struct HostSymbol(Rc<SymbolData>);

impl HostSymbol {
    /// A fresh, unique symbol.
    pub fn new(description: Option<&str>) -> Self {
        Self(Rc::new(SymbolData {
            description: description.map(str::to_string),
            canonical: None,
        }))
    }

    /// A registry symbol, equal to any other registry symbol with the same key.
    pub fn registered(key: &str) -> Self {
        Self(Rc::new(SymbolData {
            description: Some(key.to_string()),
            canonical: Some(format!("Symbol.for({key})")),
        }))
    }

    /// A well-known symbol such as `Symbol.iterator`.
    pub fn well_known(name: &str) -> Self {
        Self(Rc::new(SymbolData {
            description: Some(format!("Symbol.{name}")),
            canonical: Some(format!("Symbol.{name}")),
        }))
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    pub fn canonical(&self) -> Option<&str> {
        self.0.canonical.as_deref()
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for HostSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

/// An own-property key.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyKey {
    String(String),
    Symbol(HostSymbol),
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::String(s.to_string())
    }
}

impl From<HostSymbol> for PropertyKey {
    fn from(s: HostSymbol) -> Self {
        PropertyKey::Symbol(s)
    }
}

/// Internal slot of a host object: the data a variant is built from.
#[derive(Clone, Debug, Default)]
pub enum Internal {
    #[default]
    None,
    List(Vec<Host>),
    Entries(Vec<(Host, Host)>),
    Members(Vec<Host>),
    Bytes(Vec<u8>),
    /// Milliseconds since the epoch; `None` for an invalid date.
    Time(Option<f64>),
    Pattern { source: String, flags: String },
    Fault { name: String, message: String },
    Function { name: String },
    Primitive(Box<Host>),
}

/// A complex host value.
#[derive(Clone, Debug)]
pub struct HostObject {
    /// Display tag, such as `Object`, `Array` or `Uint8Array`.
    pub tag: String,
    /// Constructor name, if any.
    pub class_name: Option<String>,
    /// Own properties in insertion order.
    pub properties: Vec<(PropertyKey, Host)>,
    pub internal: Internal,
}

impl HostObject {
    pub fn new(tag: &str, class_name: Option<&str>, internal: Internal) -> Self {
        Self {
            tag: tag.to_string(),
            class_name: class_name.map(str::to_string),
            properties: Vec::new(),
            internal,
        }
    }
}

/// Shared handle to a [`HostObject`]; cloning shares identity.
#[derive(Clone)]
pub struct HostRef(Rc<RefCell<HostObject>>);

impl HostRef {
    pub fn new(object: HostObject) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const u8 as usize
    }

    pub fn borrow(&self) -> Ref<'_, HostObject> {
        self.0.borrow()
    }

    /// Sets (or replaces) an own property.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Host>) -> &Self {
        let key = key.into();
        let value = value.into();
        let mut obj = self.0.borrow_mut();
        match obj.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => obj.properties.push((key, value)),
        }
        self
    }

    /// Appends to a list-like or set-like internal slot.
    pub fn push(&self, value: impl Into<Host>) -> &Self {
        let mut obj = self.0.borrow_mut();
        match &mut obj.internal {
            Internal::List(items) | Internal::Members(items) => items.push(value.into()),
            other => *other = Internal::List(vec![value.into()]),
        }
        self
    }

    /// Appends a map entry.
    pub fn insert(&self, key: impl Into<Host>, value: impl Into<Host>) -> &Self {
        let mut obj = self.0.borrow_mut();
        match &mut obj.internal {
            Internal::Entries(entries) => entries.push((key.into(), value.into())),
            other => *other = Internal::Entries(vec![(key.into(), value.into())]),
        }
        self
    }

    /// Replaces the constructor name.
    pub fn with_class(self, name: &str) -> Self {
        self.0.borrow_mut().class_name = Some(name.to_string());
        self
    }

    // ── Builders ──────────────────────────────────────────────────────────

    pub fn object() -> Self {
        Self::new(HostObject::new("Object", Some("Object"), Internal::None))
    }

    pub fn array(items: Vec<Host>) -> Self {
        Self::new(HostObject::new("Array", Some("Array"), Internal::List(items)))
    }

    pub fn arguments(items: Vec<Host>) -> Self {
        Self::new(HostObject::new("Arguments", None, Internal::List(items)))
    }

    pub fn map(entries: Vec<(Host, Host)>) -> Self {
        Self::new(HostObject::new("Map", Some("Map"), Internal::Entries(entries)))
    }

    pub fn set_of(members: Vec<Host>) -> Self {
        Self::new(HostObject::new("Set", Some("Set"), Internal::Members(members)))
    }

    pub fn date(millis: f64) -> Self {
        let time = if millis.is_finite() { Some(millis) } else { None };
        Self::new(HostObject::new("Date", Some("Date"), Internal::Time(time)))
    }

    pub fn invalid_date() -> Self {
        Self::new(HostObject::new("Date", Some("Date"), Internal::Time(None)))
    }

    pub fn regexp(source: &str, flags: &str) -> Self {
        Self::new(HostObject::new(
            "RegExp",
            Some("RegExp"),
            Internal::Pattern {
                source: source.to_string(),
                flags: flags.to_string(),
            },
        ))
    }

    pub fn error(class_name: &str, message: &str) -> Self {
        Self::new(HostObject::new(
            "Error",
            Some(class_name),
            Internal::Fault {
                name: class_name.to_string(),
                message: message.to_string(),
            },
        ))
    }

    pub fn function(name: &str) -> Self {
        Self::new(HostObject::new(
            "Function",
            Some("Function"),
            Internal::Function {
                name: name.to_string(),
            },
        ))
    }

    pub fn promise() -> Self {
        Self::new(HostObject::new("Promise", Some("Promise"), Internal::None))
    }

    /// A byte buffer such as `ArrayBuffer`, `DataView` or `Uint8Array`.
    pub fn bytes(tag: &str, data: Vec<u8>) -> Self {
        Self::new(HostObject::new(tag, Some(tag), Internal::Bytes(data)))
    }

    /// A boxed primitive, e.g. `new String('x')`.
    pub fn boxed(primitive: Host) -> Self {
        let tag = primitive.boxed_tag();
        Self::new(HostObject::new(
            tag,
            Some(tag),
            Internal::Primitive(Box::new(primitive)),
        ))
    }

    pub fn global() -> Self {
        Self::new(HostObject::new("global", None, Internal::None))
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Cycles make a derived Debug recurse forever.
        match self.0.try_borrow() {
            Ok(obj) => write!(f, "HostRef({} @ {:#x})", obj.tag, self.identity()),
            Err(_) => write!(f, "HostRef(<borrowed> @ {:#x})", self.identity()),
        }
    }
}
