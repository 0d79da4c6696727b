//! Built-in display-tag classification table.

use crate::value::Variant;

const TYPED_ARRAYS: &[&str] = &[
    "Int8Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "Int16Array",
    "Uint16Array",
    "Int32Array",
    "Uint32Array",
    "Float32Array",
    "Float64Array",
    "BigInt64Array",
    "BigUint64Array",
];

/// Looks up the built-in variant for a display tag.
pub fn builtin_variant(tag: &str) -> Option<Variant> {
    let variant = match tag {
        "Object" => Variant::Record,
        "Array" => Variant::List,
        "Arguments" => Variant::Arguments,
        "Map" => Variant::Map,
        "Set" => Variant::Set,
        "Date" => Variant::Date,
        "RegExp" => Variant::Pattern,
        "Error" => Variant::Fault,
        "Function" | "AsyncFunction" | "GeneratorFunction" | "AsyncGeneratorFunction" => {
            Variant::Callable
        }
        "Promise" => Variant::Deferred,
        "ArrayBuffer" | "SharedArrayBuffer" | "DataView" => Variant::Bytes,
        "Boolean" | "Number" | "String" | "BigInt" | "Symbol" => Variant::Boxed,
        "global" | "Window" | "globalThis" => Variant::Singleton,
        t if TYPED_ARRAYS.contains(&t) => Variant::Bytes,
        _ => return None,
    };
    Some(variant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_core_tags() {
        assert_eq!(builtin_variant("Object"), Some(Variant::Record));
        assert_eq!(builtin_variant("Array"), Some(Variant::List));
        assert_eq!(builtin_variant("AsyncFunction"), Some(Variant::Callable));
        assert_eq!(builtin_variant("Float64Array"), Some(Variant::Bytes));
        assert_eq!(builtin_variant("Window"), Some(Variant::Singleton));
    }

    #[test]
    fn unknown_tags_defer() {
        assert_eq!(builtin_variant("WeakMap"), None);
        assert_eq!(builtin_variant(""), None);
    }
}
