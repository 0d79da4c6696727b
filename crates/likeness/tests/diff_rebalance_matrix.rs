use likeness::{
    decode, describe, diff, diff_text, encode, DecodeOptions, DiffLine, DiffOptions, Host,
    HostRef, HostSymbol, LineTag, Tree,
};
use serde_json::json;

fn tree(v: serde_json::Value) -> Tree {
    describe(&Host::from(&v))
}

fn lines(actual: &Tree, expected: &Tree) -> Vec<DiffLine> {
    diff(actual, expected, &DiffOptions::default()).expect("diff must succeed")
}

fn tag_of(lines: &[DiffLine], text: &str) -> Vec<LineTag> {
    lines
        .iter()
        .filter(|l| l.text == text || l.expected.as_deref() == Some(text))
        .map(|l| l.tag)
        .collect()
}

#[test]
fn substitution_is_split_into_removal_and_insertion() {
    let out = lines(&tree(json!([1, 2, 4])), &tree(json!([1, 3, 4])));
    assert_eq!(tag_of(&out, "2,"), vec![LineTag::ActualOnly]);
    assert_eq!(tag_of(&out, "3,"), vec![LineTag::ExpectedOnly]);
    assert_eq!(tag_of(&out, "1,"), vec![LineTag::Same]);
    assert_eq!(tag_of(&out, "4,"), vec![LineTag::Same]);
}

#[test]
fn extraneous_item_realigns_the_rest() {
    let out = lines(&tree(json!([1, 3, 2])), &tree(json!([1, 2])));
    assert_eq!(tag_of(&out, "3,"), vec![LineTag::ActualOnly]);
    assert_eq!(tag_of(&out, "2,"), vec![LineTag::Same]);
}

#[test]
fn missing_item_is_reported_as_expected_only() {
    let out = lines(&tree(json!(["a", "c"])), &tree(json!(["a", "b", "c"])));
    assert_eq!(tag_of(&out, "'b',"), vec![LineTag::ExpectedOnly]);
    assert_eq!(tag_of(&out, "'c',"), vec![LineTag::Same]);
}

#[test]
fn complex_items_of_the_same_shape_are_opened() {
    let text = diff_text(
        &tree(json!([{"a": 1}])),
        &tree(json!([{"a": 2}])),
        &DiffOptions::default(),
    )
    .unwrap();
    assert_eq!(
        text,
        "  Array [\n    Object {\n-     a: 1,\n+     a: 2,\n    },\n  ]"
    );
}

#[test]
fn set_members_align_by_value() {
    let a = HostRef::set_of(vec![Host::from(1.0), Host::from(2.0)]);
    let b = HostRef::set_of(vec![Host::from(2.0)]);
    let out = lines(&describe(&a.into()), &describe(&b.into()));
    assert_eq!(tag_of(&out, "1,"), vec![LineTag::ActualOnly]);
    assert_eq!(tag_of(&out, "2,"), vec![LineTag::Same]);
}

#[test]
fn map_entries_align_by_key() {
    let a = HostRef::map(vec![
        (Host::from("x"), Host::from(1.0)),
        (Host::from("y"), Host::from(2.0)),
    ]);
    let b = HostRef::map(vec![
        (Host::from("y"), Host::from(3.0)),
    ]);
    let out = lines(&describe(&a.into()), &describe(&b.into()));
    assert_eq!(tag_of(&out, "'x' => 1,"), vec![LineTag::ActualOnly]);
    let changed: Vec<&DiffLine> = out.iter().filter(|l| l.tag == LineTag::Changed).collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].text, "'y' => 2,");
    assert_eq!(changed[0].expected.as_deref(), Some("'y' => 3,"));
}

#[test]
fn symbol_properties_match_regardless_of_order() {
    let s1 = HostSymbol::new(Some("s1"));
    let s2 = HostSymbol::new(Some("s2"));
    let a = HostRef::object();
    a.set(s1.clone(), 1.0).set(s2.clone(), 2.0);
    let b = HostRef::object();
    b.set(s2, 2.0).set(s1, 3.0);
    let text = diff_text(&describe(&a.into()), &describe(&b.into()), &DiffOptions::default())
        .unwrap();
    assert_eq!(
        text,
        "  Object {\n-   [Symbol(s1)]: 1,\n+   [Symbol(s1)]: 3,\n    [Symbol(s2)]: 2,\n  }"
    );
}

#[test]
fn decoded_trees_diff_like_described_ones() {
    let original = tree(json!({"list": [1, 2, 3], "name": "x"}));
    let decoded = decode(&encode(&original).unwrap(), &DecodeOptions::default()).unwrap();
    let changed = tree(json!({"list": [1, 3], "name": "y"}));
    assert_eq!(lines(&decoded, &changed), lines(&original, &changed));
}

#[test]
fn size_mismatch_never_prints_boundaries() {
    let out = lines(&tree(json!([1, 2])), &tree(json!([1, 2, 3])));
    assert_eq!(out.len(), 5);
    assert_eq!(tag_of(&out, "3,"), vec![LineTag::ExpectedOnly]);
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

#[test]
fn cycle_equal_inside_one_context_is_not_reused_outside_it() {
    let out = lines(&crossed_cycles(1.0), &crossed_cycles(2.0));
    let changes: Vec<&DiffLine> = out.iter().filter(|l| l.text == "v: 1,").collect();
    // Once under `a`, once under `c.back`.
    assert_eq!(changes.len(), 2);
    for line in &changes {
        assert_eq!(line.tag, LineTag::Changed);
        assert_eq!(line.expected.as_deref(), Some("v: 2,"));
    }
    assert_eq!(changes[0].depth, 2);
    assert_eq!(changes[1].depth, 3);
    assert!(out
        .iter()
        .any(|l| l.tag == LineTag::Same && l.text == "back: Object {" && l.depth == 2));
}

#[test]
fn removed_complex_item_keeps_the_exact_match_aligned() {
    let text = diff_text(
        &tree(json!([{"a": 1}, {"b": 2}])),
        &tree(json!([{"b": 2}])),
        &DiffOptions::default(),
    )
    .unwrap();
    assert_eq!(
        text,
        "  Array [\n-   Object {\n-     a: 1,\n-   },\n    Object {\n      b: 2,\n    },\n  ]"
    );
}

#[test]
fn inserted_complex_item_keeps_the_exact_match_aligned() {
    let out = lines(&tree(json!([{"b": 2}])), &tree(json!([{"a": 1}, {"b": 2}])));
    assert_eq!(tag_of(&out, "a: 1,"), vec![LineTag::ExpectedOnly]);
    assert_eq!(tag_of(&out, "b: 2,"), vec![LineTag::Same]);
}
