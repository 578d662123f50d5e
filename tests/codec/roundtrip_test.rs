/*!
 * Round-Trip Tests
 * decode(encode(v)) must deep-equal v, independently in both wire forms
 */

use graphwire::{decode, deep_eq, encode, DecodeOptions, Decoded, EncodeOptions, Value, ValueGraph};
use proptest::prelude::*;

fn roundtrip_binary(graph: &ValueGraph, value: &Value) -> Decoded {
    let bytes = encode::binary::to_vec(graph, value, None, &EncodeOptions::default())
        .expect("binary encode failed");
    decode::binary::from_slice(&bytes, None, &DecodeOptions::default())
        .expect("binary decode failed")
}

fn roundtrip_text(graph: &ValueGraph, value: &Value) -> Decoded {
    let text = encode::text::to_string(graph, value, None, &EncodeOptions::default())
        .expect("text encode failed");
    decode::text::from_str(&text, None, &DecodeOptions::default()).expect("text decode failed")
}

fn assert_roundtrips(graph: &ValueGraph, value: &Value) {
    let decoded = roundtrip_binary(graph, value);
    assert!(
        deep_eq(graph, value, &decoded.graph, &decoded.root),
        "binary round-trip changed the value: {value:?}"
    );
    let decoded = roundtrip_text(graph, value);
    assert!(
        deep_eq(graph, value, &decoded.graph, &decoded.root),
        "textual round-trip changed the value: {value:?}"
    );
}

#[test]
fn test_scalar_round_trips() {
    let graph = ValueGraph::new();
    for value in [
        Value::Undefined,
        Value::Null,
        Value::Bool(true),
        Value::Bool(false),
        Value::Number(0.0),
        Value::Number(1.0),
        Value::Number(-1.0),
        Value::Number(0.1),
        Value::Number(-273.15),
        Value::Number(f64::MAX),
        Value::Number(f64::MIN_POSITIVE),
        Value::Number(f64::NAN),
        Value::Number(f64::INFINITY),
        Value::Number(f64::NEG_INFINITY),
        Value::Text(String::new()),
        Value::from("plain"),
        Value::from("contains;separators;and{braces}"),
        Value::from("unicode: \u{1F980}\u{00E9}\u{4E2D}"),
    ] {
        assert_roundtrips(&graph, &value);
    }
}

#[test]
fn test_large_string_round_trips() {
    let graph = ValueGraph::new();
    // larger than the 2-byte length class boundary
    let large = "payload-".repeat(10_000);
    assert!(large.len() > 64 * 1024);
    assert_roundtrips(&graph, &Value::from(large.as_str()));
}

#[test]
fn test_nested_containers_depth_five() {
    let mut graph = ValueGraph::new();
    let level5 = graph.array(vec![Value::from(5.0)]);
    let level4 = graph.object(vec![("deep", level5)]);
    let level3 = graph.array(vec![level4, Value::Null]);
    let level2 = graph.object(vec![("mid", level3), ("note", Value::from("x"))]);
    let level1 = graph.array(vec![level2, Value::from(1.0)]);
    assert_roundtrips(&graph, &level1);
}

#[test]
fn test_empty_containers() {
    let mut graph = ValueGraph::new();
    let arr = graph.array(vec![]);
    let set = graph.set(vec![]);
    let obj = graph.object(Vec::<(String, Value)>::new());
    assert_roundtrips(&graph, &arr);
    assert_roundtrips(&graph, &set);
    assert_roundtrips(&graph, &obj);
}

#[test]
fn test_set_round_trip_preserves_order() {
    let mut graph = ValueGraph::new();
    let set = graph.set(vec![
        Value::from("c"),
        Value::from("a"),
        Value::from("b"),
    ]);
    assert_roundtrips(&graph, &set);
}

#[test]
fn test_map_round_trip_textual_only() {
    let mut graph = ValueGraph::new();
    let key = graph.array(vec![Value::from(1.0)]);
    let map = graph.map(vec![
        (Value::from("k"), Value::from("v")),
        (key, Value::Null),
    ]);
    let decoded = roundtrip_text(&graph, &map);
    assert!(deep_eq(&graph, &map, &decoded.graph, &decoded.root));
}

#[test]
fn test_buffer_round_trip_textual_only() {
    let graph = ValueGraph::new();
    let buffer = Value::Bytes((0..=255).collect());
    let decoded = roundtrip_text(&graph, &buffer);
    assert!(deep_eq(&graph, &buffer, &decoded.graph, &decoded.root));
}

#[test]
fn test_mixed_document() {
    let mut graph = ValueGraph::new();
    let tags = graph.set(vec![Value::from("alpha"), Value::from("beta")]);
    let rows = graph.array(vec![
        Value::from(0.0),
        Value::from(1.0),
        Value::Number(f64::NAN),
        Value::from("row;3"),
    ]);
    let doc = graph.object(vec![
        ("title", Value::from("report")),
        ("tags", tags),
        ("rows", rows),
        ("approved", Value::Bool(true)),
        ("parent", Value::Null),
    ]);
    assert_roundtrips(&graph, &doc);
}

// ============================================================================
// Property-based round-trips
// ============================================================================

#[derive(Debug, Clone)]
enum Tree {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Arr(Vec<Tree>),
    Obj(Vec<(String, Tree)>),
}

fn tree_strategy() -> impl Strategy<Value = Tree> {
    let finite = prop::num::f64::POSITIVE
        | prop::num::f64::NEGATIVE
        | prop::num::f64::ZERO
        | prop::num::f64::NORMAL
        | prop::num::f64::SUBNORMAL;
    let leaf = prop_oneof![
        Just(Tree::Null),
        any::<bool>().prop_map(Tree::Bool),
        finite.prop_map(Tree::Num),
        ".*".prop_map(Tree::Str),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Tree::Arr),
            prop::collection::vec(("[a-z;{}$]{0,8}", inner), 0..6).prop_map(Tree::Obj),
        ]
    })
}

fn build(graph: &mut ValueGraph, tree: &Tree) -> Value {
    match tree {
        Tree::Null => Value::Null,
        Tree::Bool(b) => Value::Bool(*b),
        Tree::Num(n) => Value::Number(*n),
        Tree::Str(s) => Value::from(s.as_str()),
        Tree::Arr(items) => {
            let items = items.iter().map(|item| build(graph, item)).collect();
            graph.array(items)
        }
        Tree::Obj(entries) => {
            let entries: Vec<(String, Value)> = entries
                .iter()
                .map(|(k, v)| (k.clone(), build(graph, v)))
                .collect();
            graph.object(entries)
        }
    }
}

proptest! {
    #[test]
    fn prop_binary_round_trip(tree in tree_strategy()) {
        let mut graph = ValueGraph::new();
        let value = build(&mut graph, &tree);
        let decoded = roundtrip_binary(&graph, &value);
        prop_assert!(deep_eq(&graph, &value, &decoded.graph, &decoded.root));
    }

    #[test]
    fn prop_text_round_trip(tree in tree_strategy()) {
        let mut graph = ValueGraph::new();
        let value = build(&mut graph, &tree);
        let decoded = roundtrip_text(&graph, &value);
        prop_assert!(deep_eq(&graph, &value, &decoded.graph, &decoded.root));
    }
}
