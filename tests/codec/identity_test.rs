/*!
 * Identity Preservation Tests
 * Shared substructure must decode as shared, cycles as cycles: the
 * reference table assigns each object exactly one slot per call
 */

use graphwire::{decode, encode, DecodeOptions, Decoded, EncodeOptions, Node, Value, ValueGraph};

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

fn entry<'a>(decoded: &'a Decoded, value: &Value, key: &str) -> &'a Value {
    let id = value.as_node().expect("expected a node");
    decoded
        .graph
        .entry(id, key)
        .unwrap_or_else(|| panic!("missing entry {key:?}"))
}

#[test]
fn test_shared_object_decodes_as_one_object() {
    let mut graph = ValueGraph::new();
    let shared = graph.object(vec![("tag", Value::from("shared"))]);
    let root = graph.object(vec![("first", shared.clone()), ("second", shared)]);

    for decoded in [roundtrip_binary(&graph, &root), roundtrip_text(&graph, &root)] {
        let first = entry(&decoded, &decoded.root, "first");
        let second = entry(&decoded, &decoded.root, "second");
        assert_eq!(
            first.as_node(),
            second.as_node(),
            "both fields must hold the same node, not structural copies"
        );
    }
}

#[test]
fn test_mutual_cycle_round_trips() {
    let mut graph = ValueGraph::new();
    let a = graph.alloc(Node::empty_object());
    let b = graph.alloc(Node::empty_object());
    graph.insert_entry(a, "k3", Value::Node(b)).unwrap();
    graph.insert_entry(b, "k6", Value::Node(a)).unwrap();
    let root = Value::Node(a);

    for decoded in [roundtrip_binary(&graph, &root), roundtrip_text(&graph, &root)] {
        let k3 = entry(&decoded, &decoded.root, "k3").clone();
        let k6 = entry(&decoded, &k3, "k6");
        assert_eq!(
            k6.as_node(),
            decoded.root.as_node(),
            "decoded.k3.k6 must be decoded itself"
        );
    }
}

#[test]
fn test_self_cycle_round_trips() {
    let mut graph = ValueGraph::new();
    let id = graph.alloc(Node::empty_object());
    graph.insert_entry(id, "me", Value::Node(id)).unwrap();
    let root = Value::Node(id);

    for decoded in [roundtrip_binary(&graph, &root), roundtrip_text(&graph, &root)] {
        let me = entry(&decoded, &decoded.root, "me");
        assert_eq!(me.as_node(), decoded.root.as_node());
    }
}

#[test]
fn test_empty_array_placed_twice_is_one_array() {
    let mut graph = ValueGraph::new();
    let empty = graph.array(vec![]);
    let root = graph.array(vec![empty.clone(), empty]);

    for decoded in [roundtrip_binary(&graph, &root), roundtrip_text(&graph, &root)] {
        let id = decoded.root.as_node().expect("root must be a node");
        match decoded.graph.get(id) {
            Some(Node::Array(items)) => {
                assert_eq!(items.len(), 2);
                assert_eq!(
                    items[0].as_node(),
                    items[1].as_node(),
                    "one empty array, not two distinct empties"
                );
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }
}

#[test]
fn test_shared_string_is_not_identity_tracked() {
    // strings are value types; two equal strings stay two values
    let mut graph = ValueGraph::new();
    let root = graph.array(vec![Value::from("dup"), Value::from("dup")]);
    let encoded = encode::text::to_string(&graph, &root, None, &EncodeOptions::default()).unwrap();
    assert_eq!(encoded, "a{s3;dup;s3;dup;}");
}

#[test]
fn test_deep_sharing_through_containers() {
    let mut graph = ValueGraph::new();
    let leaf = graph.object(vec![("n", Value::from(7.0))]);
    let left = graph.array(vec![leaf.clone()]);
    let right = graph.set(vec![leaf]);
    let root = graph.object(vec![("left", left), ("right", right)]);

    for decoded in [roundtrip_binary(&graph, &root), roundtrip_text(&graph, &root)] {
        let left = entry(&decoded, &decoded.root, "left").as_node().unwrap();
        let right = entry(&decoded, &decoded.root, "right").as_node().unwrap();
        let leaf_in_left = match decoded.graph.get(left) {
            Some(Node::Array(items)) => items[0].as_node(),
            other => panic!("unexpected node: {other:?}"),
        };
        let leaf_in_right = match decoded.graph.get(right) {
            Some(Node::Set(items)) => items[0].as_node(),
            other => panic!("unexpected node: {other:?}"),
        };
        assert_eq!(leaf_in_left, leaf_in_right);
    }
}

#[test]
fn test_slot_numbering_matches_across_directions() {
    // container slots are claimed before children on both sides; a
    // reference written by the encoder must resolve to the same object
    // when read back
    let mut graph = ValueGraph::new();
    let inner = graph.object(vec![("x", Value::from(1.0))]);
    let middle = graph.array(vec![inner.clone()]);
    let root = graph.object(vec![
        ("middle", middle),
        ("inner_again", inner),
    ]);

    let encoded = encode::text::to_string(&graph, &root, None, &EncodeOptions::default()).unwrap();
    // root=0, middle=1, inner=2; the second occurrence references slot 2
    assert_eq!(
        encoded,
        "o{s6;middle;a{o{s1;x;1}}s11;inner_again;$2;}"
    );
}
