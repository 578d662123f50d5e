/*!
 * Registry-Driven Reconstruction Tests
 * Constructed instances, fallbacks, injected arguments, finalizers
 */

use graphwire::{
    decode, deep_eq, encode, ClassRegistry, ClassSpec, CodecError, DecodeOptions, Decoded,
    EncodeOptions, FormatError, Node, RegistryError, Serialized, Value, ValueGraph,
};

/// A registry for a `Point` class serialized as `[x, y]` constructor args
fn point_registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassSpec::new("Point")
            .with_serializer(|graph, id| {
                let x = graph.entry(id, "x").cloned().unwrap_or(Value::Undefined);
                let y = graph.entry(id, "y").cloned().unwrap_or(Value::Undefined);
                Ok(Serialized::new(x).with_overrides(vec![("y".into(), y)]))
            })
            .with_constructor(|graph, req| {
                let x = req.args.first().cloned().unwrap_or(Value::Undefined);
                Ok(graph.instance(req.class, vec![("x", x)]))
            }),
    );
    registry
}

fn make_point(graph: &mut ValueGraph, x: f64, y: f64) -> Value {
    graph.instance("Point", vec![("x", Value::from(x)), ("y", Value::from(y))])
}

fn roundtrip_binary(graph: &ValueGraph, value: &Value, registry: &ClassRegistry) -> Decoded {
    let bytes = encode::binary::to_vec(graph, value, Some(registry), &EncodeOptions::default())
        .expect("binary encode failed");
    decode::binary::from_slice(&bytes, Some(registry), &DecodeOptions::default())
        .expect("binary decode failed")
}

fn roundtrip_text(graph: &ValueGraph, value: &Value, registry: &ClassRegistry) -> Decoded {
    let text = encode::text::to_string(graph, value, Some(registry), &EncodeOptions::default())
        .expect("text encode failed");
    decode::text::from_str(&text, Some(registry), &DecodeOptions::default())
        .expect("text decode failed")
}

#[test]
fn test_constructed_instance_round_trip() {
    let registry = point_registry();
    let mut graph = ValueGraph::new();
    let point = make_point(&mut graph, 3.0, 4.0);

    for decoded in [
        roundtrip_binary(&graph, &point, &registry),
        roundtrip_text(&graph, &point, &registry),
    ] {
        let id = decoded.root.as_node().expect("instance must be a node");
        match decoded.graph.get(id) {
            Some(Node::Instance { class, .. }) => assert_eq!(class, "Point"),
            other => panic!("unexpected node: {other:?}"),
        }
        // x arrives through the constructor, y through the override entry
        assert_eq!(decoded.graph.entry(id, "x"), Some(&Value::from(3.0)));
        assert_eq!(decoded.graph.entry(id, "y"), Some(&Value::from(4.0)));
    }
}

#[test]
fn test_constructed_instance_identity_preserved() {
    let registry = point_registry();
    let mut graph = ValueGraph::new();
    let point = make_point(&mut graph, 1.0, 2.0);
    let root = graph.array(vec![point.clone(), point]);

    for decoded in [
        roundtrip_binary(&graph, &root, &registry),
        roundtrip_text(&graph, &root, &registry),
    ] {
        let id = decoded.root.as_node().unwrap();
        match decoded.graph.get(id) {
            Some(Node::Array(items)) => assert_eq!(items[0].as_node(), items[1].as_node()),
            other => panic!("unexpected node: {other:?}"),
        }
    }
}

#[test]
fn test_constructed_slot_is_deferred_past_arguments() {
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassSpec::new("Pair")
            .with_serializer(|graph, id| {
                let items = match graph.expect(id)? {
                    Node::Instance { entries, .. } => {
                        entries.iter().map(|(_, v)| v.clone()).collect()
                    }
                    _ => Vec::new(),
                };
                let mut scratch = items;
                scratch.truncate(2);
                Ok(Serialized::new(Value::Undefined).with_overrides(
                    scratch
                        .into_iter()
                        .enumerate()
                        .map(|(i, v)| (format!("f{i}"), v))
                        .collect(),
                ))
            })
            .with_constructor(|graph, req| {
                Ok(graph.instance(req.class, Vec::<(String, Value)>::new()))
            }),
    );

    let mut graph = ValueGraph::new();
    let pair = graph.instance("Pair", vec![("a", Value::from(1.0))]);
    let root = graph.array(vec![pair.clone(), pair]);

    let encoded =
        encode::text::to_string(&graph, &root, Some(&registry), &EncodeOptions::default())
            .unwrap();
    // root array slot 0, instance slot 1 (its argument is a scalar), the
    // repeat is a reference to slot 1
    assert_eq!(encoded, "a{c{s4;Pair;Us2;f0;1}$1;}");

    let decoded =
        decode::text::from_str(&encoded, Some(&registry), &DecodeOptions::default()).unwrap();
    let id = decoded.root.as_node().unwrap();
    match decoded.graph.get(id) {
        Some(Node::Array(items)) => assert_eq!(items[0].as_node(), items[1].as_node()),
        other => panic!("unexpected node: {other:?}"),
    }
}

#[test]
fn test_cyclic_constructor_arguments_are_fatal() {
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassSpec::new("Selfish")
            .with_serializer(|_, id| Ok(Serialized::new(Value::Node(id))))
            .with_constructor(|graph, req| {
                Ok(graph.instance(req.class, Vec::<(String, Value)>::new()))
            }),
    );
    let mut graph = ValueGraph::new();
    let selfish = graph.instance("Selfish", Vec::<(String, Value)>::new());

    let err = encode::text::to_string(
        &graph,
        &selfish,
        Some(&registry),
        &EncodeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CodecError::Format(FormatError::CyclicConstructor { .. })
    ));
}

#[test]
fn test_finalizer_runs_after_overrides() {
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassSpec::new("Audited")
            .with_serializer(|_, _| {
                Ok(Serialized::new(Value::Undefined)
                    .with_overrides(vec![("payload".into(), Value::from(9.0))]))
            })
            .with_constructor(|graph, req| {
                Ok(graph.instance(req.class, Vec::<(String, Value)>::new()))
            })
            .with_finalizer(|graph, instance, context, class| {
                let id = instance.as_node().expect("instance is a node");
                // the override entry is visible by the time this runs
                assert!(graph.entry(id, "payload").is_some());
                let context = context.cloned().unwrap_or(Value::Undefined);
                graph.insert_entry(id, "finalized_by", context)?;
                graph.insert_entry(id, "finalized_class", Value::from(class))?;
                Ok(())
            }),
    );

    let mut graph = ValueGraph::new();
    let audited = graph.instance("Audited", Vec::<(String, Value)>::new());
    let bytes =
        encode::binary::to_vec(&graph, &audited, Some(&registry), &EncodeOptions::default())
            .unwrap();

    let options = DecodeOptions::new().with_context(Value::from("ops"));
    let decoded = decode::binary::from_slice(&bytes, Some(&registry), &options).unwrap();
    let id = decoded.root.as_node().unwrap();
    assert_eq!(decoded.graph.entry(id, "payload"), Some(&Value::from(9.0)));
    assert_eq!(
        decoded.graph.entry(id, "finalized_by"),
        Some(&Value::from("ops"))
    );
    assert_eq!(
        decoded.graph.entry(id, "finalized_class"),
        Some(&Value::from("Audited"))
    );
}

#[test]
fn test_injected_leading_arguments() {
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassSpec::new("Labeled")
            .with_serializer(|_, _| Ok(Serialized::new(Value::from(42.0))))
            .with_constructor(|graph, req| {
                // [class name, context, wire argument]
                assert_eq!(req.args[0], Value::Text("Labeled".into()));
                assert_eq!(req.args[1], Value::Text("ctx".into()));
                assert_eq!(req.args[2], Value::from(42.0));
                Ok(graph.instance(req.class, Vec::<(String, Value)>::new()))
            })
            .inject_class_name()
            .inject_context(),
    );

    let mut graph = ValueGraph::new();
    let labeled = graph.instance("Labeled", Vec::<(String, Value)>::new());
    let text =
        encode::text::to_string(&graph, &labeled, Some(&registry), &EncodeOptions::default())
            .unwrap();
    let options = DecodeOptions::new().with_context(Value::from("ctx"));
    decode::text::from_str(&text, Some(&registry), &options).unwrap();
}

#[test]
fn test_unknown_class_strict_and_placeholder() {
    let mut graph = ValueGraph::new();
    let ghost = graph.instance("Ghost", vec![("x", Value::from(1.0))]);

    // encoding an unregistered instance is fatal without the option
    let err =
        encode::text::to_string(&graph, &ghost, None, &EncodeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Registry(RegistryError::UnknownClass(_))
    ));

    // with the option it round-trips into a placeholder tagging the name
    let text = encode::text::to_string(
        &graph,
        &ghost,
        None,
        &EncodeOptions::new().allow_unknown_classes(),
    )
    .unwrap();

    let err = decode::text::from_str(&text, None, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Registry(RegistryError::UnknownClass(_))
    ));

    let decoded = decode::text::from_str(
        &text,
        None,
        &DecodeOptions::new().allow_unknown_classes(),
    )
    .unwrap();
    assert!(deep_eq(&graph, &ghost, &decoded.graph, &decoded.root));
}

#[test]
fn test_universal_fallback_round_trip() {
    // a generic envelope descriptor: args are the entry values, overrides
    // carry the keys
    let universal_encode = ClassSpec::new("*").with_serializer(|graph, id| {
        let entries = match graph.expect(id)? {
            Node::Instance { entries, .. } => entries.clone(),
            _ => Vec::new(),
        };
        Ok(Serialized::new(Value::Undefined).with_overrides(entries))
    });
    let universal_decode = ClassSpec::new("*").with_constructor(|graph, req| {
        Ok(graph.instance(req.class, Vec::<(String, Value)>::new()))
    });

    let mut graph = ValueGraph::new();
    let exotic = graph.instance("Exotic", vec![("n", Value::from(5.0))]);

    let text = encode::text::to_string(
        &graph,
        &exotic,
        None,
        &EncodeOptions::new().with_universal(universal_encode),
    )
    .unwrap();

    let decoded = decode::text::from_str(
        &text,
        None,
        &DecodeOptions::new().with_universal(universal_decode),
    )
    .unwrap();
    let id = decoded.root.as_node().unwrap();
    match decoded.graph.get(id) {
        Some(Node::Instance { class, .. }) => assert_eq!(class, "Exotic"),
        other => panic!("unexpected node: {other:?}"),
    }
    assert_eq!(decoded.graph.entry(id, "n"), Some(&Value::from(5.0)));
}

#[test]
fn test_plain_registered_instance_round_trip() {
    // registered without a serializer: plain key-assignment emission
    let mut registry = ClassRegistry::new();
    registry.register(ClassSpec::new("Config"));

    let mut graph = ValueGraph::new();
    let config = graph.instance("Config", vec![("debug", Value::Bool(true))]);

    for decoded in [
        roundtrip_binary(&graph, &config, &registry),
        roundtrip_text(&graph, &config, &registry),
    ] {
        assert!(deep_eq(&graph, &config, &decoded.graph, &decoded.root));
    }
}

#[test]
fn test_constructed_instance_without_constructor_is_fatal() {
    let mut encode_registry = ClassRegistry::new();
    encode_registry.register(
        ClassSpec::new("HalfBaked").with_serializer(|_, _| Ok(Serialized::new(Value::Null))),
    );
    let mut graph = ValueGraph::new();
    let value = graph.instance("HalfBaked", Vec::<(String, Value)>::new());
    let text = encode::text::to_string(
        &graph,
        &value,
        Some(&encode_registry),
        &EncodeOptions::default(),
    )
    .unwrap();

    let err = decode::text::from_str(&text, Some(&encode_registry), &DecodeOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::Registry(RegistryError::NotConstructible(_))
    ));
}
