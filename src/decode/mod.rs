/*!
 * Decoder
 *
 * Pre-order consumption of the wire grammar, rebuilding a fresh value
 * graph and replaying the encoder's slot numbering:
 * - `binary`: compact byte form
 * - `text`: printable character form
 *
 * Registry-driven instance reconstruction is shared below; the grammar
 * loops are per-form.
 */

pub mod binary;
pub mod options;
pub mod slots;
pub mod text;

pub use options::DecodeOptions;

use crate::core::errors::{CodecError, RegistryError};
use crate::core::CodecResult;
use crate::registry::{ClassRegistry, ClassSpec, ConstructRequest, ConstructStyle};
use crate::value::{Node, Value, ValueGraph};

/// One fully decoded document: the rebuilt graph and its root value
#[derive(Debug)]
pub struct Decoded {
    pub graph: ValueGraph,
    pub root: Value,
}

/// How one instance read from the wire will be rebuilt
pub(crate) enum ConstructRoute<'a> {
    /// Descriptor-driven reconstruction
    Spec(&'a ClassSpec),
    /// Generic placeholder tagging the original class name
    Placeholder,
}

impl std::fmt::Debug for ConstructRoute<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructRoute::Spec(_) => f.write_str("Spec(..)"),
            ConstructRoute::Placeholder => f.write_str("Placeholder"),
        }
    }
}

/// Descriptor resolution for the plain-instance path: registry, else
/// placeholder, else fatal
pub(crate) fn plain_route<'a>(
    class: &str,
    registry: Option<&'a ClassRegistry>,
    options: &'a DecodeOptions,
) -> CodecResult<ConstructRoute<'a>> {
    if let Some(spec) = registry.and_then(|r| r.get(class)) {
        return Ok(ConstructRoute::Spec(spec));
    }
    if options.allow_unknown_classes {
        return Ok(ConstructRoute::Placeholder);
    }
    Err(RegistryError::UnknownClass(class.to_string()).into())
}

/// Descriptor resolution for the constructed-instance path: registry,
/// else universal fallback, else placeholder, else fatal
pub(crate) fn constructed_route<'a>(
    class: &str,
    registry: Option<&'a ClassRegistry>,
    options: &'a DecodeOptions,
) -> CodecResult<ConstructRoute<'a>> {
    if let Some(spec) = registry.and_then(|r| r.get(class)) {
        return Ok(ConstructRoute::Spec(spec));
    }
    if let Some(universal) = options.universal.as_ref() {
        return Ok(ConstructRoute::Spec(universal));
    }
    if options.allow_unknown_classes {
        return Ok(ConstructRoute::Placeholder);
    }
    Err(RegistryError::UnknownClass(class.to_string()).into())
}

/// Build the empty, prototype-linked instance the plain path decodes
/// keys into
///
/// With a construct hook on the descriptor the hook allocates it (style
/// defaults to `Allocating` on this path); otherwise a bare instance
/// node is used.
pub(crate) fn create_plain_instance(
    graph: &mut ValueGraph,
    class: &str,
    route: &ConstructRoute<'_>,
    context: Option<&Value>,
) -> CodecResult<Value> {
    match route {
        ConstructRoute::Spec(spec) if spec.has_constructor() => {
            let mut args = Vec::new();
            if spec.injects_class_name() {
                args.push(Value::Text(class.to_string()));
            }
            if spec.injects_context() {
                args.push(context.cloned().unwrap_or(Value::Undefined));
            }
            let request = ConstructRequest {
                class,
                args,
                style: spec.style().unwrap_or(ConstructStyle::Allocating),
                context,
            };
            invoke_constructor(spec, graph, request, class)
        }
        _ => Ok(graph.instance(class, Vec::<(String, Value)>::new())),
    }
}

/// Rebuild a constructed instance from its decoded argument value
///
/// The argument value is normalized to a list (a non-array value becomes
/// a single-element list); class name and context are prepended as
/// leading arguments when the descriptor requests them; style defaults
/// to `Factory` on this path. A placeholder route keeps only the class
/// name: the arguments were still consumed so slot numbering holds.
pub(crate) fn construct_instance(
    graph: &mut ValueGraph,
    class: &str,
    route: &ConstructRoute<'_>,
    args_value: Value,
    context: Option<&Value>,
) -> CodecResult<Value> {
    let spec = match route {
        ConstructRoute::Spec(spec) => spec,
        ConstructRoute::Placeholder => {
            return Ok(graph.instance(class, Vec::<(String, Value)>::new()));
        }
    };
    if !spec.has_constructor() {
        return Err(RegistryError::NotConstructible(class.to_string()).into());
    }

    let mut args = match &args_value {
        Value::Node(id) => match graph.expect(*id)? {
            Node::Array(items) => items.clone(),
            _ => vec![args_value.clone()],
        },
        _ => vec![args_value.clone()],
    };
    if spec.injects_context() {
        args.insert(0, context.cloned().unwrap_or(Value::Undefined));
    }
    if spec.injects_class_name() {
        args.insert(0, Value::Text(class.to_string()));
    }

    let request = ConstructRequest {
        class,
        args,
        style: spec.style().unwrap_or(ConstructStyle::Factory),
        context,
    };
    invoke_constructor(spec, graph, request, class)
}

fn invoke_constructor(
    spec: &ClassSpec,
    graph: &mut ValueGraph,
    request: ConstructRequest<'_>,
    class: &str,
) -> CodecResult<Value> {
    let Some(constructor) = spec.constructor() else {
        return Err(RegistryError::NotConstructible(class.to_string()).into());
    };
    constructor(graph, request)
}

/// Assign one decoded key onto an instance produced by a construct hook
pub(crate) fn apply_entry(
    graph: &mut ValueGraph,
    instance: &Value,
    class: &str,
    key: String,
    value: Value,
) -> CodecResult<()> {
    let Some(id) = instance.as_node() else {
        return Err(RegistryError::BadConstruction {
            class: class.to_string(),
            reason: "constructed value is a scalar".into(),
        }
        .into());
    };
    if !graph.expect(id)?.holds_entries() {
        return Err(RegistryError::BadConstruction {
            class: class.to_string(),
            reason: "constructed node holds no entries".into(),
        }
        .into());
    }
    graph.insert_entry(id, key, value)
}

/// Reject a context value that cannot precede the output graph
pub(crate) fn validate_context(options: &DecodeOptions) -> CodecResult<()> {
    match &options.context {
        Some(context) if context.is_node() => Err(CodecError::Internal(
            "decode context must be a scalar value".into(),
        )),
        _ => Ok(()),
    }
}
