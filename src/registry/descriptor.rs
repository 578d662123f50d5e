/*!
 * Class Descriptors
 *
 * A descriptor tells the codec how to take a class instance apart and how
 * to put one back together. Hooks are plain closures over the value graph:
 * the serialize hook reads the source graph, the construct and finalize
 * hooks build into the decoder's output graph.
 *
 * A serialize hook and a construct hook for the same class name must agree
 * on argument shape, or round-trips break.
 */

use crate::core::types::NodeId;
use crate::core::CodecResult;
use crate::value::{Value, ValueGraph};

/// How a construct hook is expected to be invoked
///
/// Historically the two decode paths defaulted differently: the
/// plain-instance path allocates (`Allocating`), the constructed-instance
/// path calls a factory (`Factory`). The asymmetry is wire-visible for
/// registries that branch on the style, so it is preserved rather than
/// unified; pin the style on the descriptor to opt out of the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructStyle {
    /// `new`-style allocator
    Allocating,
    /// Plain factory call
    Factory,
}

/// Everything a construct hook needs to rebuild one instance
pub struct ConstructRequest<'a> {
    /// Class name as read from the wire
    pub class: &'a str,
    /// Normalized argument list, including any injected leading arguments
    pub args: Vec<Value>,
    /// Invocation style, per descriptor or per-path default
    pub style: ConstructStyle,
    /// Out-of-band context supplied at decode time
    pub context: Option<&'a Value>,
}

/// Takes an instance apart: constructor-argument value + override entries
///
/// The argument value is written to the wire before the instance claims a
/// reference slot, so it must not contain the instance itself. Composite
/// arguments must already be resident in the source graph.
pub type SerializeFn =
    Box<dyn Fn(&ValueGraph, NodeId) -> CodecResult<Serialized> + Send + Sync>;

/// Rebuilds an instance in the output graph from decoded arguments
pub type ConstructFn =
    Box<dyn Fn(&mut ValueGraph, ConstructRequest<'_>) -> CodecResult<Value> + Send + Sync>;

/// Runs after all override entries are applied
pub type FinalizeFn =
    Box<dyn Fn(&mut ValueGraph, &Value, Option<&Value>, &str) -> CodecResult<()> + Send + Sync>;

/// What a serialize hook hands back to the encoder
#[derive(Debug, Clone)]
pub struct Serialized {
    /// Constructor-argument value; a non-array value is wrapped into a
    /// single-element argument list on decode
    pub args: Value,
    /// Entries assigned onto the instance after construction
    pub overrides: Vec<(String, Value)>,
}

impl Serialized {
    pub fn new(args: Value) -> Self {
        Self {
            args,
            overrides: Vec::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: Vec<(String, Value)>) -> Self {
        self.overrides = overrides;
        self
    }
}

/// The registry's record for one class name
pub struct ClassSpec {
    name: String,
    style: Option<ConstructStyle>,
    inject_class_name: bool,
    inject_context: bool,
    serialize: Option<SerializeFn>,
    construct: Option<ConstructFn>,
    finalize: Option<FinalizeFn>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: None,
            inject_class_name: false,
            inject_context: false,
            serialize: None,
            construct: None,
            finalize: None,
        }
    }

    pub fn with_serializer(
        mut self,
        f: impl Fn(&ValueGraph, NodeId) -> CodecResult<Serialized> + Send + Sync + 'static,
    ) -> Self {
        self.serialize = Some(Box::new(f));
        self
    }

    pub fn with_constructor(
        mut self,
        f: impl Fn(&mut ValueGraph, ConstructRequest<'_>) -> CodecResult<Value>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.construct = Some(Box::new(f));
        self
    }

    pub fn with_finalizer(
        mut self,
        f: impl Fn(&mut ValueGraph, &Value, Option<&Value>, &str) -> CodecResult<()>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.finalize = Some(Box::new(f));
        self
    }

    /// Pin the construct style instead of relying on per-path defaults
    pub fn with_style(mut self, style: ConstructStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Prepend the class name as the leading constructor argument
    pub fn inject_class_name(mut self) -> Self {
        self.inject_class_name = true;
        self
    }

    /// Prepend the decode-time context object as a leading constructor argument
    pub fn inject_context(mut self) -> Self {
        self.inject_context = true;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn style(&self) -> Option<ConstructStyle> {
        self.style
    }

    #[inline]
    pub fn injects_class_name(&self) -> bool {
        self.inject_class_name
    }

    #[inline]
    pub fn injects_context(&self) -> bool {
        self.inject_context
    }

    #[inline]
    pub fn has_serializer(&self) -> bool {
        self.serialize.is_some()
    }

    #[inline]
    pub fn has_constructor(&self) -> bool {
        self.construct.is_some()
    }

    #[inline]
    pub fn serializer(&self) -> Option<&SerializeFn> {
        self.serialize.as_ref()
    }

    #[inline]
    pub fn constructor(&self) -> Option<&ConstructFn> {
        self.construct.as_ref()
    }

    #[inline]
    pub fn finalizer(&self) -> Option<&FinalizeFn> {
        self.finalize.as_ref()
    }
}

impl std::fmt::Debug for ClassSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassSpec")
            .field("name", &self.name)
            .field("style", &self.style)
            .field("inject_class_name", &self.inject_class_name)
            .field("inject_context", &self.inject_context)
            .field("serialize", &self.serialize.is_some())
            .field("construct", &self.construct.is_some())
            .field("finalize", &self.finalize.is_some())
            .finish()
    }
}
