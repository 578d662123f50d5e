/*!
 * Value Graph
 *
 * Arena for object-like values. Object identity is the arena index: two
 * fields holding the same `NodeId` are the same object, which is what the
 * reference-tracking protocol preserves across a round-trip. Scalars live
 * inline in [`Value`](super::Value) and have no identity.
 *
 * The arena is append-only; `NodeId`s stay valid for the life of the graph.
 */

use super::value::Value;
use crate::core::errors::CodecError;
use crate::core::types::NodeId;
use crate::core::CodecResult;

/// An object-like value resident in a [`ValueGraph`]
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Ordered sequence
    Array(Vec<Value>),
    /// Unordered collection, insertion order preserved for iteration
    Set(Vec<Value>),
    /// Ordered key/value pairs with arbitrary keys
    Map(Vec<(Value, Value)>),
    /// Plain object; `proto` is honored only when prototype preservation
    /// is enabled at encode time and must be a node-valued `Value`
    Object {
        proto: Option<Value>,
        entries: Vec<(String, Value)>,
    },
    /// Class instance; reconstruction strategy is decided by the registry
    Instance {
        class: String,
        entries: Vec<(String, Value)>,
    },
}

impl Node {
    /// Empty plain object with the default prototype
    pub fn empty_object() -> Self {
        Node::Object {
            proto: None,
            entries: Vec::new(),
        }
    }

    /// Whether this node holds string-keyed entries
    #[inline]
    pub const fn holds_entries(&self) -> bool {
        matches!(self, Node::Object { .. } | Node::Instance { .. })
    }
}

/// Append-only arena of object-like values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueGraph {
    nodes: Vec<Node>,
}

impl ValueGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes allocated so far
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node, returning its stable identity
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize)
    }

    /// Resolve a node or report a foreign/dangling id
    pub fn expect(&self, id: NodeId) -> CodecResult<&Node> {
        self.get(id)
            .ok_or_else(|| CodecError::Internal(format!("dangling node id {id}")))
    }

    // ------------------------------------------------------------------
    // Convenience constructors
    // ------------------------------------------------------------------

    pub fn array(&mut self, items: Vec<Value>) -> Value {
        Value::Node(self.alloc(Node::Array(items)))
    }

    pub fn set(&mut self, items: Vec<Value>) -> Value {
        Value::Node(self.alloc(Node::Set(items)))
    }

    pub fn map(&mut self, pairs: Vec<(Value, Value)>) -> Value {
        Value::Node(self.alloc(Node::Map(pairs)))
    }

    pub fn object<S, I>(&mut self, entries: I) -> Value
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Value)>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Node(self.alloc(Node::Object {
            proto: None,
            entries,
        }))
    }

    pub fn prototyped<S, I>(&mut self, proto: Value, entries: I) -> Value
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Value)>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Node(self.alloc(Node::Object {
            proto: Some(proto),
            entries,
        }))
    }

    pub fn instance<S, I>(&mut self, class: impl Into<String>, entries: I) -> Value
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Value)>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Node(self.alloc(Node::Instance {
            class: class.into(),
            entries,
        }))
    }

    // ------------------------------------------------------------------
    // Mutation helpers (graph construction and decode loops)
    // ------------------------------------------------------------------

    /// Append an item to an array or set node
    pub fn push_item(&mut self, id: NodeId, value: Value) -> CodecResult<()> {
        match self.get_mut(id) {
            Some(Node::Array(items)) | Some(Node::Set(items)) => {
                items.push(value);
                Ok(())
            }
            Some(_) => Err(CodecError::Internal(format!(
                "node {id} does not hold a sequence"
            ))),
            None => Err(CodecError::Internal(format!("dangling node id {id}"))),
        }
    }

    /// Append a key/value pair to a map node
    pub fn push_pair(&mut self, id: NodeId, key: Value, value: Value) -> CodecResult<()> {
        match self.get_mut(id) {
            Some(Node::Map(pairs)) => {
                pairs.push((key, value));
                Ok(())
            }
            Some(_) => Err(CodecError::Internal(format!("node {id} is not a map"))),
            None => Err(CodecError::Internal(format!("dangling node id {id}"))),
        }
    }

    /// Append a string-keyed entry to an object or instance node
    pub fn insert_entry(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: Value,
    ) -> CodecResult<()> {
        match self.get_mut(id) {
            Some(Node::Object { entries, .. }) | Some(Node::Instance { entries, .. }) => {
                entries.push((key.into(), value));
                Ok(())
            }
            Some(_) => Err(CodecError::Internal(format!(
                "node {id} does not hold entries"
            ))),
            None => Err(CodecError::Internal(format!("dangling node id {id}"))),
        }
    }

    /// Look up an entry by key on an object or instance node
    pub fn entry(&self, id: NodeId, key: &str) -> Option<&Value> {
        match self.get(id)? {
            Node::Object { entries, .. } | Node::Instance { entries, .. } => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }
}
