/*!
 * Value Union
 *
 * The universal tagged union handled by the codec, plus the constant-time
 * shape classifier used once per composite in both directions, and the
 * cycle-safe deep equality used to state round-trip properties.
 */

use super::graph::{Node, ValueGraph};
use crate::core::types::NodeId;
use std::collections::HashSet;

/// A value handled by the codec
///
/// Scalars are inline; object-like values live in a [`ValueGraph`] and are
/// addressed by node id, which is what carries identity.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Raw byte sequence; an atomic leaf with no identity tracking
    Bytes(Vec<u8>),
    /// Object-like value resident in the graph
    Node(NodeId),
}

/// Constant-time shape classification of a value within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Undefined,
    Null,
    Bool,
    Number,
    Text,
    Bytes,
    Array,
    Set,
    Map,
    Object,
    Instance,
}

impl Value {
    /// Classify this value; `None` means a dangling node id
    pub fn kind(&self, graph: &ValueGraph) -> Option<ValueKind> {
        Some(match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Node(id) => match graph.get(*id)? {
                Node::Array(_) => ValueKind::Array,
                Node::Set(_) => ValueKind::Set,
                Node::Map(_) => ValueKind::Map,
                Node::Object { .. } => ValueKind::Object,
                Node::Instance { .. } => ValueKind::Instance,
            },
        })
    }

    #[inline]
    pub const fn is_node(&self) -> bool {
        matches!(self, Value::Node(_))
    }

    #[inline]
    pub const fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Scalar number equality where every NaN equals every NaN
///
/// Round-trips carry NaN through the wire bit-for-bit in the binary form
/// and as a literal token in the textual form; equality must not lose it.
#[inline]
fn number_eq(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

/// Deep structural equality between two values in (possibly different) graphs
///
/// Cycle-safe: a node pair already under comparison is assumed equal, which
/// is the coinductive reading of equality over rational trees. Shared
/// structure compares positionally; identity itself is asserted separately
/// by the round-trip tests.
pub fn deep_eq(graph_a: &ValueGraph, a: &Value, graph_b: &ValueGraph, b: &Value) -> bool {
    let mut in_progress = HashSet::new();
    deep_eq_inner(graph_a, a, graph_b, b, &mut in_progress)
}

fn deep_eq_inner(
    graph_a: &ValueGraph,
    a: &Value,
    graph_b: &ValueGraph,
    b: &Value,
    in_progress: &mut HashSet<(NodeId, NodeId)>,
) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => number_eq(*x, *y),
        (Value::Text(x), Value::Text(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Node(x), Value::Node(y)) => {
            if !in_progress.insert((*x, *y)) {
                return true;
            }
            let result = match (graph_a.get(*x), graph_b.get(*y)) {
                (Some(Node::Array(xs)), Some(Node::Array(ys)))
                | (Some(Node::Set(xs)), Some(Node::Set(ys))) => {
                    xs.len() == ys.len()
                        && xs.iter().zip(ys).all(|(xi, yi)| {
                            deep_eq_inner(graph_a, xi, graph_b, yi, in_progress)
                        })
                }
                (Some(Node::Map(xs)), Some(Node::Map(ys))) => {
                    xs.len() == ys.len()
                        && xs.iter().zip(ys).all(|((xk, xv), (yk, yv))| {
                            deep_eq_inner(graph_a, xk, graph_b, yk, in_progress)
                                && deep_eq_inner(graph_a, xv, graph_b, yv, in_progress)
                        })
                }
                (
                    Some(Node::Object {
                        proto: px,
                        entries: xs,
                    }),
                    Some(Node::Object {
                        proto: py,
                        entries: ys,
                    }),
                ) => {
                    let protos_match = match (px, py) {
                        (None, None) => true,
                        (Some(px), Some(py)) => {
                            deep_eq_inner(graph_a, px, graph_b, py, in_progress)
                        }
                        _ => false,
                    };
                    protos_match && entries_eq(graph_a, xs, graph_b, ys, in_progress)
                }
                (
                    Some(Node::Instance {
                        class: cx,
                        entries: xs,
                    }),
                    Some(Node::Instance {
                        class: cy,
                        entries: ys,
                    }),
                ) => cx == cy && entries_eq(graph_a, xs, graph_b, ys, in_progress),
                _ => false,
            };
            in_progress.remove(&(*x, *y));
            result
        }
        _ => false,
    }
}

fn entries_eq(
    graph_a: &ValueGraph,
    xs: &[(String, Value)],
    graph_b: &ValueGraph,
    ys: &[(String, Value)],
    in_progress: &mut HashSet<(NodeId, NodeId)>,
) -> bool {
    xs.len() == ys.len()
        && xs.iter().zip(ys).all(|((xk, xv), (yk, yv))| {
            xk == yk && deep_eq_inner(graph_a, xv, graph_b, yv, in_progress)
        })
}
