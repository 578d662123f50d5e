/*!
 * JSON Debug Bridge
 *
 * Lossy rendering of a value graph as `serde_json::Value`, for debugging
 * output and the CLI inspector. This is NOT a wire format: identity
 * collapses to `{"$ref": n}` markers on revisit, non-finite numbers become
 * literal strings, and sets/maps/instances are wrapped in tagged objects.
 */

use super::graph::{Node, ValueGraph};
use super::value::Value;
use crate::core::errors::CodecError;
use crate::core::types::NodeId;
use crate::core::CodecResult;
use ahash::RandomState;
use std::collections::HashMap;

/// Result type for JSON bridge operations
pub type JsonResult<T> = CodecResult<T>;

/// Render a value as JSON for inspection
///
/// Nodes are numbered in first-visit order; a node seen again renders as
/// `{"$ref": <ordinal>}`, which keeps cyclic graphs finite.
pub fn to_json(graph: &ValueGraph, value: &Value) -> JsonResult<serde_json::Value> {
    let mut seen = HashMap::with_hasher(RandomState::new());
    render(graph, value, &mut seen)
}

/// Render a value as a compact JSON string
#[inline]
pub fn to_json_string(graph: &ValueGraph, value: &Value) -> JsonResult<String> {
    serde_json::to_string(&to_json(graph, value)?)
        .map_err(|e| CodecError::Internal(format!("JSON rendering failed: {e}")))
}

/// Render a value as a pretty-printed JSON string
#[inline]
pub fn to_json_string_pretty(graph: &ValueGraph, value: &Value) -> JsonResult<String> {
    serde_json::to_string_pretty(&to_json(graph, value)?)
        .map_err(|e| CodecError::Internal(format!("JSON rendering failed: {e}")))
}

fn render(
    graph: &ValueGraph,
    value: &Value,
    seen: &mut HashMap<NodeId, usize, RandomState>,
) -> JsonResult<serde_json::Value> {
    Ok(match value {
        Value::Undefined | Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => match serde_json::Number::from_f64(*n) {
            Some(number) => serde_json::Value::Number(number),
            // NaN and the infinities are valid codec numbers but not JSON
            None => serde_json::Value::String(format_special(*n)),
        },
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(bytes) => serde_json::Value::String(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            bytes,
        )),
        Value::Node(id) => {
            if let Some(ordinal) = seen.get(id) {
                return Ok(serde_json::json!({ "$ref": ordinal }));
            }
            let ordinal = seen.len();
            seen.insert(*id, ordinal);
            match graph.expect(*id)? {
                Node::Array(items) => {
                    let rendered: Vec<_> = items
                        .iter()
                        .map(|item| render(graph, item, seen))
                        .collect::<CodecResult<_>>()?;
                    serde_json::Value::Array(rendered)
                }
                Node::Set(items) => {
                    let rendered: Vec<_> = items
                        .iter()
                        .map(|item| render(graph, item, seen))
                        .collect::<CodecResult<_>>()?;
                    serde_json::json!({ "$set": rendered })
                }
                Node::Map(pairs) => {
                    let rendered: Vec<_> = pairs
                        .iter()
                        .map(|(k, v)| {
                            Ok(serde_json::Value::Array(vec![
                                render(graph, k, seen)?,
                                render(graph, v, seen)?,
                            ]))
                        })
                        .collect::<CodecResult<_>>()?;
                    serde_json::json!({ "$map": rendered })
                }
                Node::Object { entries, .. } => {
                    let mut object = serde_json::Map::new();
                    for (key, entry) in entries {
                        object.insert(key.clone(), render(graph, entry, seen)?);
                    }
                    serde_json::Value::Object(object)
                }
                Node::Instance { class, entries } => {
                    let mut object = serde_json::Map::new();
                    object.insert("$class".into(), serde_json::Value::String(class.clone()));
                    for (key, entry) in entries {
                        object.insert(key.clone(), render(graph, entry, seen)?);
                    }
                    serde_json::Value::Object(object)
                }
            }
        }
    })
}

fn format_special(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n > 0.0 {
        "Infinity".into()
    } else {
        "-Infinity".into()
    }
}
