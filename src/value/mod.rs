/*!
 * Value Model
 *
 * The tagged union the codec serializes, the arena that carries object
 * identity, and debugging helpers:
 * - `Value` + `ValueKind` classifier
 * - `ValueGraph` arena (`NodeId` is identity)
 * - cycle-safe `deep_eq` for structural comparison
 * - lossy JSON rendering for inspection
 */

pub mod graph;
pub mod json;
pub mod value;

pub use graph::{Node, ValueGraph};
pub use json::{to_json, to_json_string, to_json_string_pretty};
pub use value::{deep_eq, Value, ValueKind};
