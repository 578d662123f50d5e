/*!
 * graphwire
 *
 * Identity-preserving object-graph codec with two wire forms:
 * - a compact binary encoding (one-byte tags, big-endian scalars)
 * - a printable textual encoding (one-character tags, separator-delimited
 *   numerals)
 *
 * Values live in a [`ValueGraph`] arena; shared and cyclic structure is
 * carried on the wire through a per-call reference table, so a graph
 * decodes with the same identities it was encoded with. Class instances
 * round-trip through a [`ClassRegistry`] of descriptors with
 * serialize/construct/finalize hooks.
 */

pub mod core;
pub mod decode;
pub mod encode;
pub mod fsio;
pub mod registry;
pub mod value;
pub mod wire;

// Re-exports
pub use crate::core::errors::{CodecError, FormatError, RegistryError, Result, SerializableError};
pub use crate::core::types::{ClassName, NodeId, SlotId};
pub use decode::{Decoded, DecodeOptions};
pub use encode::EncodeOptions;
pub use registry::{ClassRegistry, ClassSpec, ConstructRequest, ConstructStyle, Serialized};
pub use value::{deep_eq, Node, Value, ValueGraph, ValueKind};
