/*!
 * Core Types
 * Common types used across the codec
 */

/// Reference-table slot identifier, assigned in first-encounter order
/// within a single encode or decode call
pub type SlotId = u32;

/// Arena index of an object-like value inside a [`crate::value::ValueGraph`]
pub type NodeId = u32;

/// Class name as carried on the wire
pub type ClassName = String;

/// Common result type for codec operations
pub type CodecResult<T> = std::result::Result<T, super::errors::CodecError>;
