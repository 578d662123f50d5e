/*!
 * Class Registry
 * Name-to-behavior mapping for class instances: descriptors with
 * serialize/construct/finalize hooks, queried by both codec directions
 */

pub mod descriptor;
pub mod registry;

pub use descriptor::{
    ClassSpec, ConstructFn, ConstructRequest, ConstructStyle, FinalizeFn, SerializeFn, Serialized,
};
pub use registry::ClassRegistry;
