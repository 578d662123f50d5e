/*!
 * Encoder
 *
 * Depth-first, pre-order emission of the wire grammar from a value graph:
 * - `binary`: compact byte form
 * - `text`: printable character form
 *
 * Both forms share the identity protocol in `refs` and the class dispatch
 * below; the grammar itself is per-form.
 */

pub mod binary;
pub mod options;
pub mod refs;
pub mod text;

pub use options::EncodeOptions;

use crate::core::errors::RegistryError;
use crate::core::CodecResult;
use crate::registry::{ClassRegistry, ClassSpec};

/// How one instance will be written
pub(crate) enum InstanceRoute<'a> {
    /// Key-assignment instance under its class name
    Plain,
    /// Serializer-driven constructed instance
    Constructed(&'a ClassSpec),
}

impl std::fmt::Debug for InstanceRoute<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceRoute::Plain => f.write_str("Plain"),
            InstanceRoute::Constructed(_) => f.write_str("Constructed(..)"),
        }
    }
}

/// Class dispatch for an instance value, in precedence order: registered
/// descriptor, universal fallback, implicit/unknown plain emission
pub(crate) fn instance_route<'a>(
    class: &str,
    registry: Option<&'a ClassRegistry>,
    options: &'a EncodeOptions,
) -> CodecResult<InstanceRoute<'a>> {
    if let Some(spec) = registry.and_then(|r| r.get(class)) {
        if spec.has_serializer() {
            return Ok(InstanceRoute::Constructed(spec));
        }
        return Ok(InstanceRoute::Plain);
    }
    if let Some(universal) = options.universal.as_ref() {
        if universal.has_serializer() {
            return Ok(InstanceRoute::Constructed(universal));
        }
        return Err(RegistryError::NotSerializable(class.to_string()).into());
    }
    if options.implicit_instances || options.allow_unknown_classes {
        return Ok(InstanceRoute::Plain);
    }
    Err(RegistryError::UnknownClass(class.to_string()).into())
}
