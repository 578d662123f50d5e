/*!
 * Decode Options
 * Independent feature toggles for the decoder
 */

use crate::registry::ClassSpec;
use crate::value::Value;

/// Format features a decode call may enable
///
/// The registry is a separate parameter on the decode entry points;
/// passing `None` disables registry lookups entirely.
#[derive(Debug, Default)]
pub struct DecodeOptions {
    /// Substitute a placeholder instance tagging the original class name
    /// when a class has no descriptor, instead of failing
    pub allow_unknown_classes: bool,
    /// Fallback descriptor for constructed instances the registry does
    /// not know; must carry a construct hook
    pub universal: Option<ClassSpec>,
    /// Out-of-band value handed to construct and finalize hooks that
    /// request it; must be a scalar (it precedes the output graph)
    pub context: Option<Value>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_unknown_classes(mut self) -> Self {
        self.allow_unknown_classes = true;
        self
    }

    pub fn with_universal(mut self, spec: ClassSpec) -> Self {
        self.universal = Some(spec);
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}
