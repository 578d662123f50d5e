/*!
 * Encode Options
 * Independent feature toggles for the encoder
 */

use crate::registry::ClassSpec;

/// Format features an encode call may enable
///
/// Each toggle is independent; the default encodes nothing beyond what is
/// explicitly registered. The registry itself is a separate parameter on
/// the encode entry points: passing `None` disables registry lookups.
#[derive(Debug, Default)]
pub struct EncodeOptions {
    /// Emit unregistered class instances under their own name instead of
    /// failing with a registry error
    pub allow_unknown_classes: bool,
    /// Treat any unregistered instance as a plain instance under its
    /// constructor name
    pub implicit_instances: bool,
    /// Honor `Object.proto` links through the prototyped-object grammar
    /// (textual form only)
    pub preserve_prototypes: bool,
    /// Fallback descriptor applied to instances the registry does not know;
    /// must carry a serialize hook
    pub universal: Option<ClassSpec>,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_unknown_classes(mut self) -> Self {
        self.allow_unknown_classes = true;
        self
    }

    pub fn implicit_instances(mut self) -> Self {
        self.implicit_instances = true;
        self
    }

    pub fn preserve_prototypes(mut self) -> Self {
        self.preserve_prototypes = true;
        self
    }

    pub fn with_universal(mut self, spec: ClassSpec) -> Self {
        self.universal = Some(spec);
        self
    }
}
