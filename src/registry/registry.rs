/*!
 * Class Registry
 * Name-to-descriptor lookup, queried by encoder and decoder
 */

use super::descriptor::ClassSpec;
use ahash::RandomState;
use std::collections::HashMap;
use tracing::debug;

/// Mapping from class name to descriptor
///
/// Built once, then shared read-only into any number of encode/decode
/// calls; it must not be mutated mid-call. There is no ambient global
/// registry: every call receives its registry explicitly.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassSpec, RandomState>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its class name, replacing any previous one
    pub fn register(&mut self, spec: ClassSpec) -> &mut Self {
        debug!(class = spec.name(), "registering class descriptor");
        self.classes.insert(spec.name().to_string(), spec);
        self
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&ClassSpec> {
        self.classes.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
