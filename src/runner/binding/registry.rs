//! Provider registry: the table binding managers discover providers from.

use std::fmt;

use crate::runner::binding::provider::CapabilityProvider;
use crate::runner::std_bindings::builtin_providers;

/// Builds a fresh, default-constructed provider.
pub type ProviderFactory = fn() -> Box<dyn CapabilityProvider>;

lazy_static! {
    static ref BUILTIN_PROVIDERS: Vec<ProviderDescriptor> = builtin_providers();
}

/// Metadata tag of one provider variant.
#[derive(Clone)]
pub struct ProviderDescriptor {
    name: String,
    /// Contexts the provider is valid in. Empty means every context.
    contexts: Vec<String>,
    factory: ProviderFactory,
}

impl ProviderDescriptor {
    pub fn new(name: impl Into<String>, factory: ProviderFactory) -> Self {
        ProviderDescriptor {
            name: name.into(),
            contexts: Vec::new(),
            factory,
        }
    }

    /// Restrict the provider to the given contexts.
    pub fn with_contexts(mut self, contexts: &[&str]) -> Self {
        self.contexts = contexts.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    /// Eligible iff the tag set is empty or contains `context`.
    pub fn applies_to(&self, context: &str) -> bool {
        self.applies_to_any(&[context])
    }

    /// Eligible iff the tag set is empty or intersects `contexts`.
    pub fn applies_to_any(&self, contexts: &[&str]) -> bool {
        self.contexts.is_empty() || self.contexts.iter().any(|c| contexts.contains(&c.as_str()))
    }

    pub fn instantiate(&self) -> Box<dyn CapabilityProvider> {
        (self.factory)()
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("contexts", &self.contexts)
            .finish()
    }
}

/// Ordered set of provider descriptors, unique by name.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    descriptors: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        ProviderRegistry {
            descriptors: Vec::new(),
        }
    }

    /// Create a registry holding the built-in providers.
    pub fn with_builtins() -> Self {
        ProviderRegistry {
            descriptors: BUILTIN_PROVIDERS.clone(),
        }
    }

    /// Register a provider. A descriptor with the same name is replaced in
    /// place, so one variant never yields two instances.
    pub fn register(&mut self, descriptor: ProviderDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|d| d.name == descriptor.name)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.descriptors.len();
        self.descriptors.retain(|d| d.name != name);
        before != self.descriptors.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| d.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&ProviderDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Descriptors eligible for `context`, in registration order.
    pub fn matching<'a>(&'a self, context: &'a str) -> impl Iterator<Item = &'a ProviderDescriptor> + 'a {
        self.descriptors.iter().filter(move |d| d.applies_to(context))
    }

    pub fn descriptors(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::binding::manager::BindingManager;

    struct Nop;

    impl CapabilityProvider for Nop {
        fn activate(&mut self, _manager: &mut BindingManager) {}
        fn name(&self) -> &str {
            "nop"
        }
    }

    fn nop() -> Box<dyn CapabilityProvider> {
        Box::new(Nop)
    }

    #[test]
    fn test_empty_tag_set_applies_everywhere() {
        let d = ProviderDescriptor::new("nop", nop);
        assert!(d.applies_to("ksp"));
        assert!(d.applies_to(""));
        assert!(d.applies_to_any(&[]));
    }

    #[test]
    fn test_tagged_descriptor_needs_intersection() {
        let d = ProviderDescriptor::new("nop", nop).with_contexts(&["ksp", "editor"]);
        assert!(d.applies_to("ksp"));
        assert!(d.applies_to("editor"));
        assert!(!d.applies_to("KSP"));
        assert!(!d.applies_to("testing"));
        assert!(d.applies_to_any(&["testing", "editor"]));
        assert!(!d.applies_to_any(&[]));
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderDescriptor::new("nop", nop));
        registry.register(ProviderDescriptor::new("nop", nop).with_contexts(&["ksp"]));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("nop").unwrap().contexts(), &["ksp".to_string()]);
        assert_eq!(registry.matching("editor").count(), 0);
        assert!(registry.unregister("nop"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = ProviderRegistry::with_builtins();
        for name in &["core", "time", "config", "flightcontrols"] {
            assert!(registry.contains(name), "missing builtin {}", name);
        }
    }
}
