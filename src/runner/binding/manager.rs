use std::rc::Rc;

use log::debug;

use crate::persistence::ConfigNode;
use crate::runner::binding::provider::CapabilityProvider;
use crate::runner::binding::registry::ProviderRegistry;
use crate::runner::cpu::Cpu;
use crate::runner::ds::error::KosResult;
use crate::runner::ds::value::Value;
use crate::runner::ds::variable::{BoundVariable, SharedVariableTable, Variable};

/// Separates a binding's root name from its suffix, as in `config:ipu`.
pub const SCOPE_DELIMITER: char = ':';

/// Activates the providers valid for one context against one CPU's variable
/// table and drives their per-tick updates.
///
/// The provider set is fixed once construction returns.
pub struct BindingManager {
    variables: SharedVariableTable,
    context: String,
    providers: Vec<Box<dyn CapabilityProvider>>,
}

impl BindingManager {
    /// Build a manager from the built-in providers.
    pub fn new(variables: SharedVariableTable, context: &str) -> Self {
        Self::with_registry(variables, context, &ProviderRegistry::with_builtins())
    }

    /// Build a manager from `registry`, activating every provider whose
    /// context tags are empty or include `context`. Finding none is fine.
    pub fn with_registry(
        variables: SharedVariableTable,
        context: &str,
        registry: &ProviderRegistry,
    ) -> Self {
        let mut manager = BindingManager {
            variables,
            context: context.to_string(),
            providers: Vec::new(),
        };
        for descriptor in registry.matching(context) {
            let mut provider = descriptor.instantiate();
            provider.activate(&mut manager);
            debug!(
                "activated provider {} for context {:?}",
                provider.name(),
                context
            );
            manager.providers.push(provider);
        }
        manager
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn variables(&self) -> SharedVariableTable {
        self.variables.clone()
    }

    /// Names of the activated providers, in activation order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Install a native getter.
    ///
    /// Tries `name` exactly, then its root before the first `:`. A bound slot
    /// found either way gets the getter; a plain one is left alone. With no
    /// slot at all, a bound slot named `name` (untruncated, case kept) is
    /// created.
    pub fn add_getter<F>(&mut self, name: &str, getter: F)
    where
        F: Fn(&Cpu) -> Value + 'static,
    {
        let getter = Rc::new(getter);
        let mut table = self.variables.borrow_mut();
        let root = name.split(SCOPE_DELIMITER).next().unwrap_or(name);
        let resolved = if table.contains(name) {
            Some(name)
        } else if table.contains(root) {
            Some(root)
        } else {
            None
        };
        match resolved {
            Some(key) => {
                if let Some(Variable::Bound(bound)) = table.find_mut(key) {
                    bound.set_getter(getter);
                }
            }
            None => table.insert_bound(name, BoundVariable::with_getter(getter)),
        }
    }

    /// Install a native setter.
    ///
    /// Resolves the lower-cased `name` only; there is no `:` fallback. A bound
    /// slot gets the setter, a plain one is left alone, and a missing one is
    /// created under the lower-cased name.
    pub fn add_setter<F>(&mut self, name: &str, setter: F)
    where
        F: Fn(&Cpu, Value) + 'static,
    {
        let setter = Rc::new(setter);
        let name = name.to_lowercase();
        let mut table = self.variables.borrow_mut();
        match table.find_mut(&name) {
            Some(Variable::Bound(bound)) => bound.set_setter(setter),
            Some(Variable::Plain(_)) => {}
            None => table.insert_bound(name, BoundVariable::with_setter(setter)),
        }
    }

    /// Register a native function under the lower-cased `name`, replacing
    /// any earlier one.
    pub fn add_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&Cpu, Vec<Value>) -> KosResult<Value> + 'static,
    {
        self.variables
            .borrow_mut()
            .insert_function(name.to_lowercase(), Rc::new(function));
    }

    /// Fan the tick out to every provider, in activation order.
    pub fn update(&mut self, dt: f64) {
        for provider in self.providers.iter_mut() {
            provider.update(dt);
        }
    }

    pub fn on_save(&self, node: &mut ConfigNode) {
        for provider in &self.providers {
            provider.on_save(node);
        }
    }

    pub fn on_load(&mut self, node: &ConfigNode) -> KosResult<()> {
        for provider in self.providers.iter_mut() {
            provider.on_load(node)?;
        }
        Ok(())
    }
}
