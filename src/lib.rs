//! # kos - binding and resolution core of an embedded scripting runtime
//!
//! This crate lets native host capabilities (sensors, controls, hardware
//! state) appear as variables and functions in a scripting virtual machine's
//! global namespace, and keeps the set of storage volumes visible to that
//! machine in sync with the physical assembly it lives in.
//!
//! ## Quick Start
//!
//! ### Binding native state into a CPU
//!
//! ```
//! use kos::runner::config::RuntimeConfig;
//! use kos::runner::cpu::Cpu;
//! use kos::runner::binding::registry::ProviderRegistry;
//! use kos::runner::ds::value::Value;
//!
//! let mut cpu = Cpu::new(1, &RuntimeConfig::default());
//! cpu.boot(&ProviderRegistry::with_builtins());
//!
//! // Bound by the built-in config provider under the "ksp" context
//! cpu.set_value("config:ipu", Value::Number(500.0));
//! assert_eq!(cpu.get_value("config:ipu").unwrap(), Value::Number(500.0));
//! ```
//!
//! ### Writing a capability provider
//!
//! ```
//! use kos::runner::binding::manager::BindingManager;
//! use kos::runner::binding::provider::CapabilityProvider;
//! use kos::runner::binding::registry::{ProviderDescriptor, ProviderRegistry};
//! use kos::runner::config::RuntimeConfig;
//! use kos::runner::cpu::Cpu;
//! use kos::runner::ds::value::Value;
//!
//! struct AltitudeBindings;
//!
//! impl CapabilityProvider for AltitudeBindings {
//!     fn activate(&mut self, manager: &mut BindingManager) {
//!         manager.add_getter("altitude", |_cpu| Value::Number(70000.0));
//!     }
//!
//!     fn name(&self) -> &str { "altitude" }
//! }
//!
//! fn altitude() -> Box<dyn CapabilityProvider> {
//!     Box::new(AltitudeBindings)
//! }
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register(ProviderDescriptor::new("altitude", altitude).with_contexts(&["ksp"]));
//!
//! let mut cpu = Cpu::new(1, &RuntimeConfig::default());
//! cpu.boot(&registry);
//! assert_eq!(cpu.get_value("altitude").unwrap(), Value::Number(70000.0));
//! ```
//!
//! ## Architecture
//!
//! - **[`persistence`]** - Persisted node tree, its text format and the ID store
//! - **[`runner`]** - The CPU and everything bound into it
//!   - **[`runner::binding`]** - Provider discovery, activation and name resolution
//!   - **[`runner::std_bindings`]** - Built-in capability providers
//!   - **[`runner::ds`]** - Values, errors, the variable table and volumes
//! - **[`module`]** - The host-facing processor unit and volume aggregation

#[macro_use]
extern crate lazy_static;

pub mod module;
pub mod persistence;
pub mod runner;
