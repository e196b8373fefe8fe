//! Built-in capability providers.
//!
//! These providers expose CPU and vessel-control state to scripts. Each is
//! listed once in [`builtin_providers`], which seeds
//! [`ProviderRegistry::with_builtins`](crate::runner::binding::registry::ProviderRegistry::with_builtins).

pub mod cpu_core;
pub mod flight;
pub mod settings;
pub mod time;

use crate::runner::binding::registry::ProviderDescriptor;

/// Context of a CPU running inside the flight simulation.
pub const FLIGHT_CONTEXT: &str = "ksp";

/// Descriptor table for every built-in provider.
pub fn builtin_providers() -> Vec<ProviderDescriptor> {
    vec![
        ProviderDescriptor::new("core", cpu_core::create),
        ProviderDescriptor::new("time", time::create),
        ProviderDescriptor::new("config", settings::create).with_contexts(&[FLIGHT_CONTEXT]),
        ProviderDescriptor::new("flightcontrols", flight::create).with_contexts(&[FLIGHT_CONTEXT]),
    ]
}
