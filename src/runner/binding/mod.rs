//! Capability providers and the binding manager.
//!
//! A capability provider exposes native state to scripts by registering
//! getters, setters and functions into a CPU's variable table. Providers are
//! not wired up by hand: each is described once in a [`ProviderRegistry`]
//! with the contexts it is valid in, and a [`BindingManager`] built for a
//! context instantiates every matching provider exactly once.
//!
//! ```text
//! Cpu::boot(registry)
//!      ↓
//! BindingManager::with_registry(variables, "ksp", registry)
//!      ↓
//! for each descriptor whose contexts are empty or contain "ksp":
//!     provider = (descriptor.factory)()
//!     provider.activate(&mut manager)   → add_getter / add_setter / add_function
//!      ↓
//! Cpu::update(dt) → manager.update(dt) → provider.update(dt) for each provider
//! ```
//!
//! ## Name resolution
//!
//! Getters and setters resolve their slot differently:
//!
//! - [`BindingManager::add_getter`] looks the name up exactly, then retries
//!   with everything from the first `:` cut off. It never changes case.
//! - [`BindingManager::add_setter`] lower-cases the name and looks it up
//!   exactly. It never cuts at `:`.
//!
//! Both create a new bound slot when nothing is found and leave plain slots
//! alone.

pub mod manager;
pub mod provider;
pub mod registry;

pub use manager::BindingManager;
pub use provider::CapabilityProvider;
pub use registry::{ProviderDescriptor, ProviderRegistry};
