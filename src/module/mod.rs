//! The host-facing side: a processor unit living on a part of a vessel,
//! driven by host lifecycle callbacks.
//!
//! ```text
//! host ── on_start / on_load / update / on_save ──▶ ProcessorUnit
//!                                                     │ owns
//!                                                     ├─ Cpu ── BindingManager ── providers
//!                                                     ├─ local Volume ("harddisk")
//!                                                     └─ VolumeAggregator ── sibling units' Volumes
//! ```

pub mod host;
pub mod processor;
pub mod volumes;

pub use host::{HostPart, PartId, PartModule, PartRef, StartState, TerminalHost};
pub use processor::{ProcessorUnit, SharedProcessor};
pub use volumes::VolumeAggregator;
