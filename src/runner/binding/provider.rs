//! The capability provider trait.

use crate::persistence::ConfigNode;
use crate::runner::binding::manager::BindingManager;
use crate::runner::ds::error::KosResult;

/// A unit of native functionality exposed into a CPU's namespace.
///
/// Providers are default-constructed by their registry factory and activated
/// once per binding manager. They must not rely on other providers having
/// been activated before them.
pub trait CapabilityProvider {
    /// Register getters, setters and functions.
    fn activate(&mut self, manager: &mut BindingManager);

    /// Called once per tick while the CPU is powered. Must not block.
    fn update(&mut self, _dt: f64) {}

    /// Write native state that has to survive a restart, replacing any
    /// child node an earlier save left in `node`.
    fn on_save(&self, _node: &mut ConfigNode) {}

    /// Restore what [`on_save`](Self::on_save) wrote. Called after
    /// activation.
    fn on_load(&mut self, _node: &ConfigNode) -> KosResult<()> {
        Ok(())
    }

    /// Human-readable name for this provider (for debugging/logging).
    fn name(&self) -> &str;
}
