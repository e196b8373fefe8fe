//! Interfaces the host simulation implements for a processor unit.

use std::fmt;

use crate::module::processor::SharedProcessor;

/// Resource a powered CPU draws from its part.
pub const ELECTRIC_CHARGE: &str = "ElectricCharge";

pub type PartId = u32;

/// Scene a part starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartState {
    None,
    Editor,
    PreLaunch,
    Landed,
    Splashed,
    Flying,
    Orbital,
    Docked,
}

impl StartState {
    /// Whether a processor unit should boot when starting in this state.
    pub fn is_flight(self) -> bool {
        !matches!(self, StartState::None | StartState::Editor)
    }
}

/// The part a processor unit is mounted on.
pub trait HostPart {
    fn id(&self) -> PartId;

    /// Set once the part has been destroyed; it never clears.
    fn is_destroyed(&self) -> bool;

    /// Snapshot of the members of the vessel this part belongs to, itself
    /// included. `None` while the part is not attached to a vessel.
    fn vessel(&self) -> Option<Vec<PartRef>>;

    /// Real time elapsed since the previous update, in seconds.
    fn delta_time(&self) -> f64;

    /// Simulation time the power model advances by per update, in seconds.
    fn fixed_delta_time(&self) -> f64;

    /// Ask for `amount` of `resource` and return how much was granted.
    fn request_resource(&self, resource: &str, amount: f64) -> f64;
}

/// Something a vessel member carries.
#[derive(Clone)]
pub enum PartModule {
    Processor(SharedProcessor),
    Other(String),
}

impl fmt::Debug for PartModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartModule::Processor(unit) => match unit.try_borrow() {
                Ok(unit) => write!(f, "Processor({})", unit.unit_id()),
                Err(_) => write!(f, "Processor(<busy>)"),
            },
            PartModule::Other(name) => write!(f, "Other({})", name),
        }
    }
}

/// One member of a vessel snapshot.
#[derive(Debug, Clone)]
pub struct PartRef {
    pub id: PartId,
    pub modules: Vec<PartModule>,
}

impl PartRef {
    pub fn new(id: PartId) -> Self {
        PartRef {
            id,
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: PartModule) -> Self {
        self.modules.push(module);
        self
    }

    /// The first processor unit on this member, if any.
    pub fn processor(&self) -> Option<&SharedProcessor> {
        self.modules.iter().find_map(|m| match m {
            PartModule::Processor(unit) => Some(unit),
            PartModule::Other(_) => None,
        })
    }
}

/// Interactive terminal windows, one per processor unit.
pub trait TerminalHost {
    fn open_window(&self, unit_id: i64);
    fn close_window(&self, unit_id: i64);
}

/// A terminal host that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTerminal;

impl TerminalHost for NullTerminal {
    fn open_window(&self, _unit_id: i64) {}
    fn close_window(&self, _unit_id: i64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_states() {
        assert!(!StartState::None.is_flight());
        assert!(!StartState::Editor.is_flight());
        assert!(StartState::PreLaunch.is_flight());
        assert!(StartState::Orbital.is_flight());
    }

    #[test]
    fn test_part_without_processor() {
        let part = PartRef::new(3).with_module(PartModule::Other("engine".to_string()));
        assert!(part.processor().is_none());
    }
}
