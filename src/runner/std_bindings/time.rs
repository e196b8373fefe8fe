//! Clock readings.
//!
//! `sessiontime` follows the CPU clock, which runs whenever the unit is
//! ticked. `time:seconds` and `time:ticks` only advance while the CPU is
//! powered, and survive a save.

use std::cell::Cell;
use std::rc::Rc;

use crate::persistence::ConfigNode;
use crate::runner::binding::manager::BindingManager;
use crate::runner::binding::provider::CapabilityProvider;
use crate::runner::ds::error::KosResult;
use crate::runner::ds::value::Value;

pub const TIME_NODE: &str = "time";

pub fn create() -> Box<dyn CapabilityProvider> {
    Box::new(TimeBindings::default())
}

#[derive(Default)]
pub struct TimeBindings {
    seconds: Rc<Cell<f64>>,
    ticks: Rc<Cell<u64>>,
}

impl CapabilityProvider for TimeBindings {
    fn activate(&mut self, manager: &mut BindingManager) {
        manager.add_getter("sessiontime", |cpu| Value::Number(cpu.session_time()));

        let seconds = self.seconds.clone();
        manager.add_getter("time:seconds", move |_| Value::Number(seconds.get()));

        let ticks = self.ticks.clone();
        manager.add_getter("time:ticks", move |_| Value::Number(ticks.get() as f64));
    }

    fn update(&mut self, dt: f64) {
        self.seconds.set(self.seconds.get() + dt);
        self.ticks.set(self.ticks.get() + 1);
    }

    fn on_save(&self, node: &mut ConfigNode) {
        node.remove_nodes(TIME_NODE);
        let time = node.add_node(ConfigNode::new(TIME_NODE));
        time.add_value("seconds", self.seconds.get().to_string());
        time.add_value("ticks", self.ticks.get().to_string());
    }

    fn on_load(&mut self, node: &ConfigNode) -> KosResult<()> {
        if let Some(time) = node.get_node(TIME_NODE) {
            if let Some(seconds) = time.parse_value::<f64>("seconds")? {
                self.seconds.set(seconds);
            }
            if let Some(ticks) = time.parse_value::<u64>("ticks")? {
                self.ticks.set(ticks);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "time"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::binding::registry::{ProviderDescriptor, ProviderRegistry};
    use crate::runner::config::RuntimeConfig;
    use crate::runner::cpu::{Cpu, CpuMode};

    fn cpu() -> Cpu {
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderDescriptor::new("time", create));
        let mut cpu = Cpu::new(1, &RuntimeConfig::default());
        cpu.boot(&registry);
        cpu
    }

    #[test]
    fn test_powered_time_only_counts_powered_ticks() {
        let mut cpu = cpu();
        cpu.update(0.5);
        cpu.set_mode(CpuMode::Off);
        cpu.update(0.5);
        assert_eq!(cpu.get_value("sessiontime").unwrap(), Value::Number(1.0));
        assert_eq!(cpu.get_value("time:seconds").unwrap(), Value::Number(0.5));
        assert_eq!(cpu.get_value("time:ticks").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_time_survives_save() {
        let mut cpu = cpu();
        cpu.update(2.0);
        cpu.update(2.0);
        let mut node = ConfigNode::new("MODULE");
        cpu.on_save(&mut node);

        let mut restored = self::cpu();
        restored.on_load(&node).unwrap();
        assert_eq!(restored.get_value("time:seconds").unwrap(), Value::Number(4.0));
        assert_eq!(restored.get_value("time:ticks").unwrap(), Value::Number(2.0));
    }
}
