//! Script-adjustable runtime settings under `config:`.

use std::cell::Cell;
use std::rc::Rc;

use crate::persistence::ConfigNode;
use crate::runner::binding::manager::BindingManager;
use crate::runner::binding::provider::CapabilityProvider;
use crate::runner::ds::error::KosResult;
use crate::runner::ds::value::Value;

pub const CONFIG_NODE: &str = "config";
pub const DEFAULT_IPU: u32 = 150;
pub const MIN_IPU: u32 = 50;
pub const MAX_IPU: u32 = 2000;

pub fn create() -> Box<dyn CapabilityProvider> {
    Box::new(ConfigBindings::new())
}

pub struct ConfigBindings {
    /// Instructions the interpreter may run per update.
    ipu: Rc<Cell<u32>>,
    /// Whether the interpreter prints execution statistics.
    stat: Rc<Cell<bool>>,
}

impl ConfigBindings {
    pub fn new() -> Self {
        ConfigBindings {
            ipu: Rc::new(Cell::new(DEFAULT_IPU)),
            stat: Rc::new(Cell::new(false)),
        }
    }
}

impl Default for ConfigBindings {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_ipu(n: f64) -> u32 {
    n.round().max(MIN_IPU as f64).min(MAX_IPU as f64) as u32
}

impl CapabilityProvider for ConfigBindings {
    fn activate(&mut self, manager: &mut BindingManager) {
        let ipu = self.ipu.clone();
        manager.add_getter("config:ipu", move |_| Value::Number(ipu.get() as f64));
        let ipu = self.ipu.clone();
        manager.add_setter("config:ipu", move |_, value| {
            if let Some(n) = value.as_number() {
                ipu.set(clamp_ipu(n));
            }
        });

        let stat = self.stat.clone();
        manager.add_getter("config:stat", move |_| Value::Boolean(stat.get()));
        let stat = self.stat.clone();
        manager.add_setter("config:stat", move |_, value| {
            if let Some(b) = value.as_bool() {
                stat.set(b);
            }
        });
    }

    fn on_save(&self, node: &mut ConfigNode) {
        node.remove_nodes(CONFIG_NODE);
        let config = node.add_node(ConfigNode::new(CONFIG_NODE));
        config.add_value("ipu", self.ipu.get().to_string());
        config.add_value("stat", self.stat.get().to_string());
    }

    fn on_load(&mut self, node: &ConfigNode) -> KosResult<()> {
        if let Some(config) = node.get_node(CONFIG_NODE) {
            if let Some(ipu) = config.parse_value::<f64>("ipu")? {
                self.ipu.set(clamp_ipu(ipu));
            }
            if let Some(stat) = config.parse_value::<bool>("stat")? {
                self.stat.set(stat);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "config"
    }
}
