//! The CPU: owner of a variable table, a binding manager and the volumes a
//! script can see.
//!
//! The instruction interpreter lives elsewhere; this type is the surface it
//! resolves names against, plus the power and clock state the host drives.

use std::fmt;
use std::str::FromStr;

use log::{debug, info};

use crate::module::host::{HostPart, ELECTRIC_CHARGE};
use crate::persistence::ConfigNode;
use crate::runner::binding::manager::BindingManager;
use crate::runner::binding::registry::ProviderRegistry;
use crate::runner::config::RuntimeConfig;
use crate::runner::ds::error::{KosError, KosResult};
use crate::runner::ds::value::Value;
use crate::runner::ds::variable::{NativeFunction, SharedVariableTable, Variable, VariableTable};
use crate::runner::ds::volume::{SharedVolume, Volume};

pub const VARIABLES_NODE: &str = "variables";
pub const VARIABLE_NODE: &str = "variable";
pub const MODE_KEY: &str = "cpuMode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuMode {
    Off,
    /// Powered on but not getting enough electric charge.
    Starved,
    Ready,
}

impl CpuMode {
    pub fn is_powered(self) -> bool {
        self != CpuMode::Off
    }
}

impl fmt::Display for CpuMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CpuMode::Off => "OFF",
            CpuMode::Starved => "STARVED",
            CpuMode::Ready => "READY",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CpuMode {
    type Err = KosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OFF" => Ok(CpuMode::Off),
            "STARVED" => Ok(CpuMode::Starved),
            "READY" => Ok(CpuMode::Ready),
            _ => Err(KosError::InvalidValue {
                key: MODE_KEY.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

pub struct Cpu {
    unit_id: i64,
    context: String,
    mode: CpuMode,
    /// Mode to return to when powered back on.
    last_powered_mode: CpuMode,
    power_draw_per_second: f64,
    variables: SharedVariableTable,
    bindings: Option<BindingManager>,
    archive: SharedVolume,
    hard_disk: Option<SharedVolume>,
    volumes: Vec<SharedVolume>,
    session_time: f64,
    boot_count: u32,
}

impl Cpu {
    /// A CPU for processor unit `unit_id`, bound to the configured context.
    /// Nothing is bound until [`boot`](Self::boot).
    pub fn new(unit_id: i64, config: &RuntimeConfig) -> Self {
        let archive = Volume::archive(config.archive_name.as_str()).into_shared();
        Cpu {
            unit_id,
            context: config.context.clone(),
            mode: CpuMode::Ready,
            last_powered_mode: CpuMode::Ready,
            power_draw_per_second: config.power_draw_per_second,
            variables: VariableTable::new().into_shared(),
            bindings: None,
            archive: archive.clone(),
            hard_disk: None,
            volumes: vec![archive],
            session_time: 0.0,
            boot_count: 0,
        }
    }

    /// Install the providers for this CPU's context and mount the volumes
    /// attached so far. Booting again rebuilds the bindings from scratch.
    pub fn boot(&mut self, registry: &ProviderRegistry) {
        self.variables.borrow_mut().clear();
        let manager = BindingManager::with_registry(self.variables.clone(), &self.context, registry);
        info!(
            "cpu {} booted in context {:?} with {} providers",
            self.unit_id,
            self.context,
            manager.provider_count()
        );
        self.bindings = Some(manager);
        let mut volumes = vec![self.archive.clone()];
        if let Some(disk) = &self.hard_disk {
            volumes.push(disk.clone());
        }
        self.volumes = volumes;
        self.session_time = 0.0;
        self.boot_count += 1;
    }

    pub fn is_booted(&self) -> bool {
        self.bindings.is_some()
    }

    pub fn boot_count(&self) -> u32 {
        self.boot_count
    }

    pub fn bindings(&self) -> Option<&BindingManager> {
        self.bindings.as_ref()
    }

    pub fn unit_id(&self) -> i64 {
        self.unit_id
    }

    pub fn update_unit_id(&mut self, unit_id: i64) {
        self.unit_id = unit_id;
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn mode(&self) -> CpuMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CpuMode) {
        self.mode = mode;
        if mode.is_powered() {
            self.last_powered_mode = mode;
        }
    }

    /// Off when powered, back to the last powered mode when off.
    pub fn toggle_power(&mut self) {
        let next = if self.mode.is_powered() {
            CpuMode::Off
        } else {
            self.last_powered_mode
        };
        debug!("cpu {} power {} -> {}", self.unit_id, self.mode, next);
        self.set_mode(next);
    }

    pub fn session_time(&self) -> f64 {
        self.session_time
    }

    /// Advance the clock by `dt` real seconds and tick the providers while
    /// powered.
    pub fn update(&mut self, dt: f64) {
        self.session_time += dt;
        if !self.mode.is_powered() {
            return;
        }
        if let Some(bindings) = self.bindings.as_mut() {
            bindings.update(dt);
        }
    }

    /// Draw electric charge for `dt` seconds of simulation and settle the
    /// mode: `Ready` when the full draw was granted, `Starved` otherwise.
    pub fn process_electricity(&mut self, part: &dyn HostPart, dt: f64) {
        if !self.mode.is_powered() {
            return;
        }
        let required = self.power_draw_per_second * dt;
        if required <= 0.0 {
            return;
        }
        let granted = part.request_resource(ELECTRIC_CHARGE, required);
        let mode = if granted >= required {
            CpuMode::Ready
        } else {
            CpuMode::Starved
        };
        if mode != self.mode {
            debug!("cpu {} is now {}", self.unit_id, mode);
        }
        self.set_mode(mode);
    }

    pub fn archive(&self) -> SharedVolume {
        self.archive.clone()
    }

    pub fn hard_disk(&self) -> Option<SharedVolume> {
        self.hard_disk.clone()
    }

    pub fn attach_hard_disk(&mut self, disk: SharedVolume) {
        self.hard_disk = Some(disk);
    }

    /// Replace the mounted-volume set in one step.
    pub fn update_volume_mounts(&mut self, volumes: Vec<SharedVolume>) {
        self.volumes = volumes;
    }

    pub fn mounted_volumes(&self) -> &[SharedVolume] {
        &self.volumes
    }

    pub fn variables(&self) -> SharedVariableTable {
        self.variables.clone()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.borrow().contains(&name.to_lowercase())
    }

    /// Read a variable the way a script does: lower-cased name, bound slots
    /// through their getter.
    pub fn get_value(&self, name: &str) -> KosResult<Value> {
        let name = name.to_lowercase();
        let getter = {
            let table = self.variables.borrow();
            match table.find(&name) {
                Some(Variable::Plain(value)) => return Ok(value.clone()),
                Some(Variable::Bound(bound)) => match bound.getter() {
                    Some(getter) => getter,
                    None => return Ok(bound.stored_value().clone()),
                },
                None => return Err(KosError::UndefinedVariable(name)),
            }
        };
        Ok(getter(self))
    }

    /// Write a variable the way a script does. Unknown names become plain
    /// slots; bound slots go through their setter.
    pub fn set_value(&self, name: &str, value: Value) {
        let name = name.to_lowercase();
        let setter = {
            let mut table = self.variables.borrow_mut();
            match table.find_mut(&name) {
                Some(Variable::Bound(bound)) => match bound.setter() {
                    Some(setter) => setter,
                    None => {
                        bound.set_stored_value(value);
                        return;
                    }
                },
                Some(Variable::Plain(slot)) => {
                    *slot = value;
                    return;
                }
                None => {
                    table.set_plain(name, value);
                    return;
                }
            }
        };
        setter(self, value);
    }

    /// Register a function on behalf of another host module.
    pub fn register_external_function(&self, name: &str, function: NativeFunction) {
        debug!("cpu {} registered external function {}", self.unit_id, name);
        self.variables
            .borrow_mut()
            .insert_function(name.to_lowercase(), function);
    }

    pub fn call_function(&self, name: &str, args: Vec<Value>) -> KosResult<Value> {
        let name = name.to_lowercase();
        let function = self.variables.borrow().function(&name);
        match function {
            Some(f) => f(self, args),
            None => Err(KosError::UndefinedFunction(name)),
        }
    }

    /// Drop every variable and function, bound or not.
    pub fn clear_variables(&mut self) {
        self.variables.borrow_mut().clear();
    }

    /// Persist script variables, the power mode and provider state. Saving
    /// into a node again replaces what the last save wrote.
    pub fn on_save(&self, node: &mut ConfigNode) {
        let mut variables = ConfigNode::new(VARIABLES_NODE);
        for (name, value) in self.variables.borrow().plain_variables() {
            let entry = variables.add_node(ConfigNode::new(VARIABLE_NODE));
            entry.add_value("name", name);
            entry.add_value("type", value.type_name());
            entry.add_value("value", value.to_persisted());
        }
        node.remove_nodes(VARIABLES_NODE);
        node.add_node(variables);
        node.set_value(MODE_KEY, self.mode.to_string());
        if let Some(bindings) = &self.bindings {
            bindings.on_save(node);
        }
    }

    /// Restore what [`on_save`](Self::on_save) wrote. Saved variables never
    /// replace bound slots.
    pub fn on_load(&mut self, node: &ConfigNode) -> KosResult<()> {
        if let Some(variables) = node.get_node(VARIABLES_NODE) {
            let mut table = self.variables.borrow_mut();
            for entry in variables.get_nodes(VARIABLE_NODE) {
                let name = entry.required_value("name")?;
                let value = Value::from_persisted(
                    entry.required_value("type")?,
                    entry.get_value("value").unwrap_or(""),
                )?;
                table.set_plain(name, value);
            }
        }
        if let Some(mode) = node.parse_value::<CpuMode>(MODE_KEY)? {
            self.set_mode(mode);
        }
        if let Some(bindings) = self.bindings.as_mut() {
            bindings.on_load(node)?;
        }
        Ok(())
    }
}
