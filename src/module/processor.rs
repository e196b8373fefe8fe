//! The processor unit: one CPU and one local volume on a host part.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};

use crate::module::host::{HostPart, NullTerminal, PartId, StartState, TerminalHost};
use crate::module::volumes::VolumeAggregator;
use crate::persistence::{assign_new_id, ConfigNode, SharedStore};
use crate::runner::binding::registry::ProviderRegistry;
use crate::runner::config::RuntimeConfig;
use crate::runner::cpu::{Cpu, CpuMode};
use crate::runner::ds::error::{KosError, KosResult};
use crate::runner::ds::variable::NativeFunction;
use crate::runner::ds::volume::{SharedVolume, Volume};

pub const HARDDISK_NODE: &str = "harddisk";
pub const UNIT_ID_KEY: &str = "unitID";

/// Unit ID of a unit that has neither booted nor been loaded.
pub const UNASSIGNED_ID: i64 = -1;

pub type SharedProcessor = Rc<RefCell<ProcessorUnit>>;

/// Maps host lifecycle callbacks onto a lazily booted [`Cpu`].
///
/// The CPU is built at most once; later calls to
/// [`initialize`](Self::initialize) do nothing.
pub struct ProcessorUnit {
    part: Rc<dyn HostPart>,
    terminal: Rc<dyn TerminalHost>,
    config: RuntimeConfig,
    registry: ProviderRegistry,
    store: SharedStore,
    unit_id: i64,
    cpu: Option<Cpu>,
    hard_disk: Option<SharedVolume>,
    aggregator: VolumeAggregator,
    terminal_open: bool,
}

impl ProcessorUnit {
    /// Create a unit on `part`. Its unit ID is taken from `store` when it
    /// first boots, unless a load supplies one first.
    pub fn new(part: Rc<dyn HostPart>, store: SharedStore) -> Self {
        ProcessorUnit {
            part,
            terminal: Rc::new(NullTerminal),
            config: RuntimeConfig::default(),
            registry: ProviderRegistry::with_builtins(),
            store,
            unit_id: UNASSIGNED_ID,
            cpu: None,
            hard_disk: None,
            aggregator: VolumeAggregator::new(),
            terminal_open: false,
        }
    }

    pub fn with_terminal(mut self, terminal: Rc<dyn TerminalHost>) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Providers the CPU binds at boot. Defaults to the built-ins.
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn into_shared(self) -> SharedProcessor {
        Rc::new(RefCell::new(self))
    }

    pub fn unit_id(&self) -> i64 {
        self.unit_id
    }

    pub fn part_id(&self) -> PartId {
        self.part.id()
    }

    pub fn cpu(&self) -> Option<&Cpu> {
        self.cpu.as_ref()
    }

    pub fn cpu_mut(&mut self) -> Option<&mut Cpu> {
        self.cpu.as_mut()
    }

    pub fn is_initialized(&self) -> bool {
        self.cpu.is_some()
    }

    /// This unit's local volume.
    pub fn hard_disk(&self) -> Option<SharedVolume> {
        self.hard_disk.clone()
    }

    pub fn aggregator(&self) -> &VolumeAggregator {
        &self.aggregator
    }

    pub fn is_terminal_open(&self) -> bool {
        self.terminal_open
    }

    pub fn on_start(&mut self, state: StartState) -> KosResult<()> {
        if !state.is_flight() {
            debug!("unit {} not started in {:?}", self.unit_id, state);
            return Ok(());
        }
        self.ensure_hard_disk();
        self.initialize()
    }

    /// Build and boot the CPU unless one already exists. A unit without an
    /// ID gets one from the store first.
    pub fn initialize(&mut self) -> KosResult<()> {
        if self.cpu.is_some() {
            return Ok(());
        }
        if self.unit_id == UNASSIGNED_ID {
            self.unit_id = assign_new_id(&mut *self.store.borrow_mut())?;
        }
        let disk = self.ensure_hard_disk();
        let mut cpu = Cpu::new(self.unit_id, &self.config);
        cpu.attach_hard_disk(disk);
        cpu.boot(&self.registry);
        self.cpu = Some(cpu);
        self.aggregator.reset();
        info!("unit {} initialized on part {}", self.unit_id, self.part.id());
        Ok(())
    }

    fn ensure_hard_disk(&mut self) -> SharedVolume {
        let capacity = self.config.harddisk_capacity;
        self.hard_disk
            .get_or_insert_with(|| Volume::harddisk(capacity).into_shared())
            .clone()
    }

    /// Open this unit's terminal.
    pub fn activate(&mut self) {
        if self.terminal_open {
            return;
        }
        self.terminal.open_window(self.unit_id);
        self.terminal_open = true;
    }

    /// Close this unit's terminal.
    pub fn deactivate(&mut self) {
        if !self.terminal_open {
            return;
        }
        self.terminal.close_window(self.unit_id);
        self.terminal_open = false;
    }

    pub fn toggle_power(&mut self) {
        if let Some(cpu) = self.cpu.as_mut() {
            cpu.toggle_power();
        }
    }

    /// Per-frame tick.
    pub fn update(&mut self) {
        let cpu = match self.cpu.as_mut() {
            Some(cpu) => cpu,
            None => return,
        };
        if self.part.is_destroyed() {
            if cpu.mode().is_powered() {
                info!("part {} destroyed, unit {} shut down", self.part.id(), self.unit_id);
            }
            cpu.set_mode(CpuMode::Off);
            return;
        }
        cpu.update(self.part.delta_time());
        cpu.process_electricity(self.part.as_ref(), self.part.fixed_delta_time());
        if let Some(disk) = &self.hard_disk {
            self.aggregator.refresh(self.part.as_ref(), cpu, disk);
        }
    }

    pub fn on_fixed_update(&mut self) {}

    pub fn on_save(&self, node: &mut ConfigNode) {
        node.set_value(UNIT_ID_KEY, self.unit_id.to_string());
        node.remove_nodes(HARDDISK_NODE);
        if let Some(disk) = &self.hard_disk {
            node.add_node(disk.borrow().save(HARDDISK_NODE));
        }
        if let Some(cpu) = &self.cpu {
            cpu.on_save(node);
        }
    }

    /// Restore from a saved node and boot. Skipped while the part has no
    /// vessel. With several `harddisk` nodes the last one wins.
    pub fn on_load(&mut self, node: &ConfigNode) -> KosResult<()> {
        if self.part.vessel().is_none() {
            debug!("unit {} load skipped, part has no vessel", self.unit_id);
            return Ok(());
        }

        let mut restored = None;
        for disk in node.get_nodes(HARDDISK_NODE) {
            restored = Some(Volume::from_node(disk)?);
        }
        if let Some(volume) = restored {
            debug!("unit {} restored volume {}", self.unit_id, volume.label());
            self.attach_hard_disk(volume.into_shared());
        }

        if let Some(unit_id) = node.parse_value::<i64>(UNIT_ID_KEY)? {
            if unit_id != UNASSIGNED_ID {
                self.set_unit_id(unit_id);
            }
        }

        self.initialize()?;
        if let Some(cpu) = self.cpu.as_mut() {
            cpu.on_load(node)?;
        }
        info!("unit {} loaded", self.unit_id);
        Ok(())
    }

    fn attach_hard_disk(&mut self, disk: SharedVolume) {
        if let Some(cpu) = self.cpu.as_mut() {
            cpu.attach_hard_disk(disk.clone());
            let archive = cpu.archive();
            cpu.update_volume_mounts(vec![archive, disk.clone()]);
            self.aggregator.reset();
        }
        self.hard_disk = Some(disk);
    }

    pub fn increment_unit_id(&mut self) {
        self.set_unit_id(self.unit_id + 1);
    }

    pub fn decrement_unit_id(&mut self) {
        self.set_unit_id(self.unit_id - 1);
    }

    fn set_unit_id(&mut self, unit_id: i64) {
        self.unit_id = unit_id;
        if let Some(cpu) = self.cpu.as_mut() {
            cpu.update_unit_id(unit_id);
        }
    }

    /// Expose a function from another host module to this unit's scripts.
    pub fn register_external_function(&self, name: &str, function: NativeFunction) -> KosResult<()> {
        let cpu = self.cpu.as_ref().ok_or(KosError::NotBooted(self.unit_id))?;
        cpu.register_external_function(name, function);
        Ok(())
    }
}
