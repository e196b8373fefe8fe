//! CPU introspection: version, unit id, power mode and mounted volumes.

use crate::runner::binding::manager::BindingManager;
use crate::runner::binding::provider::CapabilityProvider;
use crate::runner::ds::error::{KosError, KosResult};
use crate::runner::ds::value::Value;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn create() -> Box<dyn CapabilityProvider> {
    Box::new(CoreBindings)
}

pub struct CoreBindings;

impl CapabilityProvider for CoreBindings {
    fn activate(&mut self, manager: &mut BindingManager) {
        manager.add_getter("version", |_| Value::String(VERSION.to_string()));
        manager.add_getter("core:unitid", |cpu| Value::Number(cpu.unit_id() as f64));
        manager.add_getter("core:mode", |cpu| Value::String(cpu.mode().to_string()));
        manager.add_getter("core:volumecount", |cpu| {
            Value::Number(cpu.mounted_volumes().len() as f64)
        });

        // freespace(index): free bytes on a mounted volume, null when unbounded.
        // Index 0 is the archive and 1 the local disk.
        manager.add_function("freespace", |cpu, args| {
            let index = match args.first() {
                Some(v) => volume_index(v)?,
                None => 1,
            };
            let volume = cpu
                .mounted_volumes()
                .get(index)
                .ok_or_else(|| KosError::InvalidValue {
                    key: "freespace".to_string(),
                    value: index.to_string(),
                })?;
            let free = volume.borrow().free_space();
            Ok(free.map(|f| Value::Number(f as f64)).unwrap_or(Value::Null))
        });
    }

    fn name(&self) -> &str {
        "core"
    }
}

fn volume_index(value: &Value) -> KosResult<usize> {
    match value.as_number() {
        Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(n as usize),
        _ => Err(KosError::InvalidValue {
            key: "freespace".to_string(),
            value: value.to_string(),
        }),
    }
}
