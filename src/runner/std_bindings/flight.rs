//! Vessel flight controls.
//!
//! Scripts command `throttle` and `sas`. The throttle the vessel actually
//! sees, `ship:control:mainthrottle`, follows the commanded value at a
//! bounded rate each tick.

use std::cell::RefCell;
use std::rc::Rc;

use crate::persistence::ConfigNode;
use crate::runner::binding::manager::BindingManager;
use crate::runner::binding::provider::CapabilityProvider;
use crate::runner::ds::error::KosResult;
use crate::runner::ds::value::Value;

pub const FLIGHT_CONTROLS_NODE: &str = "flightcontrols";

/// Throttle change per second.
pub const THROTTLE_RATE: f64 = 2.0;

pub fn create() -> Box<dyn CapabilityProvider> {
    Box::new(FlightControlBindings::default())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightControls {
    pub throttle: f64,
    pub main_throttle: f64,
    pub sas: bool,
}

impl FlightControls {
    fn step(&mut self, dt: f64) {
        let max_step = THROTTLE_RATE * dt;
        let diff = self.throttle - self.main_throttle;
        if diff.abs() <= max_step {
            self.main_throttle = self.throttle;
        } else {
            self.main_throttle += max_step.copysign(diff);
        }
    }
}

#[derive(Default)]
pub struct FlightControlBindings {
    controls: Rc<RefCell<FlightControls>>,
}

impl CapabilityProvider for FlightControlBindings {
    fn activate(&mut self, manager: &mut BindingManager) {
        let controls = self.controls.clone();
        manager.add_getter("throttle", move |_| Value::Number(controls.borrow().throttle));
        let controls = self.controls.clone();
        manager.add_setter("throttle", move |_, value| {
            if let Some(n) = value.as_number() {
                controls.borrow_mut().throttle = n.max(0.0).min(1.0);
            }
        });

        let controls = self.controls.clone();
        manager.add_getter("sas", move |_| Value::Boolean(controls.borrow().sas));
        let controls = self.controls.clone();
        manager.add_setter("sas", move |_, value| {
            if let Some(b) = value.as_bool() {
                controls.borrow_mut().sas = b;
            }
        });

        let controls = self.controls.clone();
        manager.add_getter("ship:control:mainthrottle", move |_| {
            Value::Number(controls.borrow().main_throttle)
        });
    }

    fn update(&mut self, dt: f64) {
        self.controls.borrow_mut().step(dt);
    }

    fn on_save(&self, node: &mut ConfigNode) {
        let controls = self.controls.borrow();
        node.remove_nodes(FLIGHT_CONTROLS_NODE);
        let saved = node.add_node(ConfigNode::new(FLIGHT_CONTROLS_NODE));
        saved.add_value("throttle", controls.throttle.to_string());
        saved.add_value("mainThrottle", controls.main_throttle.to_string());
        saved.add_value("sas", controls.sas.to_string());
    }

    fn on_load(&mut self, node: &ConfigNode) -> KosResult<()> {
        if let Some(saved) = node.get_node(FLIGHT_CONTROLS_NODE) {
            let mut controls = self.controls.borrow_mut();
            if let Some(throttle) = saved.parse_value::<f64>("throttle")? {
                controls.throttle = throttle;
            }
            if let Some(main) = saved.parse_value::<f64>("mainThrottle")? {
                controls.main_throttle = main;
            }
            if let Some(sas) = saved.parse_value::<bool>("sas")? {
                controls.sas = sas;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "flightcontrols"
    }
}
