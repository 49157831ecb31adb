//! # Operator interface
//!
//! Maps the physical buttons and axes of the operator consoles to the logical inputs used by the
//! control modules, and reads them once per cycle into an [`OperatorInputs`] snapshot.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::op::InputBinding;
use log::warn;
use serde::Serialize;

use crate::hal::Consoles;

pub use params::Params;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of every logical operator input for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperatorInputs {
    pub lift: LiftInputs,
    pub arm: ArmInputs,
    pub drive: DriveInputs,
    pub pneumatics: PneumaticsInputs,

    /// Raw states of the lift preset toggle buttons, in preset order.
    pub lift_presets: Vec<bool>,

    /// Raw states of the arm preset toggle buttons, in preset order.
    pub arm_presets: Vec<bool>,
}

/// Manual lift inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LiftInputs {
    pub hold: bool,

    /// Up trigger, in [0, 1].
    pub up_axis: f64,

    /// Down trigger, in [0, 1].
    pub down_axis: f64,
}

/// Manual arm inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ArmInputs {
    pub hold: bool,
    pub axis: f64,
}

/// Drive stick axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DriveInputs {
    /// Forward stick axis, pushing the stick forward gives a negative value.
    pub forward_axis: f64,
    pub rotation_axis: f64,
}

/// Pneumatics buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PneumaticsInputs {
    pub compressor_stop: bool,
    pub compressor_start: bool,
    pub shift_high: bool,
    pub shift_low: bool,
    pub claw_open: bool,
    pub claw_close: bool,
    pub eject: bool,
    pub retract: bool,
}

/// Reads operator inputs through a binding table.
pub struct OperatorIf {
    params: Params,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OperatorIf {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Read all bound inputs from the consoles.
    ///
    /// Failed reads are reported as released buttons and centred axes.
    pub fn acquire(&self, consoles: &Consoles) -> OperatorInputs {
        let p = &self.params;
        let button = |b: &InputBinding| read_button(consoles, b);
        let axis = |b: &InputBinding| read_axis(consoles, b);

        OperatorInputs {
            lift: LiftInputs {
                hold: button(&p.lift_hold),
                up_axis: axis(&p.lift_up_axis),
                down_axis: axis(&p.lift_down_axis),
            },
            arm: ArmInputs {
                hold: button(&p.arm_hold),
                axis: axis(&p.arm_axis),
            },
            drive: DriveInputs {
                forward_axis: axis(&p.drive_forward_axis),
                rotation_axis: axis(&p.drive_rotation_axis),
            },
            pneumatics: PneumaticsInputs {
                compressor_stop: button(&p.compressor_stop),
                compressor_start: button(&p.compressor_start),
                shift_high: button(&p.shift_high),
                shift_low: button(&p.shift_low),
                claw_open: button(&p.claw_open),
                claw_close: button(&p.claw_close),
                eject: button(&p.eject),
                retract: button(&p.retract),
            },
            lift_presets: p.lift_presets.iter().map(button).collect(),
            arm_presets: p.arm_presets.iter().map(button).collect(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn read_button(consoles: &Consoles, binding: &InputBinding) -> bool {
    match consoles.get(binding.stick).raw_button(binding.index) {
        Ok(b) => b,
        Err(e) => {
            warn!("Could not read button {} on {:?}: {}", binding.index, binding.stick, e);
            false
        }
    }
}

fn read_axis(consoles: &Consoles, binding: &InputBinding) -> f64 {
    match consoles.get(binding.stick).raw_axis(binding.index) {
        Ok(a) if a.is_finite() => a,
        Ok(a) => {
            warn!("Axis {} on {:?} read {}, treating as centred", binding.index, binding.stick, a);
            0.0
        }
        Err(e) => {
            warn!("Could not read axis {} on {:?}: {}", binding.index, binding.stick, e);
            0.0
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::sim::SimRobot;
    use comms_if::op::JoystickId;

    #[test]
    fn test_acquire_default_bindings() {
        let sim = SimRobot::new();
        let hw = sim.hardware();
        let op_if = OperatorIf::new(Params::default());

        {
            let mut s = sim.state_mut();
            s.buttons.insert((JoystickId::Xbox, 5), true);
            s.buttons.insert((JoystickId::Xbox, 7), true);
            s.buttons.insert((JoystickId::Joystick, 2), true);
            s.axes.insert((JoystickId::Xbox, 3), 0.5);
            s.axes.insert((JoystickId::Joystick, 1), -1.0);
            s.axes.insert((JoystickId::Xbox, 1), std::f64::NAN);
        }

        let inputs = op_if.acquire(&hw.consoles);

        assert!(inputs.lift.hold);
        assert_eq!(inputs.lift.up_axis, 0.5);
        assert_eq!(inputs.lift.down_axis, 0.0);
        assert_eq!(inputs.arm.axis, 0.0);
        assert_eq!(inputs.drive.forward_axis, -1.0);
        assert!(inputs.pneumatics.shift_low);
        assert_eq!(inputs.pneumatics.shift_high, false);
        assert_eq!(inputs.lift_presets, vec![false, true]);
        assert!(inputs.arm_presets.is_empty());
    }
}
