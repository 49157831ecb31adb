//! Parameters structure for the operator interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::op::{InputBinding, JoystickId};
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Bindings of every logical operator input to a console button or axis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Params {
    // ---- LIFT ----
    pub lift_hold: InputBinding,

    /// Axis giving upward lift power.
    pub lift_up_axis: InputBinding,

    /// Axis giving downward lift power.
    pub lift_down_axis: InputBinding,

    /// Toggle buttons for each lift preset, in the same order as the preset table.
    pub lift_presets: Vec<InputBinding>,

    // ---- ARM ----
    pub arm_hold: InputBinding,
    pub arm_axis: InputBinding,

    #[serde(default)]
    pub arm_presets: Vec<InputBinding>,

    // ---- DRIVE ----
    pub drive_forward_axis: InputBinding,
    pub drive_rotation_axis: InputBinding,

    // ---- PNEUMATICS ----
    pub compressor_stop: InputBinding,
    pub compressor_start: InputBinding,
    pub shift_high: InputBinding,
    pub shift_low: InputBinding,
    pub claw_open: InputBinding,
    pub claw_close: InputBinding,
    pub eject: InputBinding,
    pub retract: InputBinding,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Params {
    /// The competition layout.
    fn default() -> Self {
        use JoystickId::*;
        let b = InputBinding::new;

        Self {
            lift_hold: b(Xbox, 5),
            lift_up_axis: b(Xbox, 3),
            lift_down_axis: b(Xbox, 2),
            lift_presets: vec![b(Xbox, 8), b(Xbox, 7)],
            arm_hold: b(Xbox, 6),
            arm_axis: b(Xbox, 1),
            arm_presets: Vec::new(),
            drive_forward_axis: b(Joystick, 1),
            drive_rotation_axis: b(Joystick, 2),
            compressor_stop: b(Xbox, 9),
            compressor_start: b(Xbox, 10),
            shift_high: b(Joystick, 1),
            shift_low: b(Joystick, 2),
            claw_open: b(Xbox, 3),
            claw_close: b(Xbox, 2),
            eject: b(Xbox, 4),
            retract: b(Xbox, 1),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file_matches_default() {
        let params: Params =
            util::params::parse(include_str!("../../../params/operator_if.toml")).unwrap();

        assert_eq!(params, Params::default());
    }
}
