//! # Actuator Demands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands produced by the control core once per cycle and handed to the motor outputs.
///
/// All values are normalised powers in the range [-1, 1]. The default value is the safe (zero
/// power) command.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ActuatorCommand {
    /// Lift power, positive is up.
    pub lift_power: f64,

    /// Four-bar arm power.
    pub arm_power: f64,

    /// Drivetrain forward demand, positive is forwards.
    pub drive_forward: f64,

    /// Drivetrain rotation demand.
    pub drive_rotation: f64,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl ActuatorCommand {
    /// Returns true if every demand in the command is a finite value within [-1, 1].
    pub fn is_valid(&self) -> bool {
        [self.lift_power, self.arm_power, self.drive_forward, self.drive_rotation]
            .iter()
            .all(|v| v.is_finite() && v.abs() <= 1.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_valid() {
        assert!(ActuatorCommand::default().is_valid());

        let cmd = ActuatorCommand {
            lift_power: 0.65,
            arm_power: -0.25,
            drive_forward: 1.0,
            drive_rotation: -0.75,
        };
        assert!(cmd.is_valid());

        assert_eq!(ActuatorCommand { lift_power: 1.2, ..cmd }.is_valid(), false);
        assert_eq!(ActuatorCommand { arm_power: std::f64::NAN, ..cmd }.is_valid(), false);
    }
}
