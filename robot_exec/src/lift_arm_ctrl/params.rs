//! Parameters structure for LiftArmCtrl

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use super::{LiftArmCtrlError, Preset};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for lift and arm control.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Params {
    // ---- LIFT ----

    /// Gain applied to the up axis in manual control.
    pub lift_up_gain: f64,

    /// Gain applied to the down axis in manual control.
    pub lift_down_gain: f64,

    /// Power which holds the lift still against gravity.
    pub lift_hold_power: f64,

    // ---- ARM ----

    /// Gain applied to the arm axis.
    pub arm_gain: f64,

    /// Power which holds the arm still.
    pub arm_hold_power: f64,

    /// Arm power used by the `fourbar` diagnostic while the arm is away from its limit switch.
    pub fourbar_power: f64,

    // ---- PRESETS ----

    /// Lift preset table.
    ///
    /// The index of each preset is its priority, lower indexes win when more than one preset is
    /// selected.
    pub presets: Vec<Preset>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Params {
    /// Check that all gains are in [0, 1] and all powers in [-1, 1].
    pub fn validate(&self) -> Result<(), LiftArmCtrlError> {
        let gains = [
            ("lift_up_gain", self.lift_up_gain),
            ("lift_down_gain", self.lift_down_gain),
            ("arm_gain", self.arm_gain),
        ];
        for (name, gain) in gains.iter() {
            if !(0.0..=1.0).contains(gain) {
                return Err(LiftArmCtrlError::InvalidParams(format!(
                    "{} = {} is not in [0, 1]",
                    name, gain
                )));
            }
        }

        let mut powers = vec![
            ("lift_hold_power".to_string(), self.lift_hold_power),
            ("arm_hold_power".to_string(), self.arm_hold_power),
            ("fourbar_power".to_string(), self.fourbar_power),
        ];
        for p in self.presets.iter() {
            powers.push((format!("{}.coarse_power", p.name), p.coarse_power));
            powers.push((format!("{}.hold_power", p.name), p.hold_power));
        }
        for (name, power) in powers.iter() {
            if !(-1.0..=1.0).contains(power) {
                return Err(LiftArmCtrlError::InvalidParams(format!(
                    "{} = {} is not in [-1, 1]",
                    name, power
                )));
            }
        }

        Ok(())
    }
}

impl Default for Params {
    /// The competition tuning.
    fn default() -> Self {
        Self {
            lift_up_gain: 0.65,
            lift_down_gain: 0.25,
            lift_hold_power: 0.05,
            arm_gain: 0.25,
            arm_hold_power: 0.10,
            fourbar_power: 0.25,
            presets: vec![
                Preset {
                    name: "hatch_1".into(),
                    band: 125,
                    coarse_power: 0.3,
                    hold_power: 0.05,
                },
                Preset {
                    name: "hatch_2".into(),
                    band: 305,
                    coarse_power: 0.5,
                    hold_power: 0.05,
                },
            ],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        let params: Params =
            util::params::parse(include_str!("../../../params/lift_arm_ctrl.toml")).unwrap();

        assert_eq!(params, Params::default());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let mut params = Params::default();
        params.lift_up_gain = 1.5;
        assert!(matches!(
            params.validate(),
            Err(LiftArmCtrlError::InvalidParams(_))
        ));

        let mut params = Params::default();
        params.presets[1].coarse_power = -2.0;
        assert!(matches!(
            params.validate(),
            Err(LiftArmCtrlError::InvalidParams(_))
        ));
    }
}
