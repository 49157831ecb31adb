//! Parameters structure for DriveCtrl

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::pneumatics::GearState;
use serde::Deserialize;

use super::DriveCtrlError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for drive control.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Params {
    /// Forward divisor in high gear.
    pub high_gear_divisor: f64,

    /// Forward divisor in low gear, must not exceed the high gear divisor.
    pub low_gear_divisor: f64,

    /// Forward divisor before the shifter has been driven.
    pub unknown_gear_divisor: f64,

    /// Gain applied to the rotation axis.
    pub rotation_gain: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Params {
    /// The forward divisor to use in the given gear.
    pub fn divisor(&self, gear: GearState) -> f64 {
        match gear {
            GearState::High => self.high_gear_divisor,
            GearState::Low => self.low_gear_divisor,
            GearState::Unknown => self.unknown_gear_divisor,
        }
    }

    pub fn validate(&self) -> Result<(), DriveCtrlError> {
        let values = [
            ("high_gear_divisor", self.high_gear_divisor),
            ("low_gear_divisor", self.low_gear_divisor),
            ("unknown_gear_divisor", self.unknown_gear_divisor),
            ("rotation_gain", self.rotation_gain),
        ];
        for (name, value) in values.iter() {
            if !(0.0..=1.0).contains(value) {
                return Err(DriveCtrlError::InvalidParams(format!(
                    "{} = {} is not in [0, 1]",
                    name, value
                )));
            }
        }

        if self.low_gear_divisor > self.high_gear_divisor {
            return Err(DriveCtrlError::InvalidParams(format!(
                "low gear divisor ({}) exceeds high gear divisor ({})",
                self.low_gear_divisor, self.high_gear_divisor
            )));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            high_gear_divisor: 1.0,
            low_gear_divisor: 0.85,
            unknown_gear_divisor: 1.0,
            rotation_gain: 0.75,
        }
    }
}
